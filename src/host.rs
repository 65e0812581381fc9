//! The host side of the machine: the two escape hatches BRK and INT call into.

/**
  Capabilities the embedding application supplies. Both are invoked synchronously from inside
  `Cpu::step` with operand A's value. The CPU owns its host, so a callback cannot reach back into
  the machine and start another cycle.

  A host that wants the run loop to end records that in its own state (or exits the process);
  the CPU never stops by itself.
*/
pub trait Host {
  fn on_interrupt(&mut self, code: u32);
  fn on_breakpoint(&mut self, code: u32);
}


/// A `Host` built from two closures.
pub struct Callbacks<I, B>
  where I: FnMut(u32),
        B: FnMut(u32)
{
  interrupt  : I,
  breakpoint : B,
}

impl<I, B> Callbacks<I, B>
  where I: FnMut(u32),
        B: FnMut(u32)
{
  pub fn new(interrupt: I, breakpoint: B) -> Callbacks<I, B> {
    Callbacks {
      interrupt,
      breakpoint
    }
  }
}

impl<I, B> Host for Callbacks<I, B>
  where I: FnMut(u32),
        B: FnMut(u32)
{
  fn on_interrupt(&mut self, code: u32) {
    (self.interrupt)(code)
  }

  fn on_breakpoint(&mut self, code: u32) {
    (self.breakpoint)(code)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::RefCell;

  #[test]
  fn callbacks_forward_codes() {
    let interrupts  = RefCell::new(vec![]);
    let breakpoints = RefCell::new(vec![]);
    {
      let mut host = Callbacks::new(
        |code| interrupts.borrow_mut().push(code),
        |code| breakpoints.borrow_mut().push(code)
      );
      host.on_interrupt(7);
      host.on_breakpoint(42);
      host.on_interrupt(8);
    }
    assert_eq!(*interrupts.borrow(), vec![7, 8]);
    assert_eq!(*breakpoints.borrow(), vec![42]);
  }
}
