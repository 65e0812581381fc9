use std::cell::Cell;
use std::rc::Rc;

use tinycpu::{Callbacks, Cpu};

/**
  Demo program. Computes 6 * 7 into R0, reports it through an interrupt, calls a subroutine that
  increments R0, and stops at a breakpoint whose code is R0.
*/
const DEMO_PROGRAM: &[u8] = &[
  0x89, 0x00, 0x00, 0x80, 0x06, // 0000  MOV.b  R0, #6
  0x55, 0x00, 0x00, 0x80, 0x07, // 0005  MUL.b  R0, #7
  0x19, 0x00, 0x00,             // 000A  INT.b  R0
  0x0E, 0x80, 0x00, 0x14,       // 000D  CALL.w #0x0014
  0x15, 0x00, 0x00,             // 0011  BRK.b  R0
  0x1D, 0x00, 0x00,             // 0014  INC.b  R0
  0x04,                         // 0017  RET
];

fn main() {

  #[cfg(feature = "trace_computation")]
  println!("Computation Tracing ENABLED");

  let exit_code: Rc<Cell<Option<u32>>> = Rc::new(Cell::new(None));
  let breakpoint_hit = exit_code.clone();

  let mut machine = Cpu::new(
    Callbacks::new(
      |code| println!("INTERRUPT: {}", code),
      move |code| {
        println!("BREAK: exit code {}", code);
        breakpoint_hit.set(Some(code));
      }
    )
  );

  machine.load(0, DEMO_PROGRAM);

  while exit_code.get().is_none() {
    machine.step();
  }

  println!("Internal Machine State:\n{}", machine);
}
