//! Where an operand's value lives once its descriptor has been decoded. Reading and writing go
//! through the same `Location`, so an operand read as a source is written back to the same place.

use std::fmt::{Display, Formatter};

use crate::bytecode::SpecialRegister;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Location {
  /// A constant. Reads yield the value, writes are discarded.
  Immediate(u32),
  /// A byte address in memory.
  Memory(u16),
  /// A general-purpose register code, `0..32`.
  Register(u8),
  Special(SpecialRegister),
}

impl Location {
  pub fn is_writable(&self) -> bool {
    match self {
      Location::Immediate(_) => false,
      _                      => true
    }
  }
}


impl Display for Location {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Location::Immediate(value) => {
        write!(f, "#{}", value)
      },
      Location::Memory(address) => {
        write!(f, "MEM[0x{:04X}]", address)
      },
      Location::Register(code) => {
        write!(f, "R{}", code)
      },
      Location::Special(SpecialRegister::ProgramCounter) => {
        write!(f, "PC")
      },
      Location::Special(SpecialRegister::StackPointer) => {
        write!(f, "SP")
      }
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display() {
    assert_eq!(Location::Immediate(42).to_string(), "#42");
    assert_eq!(Location::Memory(0x1F).to_string(), "MEM[0x001F]");
    assert_eq!(Location::Register(3).to_string(), "R3");
    assert_eq!(Location::Special(SpecialRegister::StackPointer).to_string(), "SP");
  }

  #[test]
  fn immediates_are_read_only() {
    assert!(!Location::Immediate(0).is_writable());
    assert!(Location::Register(0).is_writable());
    assert!(Location::Memory(0).is_writable());
  }
}
