/*!
  This module is responsible for the bit layout of opcode bytes and operand descriptors.

  Opcode byte:     `[oooooobb]`  o = opcode number, b = width
  Descriptor byte: `[cpsvvvvv]`  c = constant, p = pointed-by, s = special register (register
                                 operands) or inline value (constant operands), v = register code

  An inline constant is the low six bits of the descriptor. The inline flag is bit 5 of those six,
  so inline values run from 32 to 63.
*/
use std::convert::TryFrom;

use super::{Opcode, Operation, Width};

const CONSTANT_FLAG : u8 = 0b1000_0000;
const POINTER_FLAG  : u8 = 0b0100_0000;
const SPECIAL_FLAG  : u8 = 0b0010_0000;
const INLINE_FLAG   : u8 = SPECIAL_FLAG;
const REGISTER_MASK : u8 = 0b0001_1111;
const INLINE_MASK   : u8 = 0b0011_1111;

pub const SPECIAL_PC: u8 = 0;
pub const SPECIAL_SP: u8 = 1;

pub fn decode_opcode(byte: u8) -> Opcode {
  let code = byte >> 2;
  Opcode {
    code,
    operation: Operation::try_from(code).ok(),
    width: Width::from_bits(byte)
  }
}

pub fn encode_opcode(operation: Operation, width: Width) -> u8 {
  let bits = match width {
    Width::Void       => 0,
    Width::Byte       => 1,
    Width::Word       => 2,
    Width::DoubleWord => 3,
  };
  (operation.code() << 2) | bits
}


/// The special-function registers reachable through the special flag.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum SpecialRegister {
  ProgramCounter,
  StackPointer,
}

impl SpecialRegister {
  pub fn from_code(code: u8) -> Option<SpecialRegister> {
    match code {
      SPECIAL_PC => Some(SpecialRegister::ProgramCounter),
      SPECIAL_SP => Some(SpecialRegister::StackPointer),
      _          => None
    }
  }
}


/**
  The eight syntactic forms an operand descriptor can take. Special-register forms carry `None`
  when the register code names neither PC nor SP.
*/
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Form {
  /// Six-bit value in the descriptor.
  Inline(u8),
  /// Six-bit address in the descriptor.
  InlinePointer(u8),
  /// Width-sized literal after the descriptor.
  Literal,
  /// 16-bit address after the descriptor.
  LiteralPointer,
  Register(u8),
  /// Register holding a 16-bit address.
  RegisterPointer(u8),
  Special(Option<SpecialRegister>),
  SpecialPointer(Option<SpecialRegister>),
}

impl Form {
  pub fn from_descriptor(descriptor: u8) -> Form {
    let pointer = descriptor & POINTER_FLAG != 0;
    let code    = descriptor & REGISTER_MASK;

    if descriptor & CONSTANT_FLAG != 0 {
      let inline = descriptor & INLINE_FLAG != 0;
      let value  = descriptor & INLINE_MASK;
      match (inline, pointer) {
        (true,  false) => Form::Inline(value),
        (true,  true ) => Form::InlinePointer(value),
        (false, false) => Form::Literal,
        (false, true ) => Form::LiteralPointer,
      }
    } else {
      let special = descriptor & SPECIAL_FLAG != 0;
      match (special, pointer) {
        (false, false) => Form::Register(code),
        (false, true ) => Form::RegisterPointer(code),
        (true,  false) => Form::Special(SpecialRegister::from_code(code)),
        (true,  true ) => Form::SpecialPointer(SpecialRegister::from_code(code)),
      }
    }
  }

  /// Bytes the operand occupies in the instruction stream, descriptor included.
  pub fn length(&self, width: Width) -> u16 {
    match self {
      Form::Literal | Form::Register(_) => 1 + width.size(),
      Form::LiteralPointer              => 3,
      _                                 => 1
    }
  }
}


// Descriptor builders, used to lay out programs by hand.

/// Inline constant. Only values 32..=63 are representable.
pub fn inline(value: u8) -> u8 {
  debug_assert!(value & INLINE_MASK == value && value & INLINE_FLAG != 0);
  CONSTANT_FLAG | value
}

pub fn inline_pointer(address: u8) -> u8 {
  debug_assert!(address & INLINE_MASK == address && address & INLINE_FLAG != 0);
  CONSTANT_FLAG | POINTER_FLAG | address
}

pub fn literal() -> u8 {
  CONSTANT_FLAG
}

pub fn literal_pointer() -> u8 {
  CONSTANT_FLAG | POINTER_FLAG
}

pub fn register(code: u8) -> u8 {
  code & REGISTER_MASK
}

pub fn register_pointer(code: u8) -> u8 {
  POINTER_FLAG | (code & REGISTER_MASK)
}

pub fn special(code: u8) -> u8 {
  SPECIAL_FLAG | (code & REGISTER_MASK)
}

pub fn special_pointer(code: u8) -> u8 {
  POINTER_FLAG | SPECIAL_FLAG | (code & REGISTER_MASK)
}
