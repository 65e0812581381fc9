use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::IntoEnumIterator;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};

/**
  Opcodes of the virtual CPU.

  The numbering is the binary encoding, so the order the opcodes are listed below is significant.
  They are grouped in three contiguous bands: no operands, operand A only, operands A and B.
  Arity is recorded explicitly in `OPCODE_TABLE`, but opcode numbers past the end of this enum
  fall back to the band rule (see `Arity::of_code`), which only works if the bands stay put.
  Order-dependencies:
      ```
      FIRST_UNARY_OPCODE
      FIRST_BINARY_OPCODE
      OpcodeInfo::describe()
      ```
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq,         PartialEq, Debug,            Hash
)]
#[strum(serialize_all = "shouty_snake_case")]
#[repr(u8)]
pub enum Operation {
  // No operands //
  Nop,      // nothing
  Ret,      // pop PC
  // Opcode 2

  // Operand A //
  Jmp,      // PC = A
  Call,     // push PC, PC = A
  Push,     // MEM[--SP] = A
  Brk,      // breakpoint(A)
  Int,      // interrupt(A)
  Inc,      // A = A + 1
  Dec,      // A = A - 1
  Clr,      // A = 0
  Set,      // A = all ones
  Not,      // A = ~A
  Neg,      // A = !A
  Swap,     // A = byte-reversed A
  Jnn,      // skip_next if A == 0
  Jn,       // skip_next if A != 0
  Snn,      // skip_next if A != 0
  Sn,       // skip_next if A == 0
  Pop,      // A = MEM[SP++]
  // Opcode 19

  // Operands A and B //
  Add,      // A = A + B
  Sub,      // A = A - B
  Mul,      // A = A * B
  Div,      // A = A / B
  And,      // A = A & B
  Nand,     // A = ~(A & B)
  Or,       // A = A | B
  Nor,      // A = ~(A | B)
  Xor,      // A = A ^ B
  Sbi,      // A = A | (1 << B)
  Cli,      // A = A & ~(1 << B)
  Lsl,      // A = A << B
  Lsr,      // A = A >> B
  Rol,      // A = A rotated left by B
  Ror,      // A = A rotated right by B
  Mov,      // A = B
  Cxh,      // A, B = B, A
  Je,       // skip_next if A != B
  Jne,      // skip_next if A == B
  Jg,       // skip_next if A <= B
  Jge,      // skip_next if A < B
  Jl,       // skip_next if A >= B
  Jle,      // skip_next if A > B
  Jbc,      // skip_next if bit B of A is set
  Jbs,      // skip_next if bit B of A is clear
  Se,       // skip_next if A == B
  Sne,      // skip_next if A != B
  Sg,       // skip_next if A > B
  Sge,      // skip_next if A >= B
  Sl,       // skip_next if A < B
  Sle,      // skip_next if A <= B
  Sbc,      // skip_next if bit B of A is clear
  Sbs,      // skip_next if bit B of A is set
  // Opcode 52
}

pub const FIRST_UNARY_OPCODE : u8 = 2u8;
pub const FIRST_BINARY_OPCODE: u8 = 19u8;
pub const OPCODE_COUNT       : u8 = 52u8;


/// Operand width selected by the low two bits of the opcode byte.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Width {
  /// No operand width; used by instructions without operands.
  Void,
  Byte,
  Word,
  DoubleWord,
}

impl Width {
  pub fn from_bits(bits: u8) -> Width {
    match bits & 3 {
      0 => Width::Void,
      1 => Width::Byte,
      2 => Width::Word,
      _ => Width::DoubleWord,
    }
  }

  /// Size in bytes of a literal or register access of this width.
  pub fn size(self) -> u16 {
    match self {
      Width::Void       => 0,
      Width::Byte       => 1,
      Width::Word       => 2,
      Width::DoubleWord => 4,
    }
  }

  /// Assembly suffix, e.g. `ADD.w`.
  pub fn suffix(self) -> &'static str {
    match self {
      Width::Void       => "",
      Width::Byte       => ".b",
      Width::Word       => ".w",
      Width::DoubleWord => ".d",
    }
  }
}


#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum Arity {
  Nullary,
  Unary,
  Binary,
}

impl Arity {
  /// Arity purely from an opcode number's position relative to the band boundaries.
  pub fn from_band(code: u8) -> Arity {
    match code {
      value if value < FIRST_UNARY_OPCODE  => Arity::Nullary,
      value if value < FIRST_BINARY_OPCODE => Arity::Unary,
      _value                               => Arity::Binary
    }
  }

  /// Arity of any 6-bit opcode number. Known opcodes consult the table; unknown opcodes sit
  /// above the last band boundary and decode both operands.
  pub fn of_code(code: u8) -> Arity {
    match Operation::try_from(code) {
      Ok(operation) => operation.arity(),
      Err(_e)       => Arity::from_band(code)
    }
  }
}


/// What executing an opcode does to the machine, used to route it in the engine.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Effect {
  Nothing,
  /// Changes PC (and SP for CALL/RET) directly.
  Control,
  /// Stores A on the stack.
  Stack,
  /// Hands A to the host.
  Escape,
  /// Computes a result that is committed to A.
  Result,
  /// Evaluates a test and sets `skip_next` when it holds.
  Condition,
  /// Commits A to B and B to A.
  Exchange,
}

#[derive(Clone, Copy, Debug)]
pub struct OpcodeInfo {
  pub operation : Operation,
  pub mnemonic  : &'static str,
  pub arity     : Arity,
  pub effect    : Effect,
}

impl OpcodeInfo {
  fn describe(operation: Operation) -> OpcodeInfo {
    use Operation::*;

    let (arity, effect) =
      match operation {
        Nop                                           => (Arity::Nullary, Effect::Nothing),
        Ret                                           => (Arity::Nullary, Effect::Control),
        Jmp | Call                                    => (Arity::Unary,   Effect::Control),
        Push                                          => (Arity::Unary,   Effect::Stack),
        Brk | Int                                     => (Arity::Unary,   Effect::Escape),
        Inc | Dec | Clr | Set | Not | Neg | Swap | Pop => (Arity::Unary,   Effect::Result),
        Jnn | Jn | Snn | Sn                           => (Arity::Unary,   Effect::Condition),

        | Add | Sub | Mul | Div
        | And | Nand | Or | Nor | Xor
        | Sbi | Cli | Lsl | Lsr | Rol | Ror
        | Mov                                         => (Arity::Binary,  Effect::Result),

        Cxh                                           => (Arity::Binary,  Effect::Exchange),

        | Je | Jne | Jg | Jge | Jl | Jle | Jbc | Jbs
        | Se | Sne | Sg | Sge | Sl | Sle | Sbc | Sbs   => (Arity::Binary,  Effect::Condition),
      };

    OpcodeInfo {
      operation,
      mnemonic: operation.into(),
      arity,
      effect
    }
  }
}

lazy_static! {
  /// Per-opcode metadata, indexed by opcode number.
  pub static ref OPCODE_TABLE: Vec<OpcodeInfo> =
    Operation::iter().map(OpcodeInfo::describe).collect();
}

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn info(&self) -> &'static OpcodeInfo {
    &OPCODE_TABLE[self.code() as usize]
  }

  pub fn arity(&self) -> Arity {
    self.info().arity
  }

  pub fn effect(&self) -> Effect {
    self.info().effect
  }

  pub fn mnemonic(&self) -> &'static str {
    self.info().mnemonic
  }
}


/// An opcode byte split into its fields. `operation` is `None` for unassigned opcode numbers.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Opcode {
  pub code      : u8,
  pub operation : Option<Operation>,
  pub width     : Width,
}

impl Opcode {
  pub fn arity(&self) -> Arity {
    Arity::of_code(self.code)
  }
}

impl Display for Opcode {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.operation {
      Some(operation) => write!(f, "{}{}", operation, self.width.suffix()),
      None            => write!(f, "?{}{}", self.code, self.width.suffix())
    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::convert::TryFrom;
  use std::str::FromStr;

  #[test]
  fn canonical_numbering() {
    assert_eq!(Operation::Nop.code(), 0);
    assert_eq!(Operation::Ret.code(), 1);
    assert_eq!(Operation::Jmp.code(), FIRST_UNARY_OPCODE);
    assert_eq!(Operation::Brk.code(), 5);
    assert_eq!(Operation::Pop.code(), 18);
    assert_eq!(Operation::Add.code(), FIRST_BINARY_OPCODE);
    assert_eq!(Operation::Mov.code(), 34);
    assert_eq!(Operation::Cxh.code(), 35);
    assert_eq!(Operation::Sbs.code(), 51);
    assert_eq!(Operation::Sbs.code(), OPCODE_COUNT - 1);
    assert!(Operation::try_from(OPCODE_COUNT).is_err());
  }

  #[test]
  fn table_agrees_with_bands() {
    assert_eq!(OPCODE_TABLE.len(), OPCODE_COUNT as usize);
    for (code, info) in OPCODE_TABLE.iter().enumerate() {
      assert_eq!(info.operation.code() as usize, code);
      assert_eq!(info.arity, Arity::from_band(code as u8), "{}", info.mnemonic);
    }
  }

  #[test]
  fn unknown_opcodes_take_two_operands() {
    assert_eq!(OPCODE_COUNT, 52);
    assert_eq!(Arity::of_code(52), Arity::Binary);
    for code in OPCODE_COUNT..64 {
      assert_eq!(Arity::of_code(code), Arity::Binary);
    }
  }

  #[test]
  fn mnemonics() {
    assert_eq!(Operation::Nand.mnemonic(), "NAND");
    assert_eq!(Operation::Cxh.to_string(), "CXH");
    assert_eq!(Operation::from_str("SBS"), Ok(Operation::Sbs));
  }

  #[test]
  fn effects() {
    assert_eq!(Operation::Pop.effect(), Effect::Result);
    assert_eq!(Operation::Sn.effect(), Effect::Condition);
    assert_eq!(Operation::Call.effect(), Effect::Control);
    assert_eq!(Operation::Cxh.effect(), Effect::Exchange);
  }

  #[test]
  fn widths() {
    assert_eq!(Width::from_bits(0), Width::Void);
    assert_eq!(Width::from_bits(1), Width::Byte);
    assert_eq!(Width::from_bits(2), Width::Word);
    assert_eq!(Width::from_bits(3), Width::DoubleWord);
    assert_eq!(Width::DoubleWord.size(), 4);
    assert_eq!(Width::Void.size(), 0);
  }
}
