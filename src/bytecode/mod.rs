/*!

  Instructions are a single opcode byte followed by zero, one, or two operand encodings. The
  opcode byte carries a 6-bit opcode number and a 2-bit operand width. Each operand starts with
  a descriptor byte saying whether it is a constant or a register, whether it is used directly or
  as a pointer into memory, and whether its value is inline or follows in the stream. Multi-byte
  literals and addresses are big-endian.

  The number of operands is not encoded anywhere: it is a property of the opcode. Opcodes are
  numbered in three contiguous bands (none, A only, A and B), and `OPCODE_TABLE` records each
  opcode's arity along with what it does.

*/

mod binary;
mod instruction;

pub use binary::{
  decode_opcode, encode_opcode,
  inline, inline_pointer, literal, literal_pointer,
  register, register_pointer, special, special_pointer,
  Form, SpecialRegister, SPECIAL_PC, SPECIAL_SP
};
pub use instruction::{
  Arity, Effect, Opcode, OpcodeInfo, Operation, Width,
  FIRST_BINARY_OPCODE, FIRST_UNARY_OPCODE, OPCODE_COUNT, OPCODE_TABLE
};
