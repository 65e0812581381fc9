/*!
  A small callback-driven virtual CPU.

  The machine has 32 byte-wide general-purpose registers, a 16-bit program counter and stack
  pointer, and 64 KiB of memory. The host loads a program image, supplies a `Host` for the BRK
  and INT instructions, and calls `Cpu::step` once per instruction:

  ```
  use tinycpu::{bytecode, Callbacks, Cpu};

  let mut cpu = Cpu::new(Callbacks::new(|_| {}, |code| assert_eq!(code, 42)));
  cpu.load(0, &[bytecode::encode_opcode(bytecode::Operation::Brk, bytecode::Width::Byte),
                bytecode::inline(42)]);
  cpu.step();
  assert_eq!(cpu.program_counter(), 2);
  ```
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;
extern crate strum;
extern crate strum_macros;
extern crate num_enum;

pub mod address;
pub mod bytecode;
pub mod cpu;
pub mod host;
pub mod memory;
mod resolve;

pub use address::Location;
pub use cpu::{Cpu, Cycle, STACK_TOP};
pub use host::{Callbacks, Host};
pub use memory::{BigEndian, Memory, RegisterFile};
