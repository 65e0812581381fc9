//! Machine state of the virtual CPU and its fetch-decode-execute cycle.

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};

use crate::bytecode::{decode_opcode, Arity, Effect, Opcode, Operation, Width};
use crate::host::Host;
use crate::memory::{BigEndian, Memory, RegisterFile, ADDRESS_MASK};

/// Initial stack pointer. The stack grows down from the top of memory.
pub const STACK_TOP: u16 = ADDRESS_MASK as u16;

pub struct Cpu<H: Host> {

  // Memory Stores
  pub(crate) registers : RegisterFile,
  pub(crate) memory    : Memory,

  // Special-function registers //
  pub(crate) program_counter : u16,
  pub(crate) stack_pointer   : u16,

  // Flags
  pub(crate) skip_next         : bool, // Set by a conditional during the current cycle
  pub(crate) commit_suppressed : bool, // `skip_next` of the previous cycle; discards commits

  host: H,
}

/// A record of one executed instruction, as returned by `Cpu::step`.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct Cycle {
  /// Address of the opcode byte.
  pub address   : u16,
  pub opcode    : Opcode,
  /// Encoded length, opcode byte included.
  pub length    : u16,
  pub a         : Option<u32>,
  pub b         : Option<u32>,
  /// Whether a conditional set `skip_next` in this cycle.
  pub skip_next : bool,
}

impl Display for Cycle {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:04X}  {}", self.address, self.opcode)?;
    if let Some(a) = self.a {
      write!(f, "  A=0x{:X}", a)?;
    }
    if let Some(b) = self.b {
      write!(f, "  B=0x{:X}", b)?;
    }
    Ok(())
  }
}


impl<H: Host> Cpu<H> {

  // region Host-facing methods

  /// A zeroed machine with PC at 0 and SP at the top of memory.
  pub fn new(host: H) -> Cpu<H> {
    Cpu {
      registers         : RegisterFile::new(),
      memory            : Memory::new(),
      program_counter   : 0,
      stack_pointer     : STACK_TOP,
      skip_next         : false,
      commit_suppressed : false,
      host
    }
  }

  /// Zeroes registers, memory and flags, keeping the host.
  pub fn reset(&mut self) {
    self.registers.clear();
    self.memory.clear();
    self.program_counter   = 0;
    self.stack_pointer     = STACK_TOP;
    self.skip_next         = false;
    self.commit_suppressed = false;
  }

  /// Copies a program image into memory at `offset`, wrapping past the top of memory.
  pub fn load(&mut self, offset: u16, program: &[u8]) {
    self.memory.load(offset, program);
  }

  pub fn program_counter(&self) -> u16 {
    self.program_counter
  }

  pub fn set_program_counter(&mut self, address: u16) {
    self.program_counter = address;
  }

  pub fn stack_pointer(&self) -> u16 {
    self.stack_pointer
  }

  pub fn set_stack_pointer(&mut self, address: u16) {
    self.stack_pointer = address;
  }

  /// True when the next cycle's commits will be discarded. The pending skip flag itself is always
  /// clear between cycles; `Cycle::skip_next` reports whether the last instruction set it.
  pub fn commit_suppressed(&self) -> bool {
    self.commit_suppressed
  }

  pub fn registers(&self) -> &RegisterFile {
    &self.registers
  }

  pub fn registers_mut(&mut self) -> &mut RegisterFile {
    &mut self.registers
  }

  pub fn memory(&self) -> &Memory {
    &self.memory
  }

  pub fn memory_mut(&mut self) -> &mut Memory {
    &mut self.memory
  }

  pub fn host(&self) -> &H {
    &self.host
  }

  pub fn host_mut(&mut self) -> &mut H {
    &mut self.host
  }

  pub fn into_host(self) -> H {
    self.host
  }

  // endregion

  // region Execution

  /**
    Fetches, decodes and executes exactly one instruction.

    PC is moved past the whole instruction before it executes, so JMP, CALL, RET and writes to PC
    land exactly on their target. At the end of the cycle `skip_next` is moved into the commit
    latch and cleared; a conditional therefore discards the commits of the following cycle only.
  */
  pub fn step(&mut self) -> Cycle {
    let address = self.program_counter;
    let opcode  = decode_opcode(self.memory.read_u8(address as usize));
    let width   = opcode.width;
    let base    = address.wrapping_add(1);
    self.program_counter = base;

    let arity        = opcode.arity();
    let mut length_a = 0u16;
    let mut length_b = 0u16;

    let a =
      match arity >= Arity::Unary {
        true  => Some(self.resolve(base, 0, &mut length_a, width)),
        false => None
      };
    let b =
      match arity == Arity::Binary {
        true  => Some(self.resolve(base, length_a, &mut length_b, width)),
        false => None
      };

    self.program_counter = base.wrapping_add(length_a + length_b);

    #[cfg(feature = "trace_computation")]
      println!("{}", Cycle{ address, opcode, length: 1 + length_a + length_b, a, b, skip_next: false });

    if let Some(operation) = opcode.operation {
      self.execute(operation, width, base, length_a, a.unwrap_or(0), b.unwrap_or(0));
    }

    let skip_next = self.skip_next;
    self.commit_suppressed = std::mem::replace(&mut self.skip_next, false);

    Cycle {
      address,
      opcode,
      length: 1 + length_a + length_b,
      a,
      b,
      skip_next
    }
  }

  fn execute(&mut self, operation: Operation, width: Width, base: u16, length_a: u16, a: u32, b: u32) {
    match operation.effect() {

      Effect::Nothing   => {},

      Effect::Control   => self.transfer(operation, a),

      Effect::Stack     => self.push(width, a),

      Effect::Escape    => {
        match operation {
          Operation::Brk => self.host.on_breakpoint(a),
          Operation::Int => self.host.on_interrupt(a),
          _              => unreachable!("{} is not a host escape", operation)
        }
      }

      Effect::Result    => {
        let result = self.compute(operation, width, a, b);
        self.commit(base, 0, result, width);
      }

      Effect::Condition => {
        if holds(operation, a, b) {
          self.skip_next = true;
        }
      }

      Effect::Exchange  => {
        // A's value goes to B's destination, then B's value to A's.
        self.commit(base, length_a, a, width);
        self.commit(base, 0, b, width);
      }

    }
  }

  fn transfer(&mut self, operation: Operation, target: u32) {
    match operation {
      Operation::Jmp  => {
        self.program_counter = target as u16;
      }
      Operation::Call => {
        self.stack_pointer = self.stack_pointer.wrapping_sub(2);
        self.memory.write_u16(self.stack_pointer as usize, self.program_counter);
        self.program_counter = target as u16;
      }
      Operation::Ret  => {
        self.program_counter = self.memory.read_u16(self.stack_pointer as usize);
        self.stack_pointer   = self.stack_pointer.wrapping_add(2);
      }
      _ => unreachable!("{} does not transfer control", operation)
    }
  }

  fn push(&mut self, width: Width, value: u32) {
    self.stack_pointer = self.stack_pointer.wrapping_sub(width.size());
    self.memory.write(self.stack_pointer as usize, width, value);
  }

  fn pop(&mut self, width: Width) -> u32 {
    let value = self.memory.read(self.stack_pointer as usize, width);
    self.stack_pointer = self.stack_pointer.wrapping_add(width.size());
    value
  }

  fn compute(&mut self, operation: Operation, width: Width, a: u32, b: u32) -> u32 {
    match operation {
      Operation::Inc  => a.wrapping_add(1),
      Operation::Dec  => a.wrapping_sub(1),
      Operation::Clr  => 0,
      Operation::Set  => u32::MAX,
      Operation::Not  => !a,
      Operation::Neg  => (a == 0) as u32,
      Operation::Swap => swap_bytes(a, width),
      Operation::Pop  => self.pop(width),
      Operation::Add  => a.wrapping_add(b),
      Operation::Sub  => a.wrapping_sub(b),
      Operation::Mul  => a.wrapping_mul(b),
      Operation::Div  => a.checked_div(b).unwrap_or(u32::MAX),
      Operation::And  => a & b,
      Operation::Nand => !(a & b),
      Operation::Or   => a | b,
      Operation::Nor  => !(a | b),
      Operation::Xor  => a ^ b,
      Operation::Sbi  => a | bit(b),
      Operation::Cli  => a & !bit(b),
      Operation::Lsl  => a.checked_shl(b).unwrap_or(0),
      Operation::Lsr  => a.checked_shr(b).unwrap_or(0),
      Operation::Rol  => rotate_left(a, b, width),
      Operation::Ror  => rotate_right(a, b, width),
      Operation::Mov  => b,
      _ => unreachable!("{} does not produce a result", operation)
    }
  }

  // endregion

  // region Display methods

  fn make_register_table(registers: &[u8], start: usize) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);

    for (i, value) in registers.iter().enumerate() {
      table.add_row(
        row![r->format!("R{} =", i + start), format!("0x{:02X}", value)]
      );
    }
    table
  }

  fn make_special_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Special", ubl->"Contents"]);
    table.add_row(row![r->"PC =", format!("0x{:04X}", self.program_counter)]);
    table.add_row(row![r->"SP =", format!("0x{:04X}", self.stack_pointer)]);
    table.add_row(row![r->"skip =", format!("{}", self.commit_suppressed)]);
    table
  }

  // endregion

}


/// Single-bit mask; bit numbers of 32 and up select nothing.
fn bit(number: u32) -> u32 {
  1u32.checked_shl(number).unwrap_or(0)
}

/**
  Whether a conditional opcode sets `skip_next`. Each jump opcode shares its test with a skip
  opcode, and neither moves PC.
*/
fn holds(operation: Operation, a: u32, b: u32) -> bool {
  use Operation::*;

  match operation {
    Jn  | Snn => a != 0,
    Jnn | Sn  => a == 0,
    Jne | Se  => a == b,
    Je  | Sne => a != b,
    Jle | Sg  => a > b,
    Jl  | Sge => a >= b,
    Jge | Sl  => a < b,
    Jg  | Sle => a <= b,
    Jbs | Sbc => a & bit(b) == 0,
    Jbc | Sbs => a & bit(b) != 0,
    _         => unreachable!("{} is not a conditional", operation)
  }
}

/// Rotates within the low `width` bits by `amount` modulo the width.
fn rotate_left(value: u32, amount: u32, width: Width) -> u32 {
  match width {
    Width::Void       => value,
    Width::Byte       => (value as u8).rotate_left(amount % 8) as u32,
    Width::Word       => (value as u16).rotate_left(amount % 16) as u32,
    Width::DoubleWord => value.rotate_left(amount % 32),
  }
}

fn rotate_right(value: u32, amount: u32, width: Width) -> u32 {
  match width {
    Width::Void       => value,
    Width::Byte       => (value as u8).rotate_right(amount % 8) as u32,
    Width::Word       => (value as u16).rotate_right(amount % 16) as u32,
    Width::DoubleWord => value.rotate_right(amount % 32),
  }
}

/// Reverses the byte order of the low `width` bytes.
fn swap_bytes(value: u32, width: Width) -> u32 {
  match width {
    Width::Void | Width::Byte => value,
    Width::Word               => (value as u16).swap_bytes() as u32,
    Width::DoubleWord         => value.swap_bytes(),
  }
}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl<H: Host> Display for Cpu<H> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let registers   = self.registers.as_slice();
    let low_table   = Cpu::<H>::make_register_table(&registers[..16], 0);
    let high_table  = Cpu::<H>::make_register_table(&registers[16..], 16);
    let special     = self.make_special_table();

    let mut combined_table = table!([low_table, high_table, special]);

    combined_table.set_titles(row![ub->"Registers", ub->"", ub->"Flags"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(f, "{}", combined_table)
  }
}
