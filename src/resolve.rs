/*!
  Operand resolution and write-back.

  Both directions decode the descriptor through `Cpu::locate`, so the resolver and the committer
  can never disagree about where an operand lives or how many bytes it occupies.

  Offsets are relative to `base`, the address just after the opcode byte.
*/

use crate::address::Location;
use crate::bytecode::{Form, SpecialRegister, Width};
use crate::cpu::Cpu;
use crate::host::Host;
use crate::memory::BigEndian;

impl<H: Host> Cpu<H> {

  /**
    Decodes the operand whose descriptor is `descriptor_offset` bytes into the operand stream.
    Returns where the operand lives and how many bytes its encoding occupies.

    Register pointers are always read as 16-bit addresses. A PC pointer addresses the byte
    `descriptor_offset + 1` bytes before `base`, i.e. the opcode byte for operand A. Special
    register codes other than PC and SP decode to the constant 0.
  */
  pub(crate) fn locate(&self, base: u16, descriptor_offset: u16, width: Width) -> (Location, u16) {
    let at   = base.wrapping_add(descriptor_offset);
    let form = Form::from_descriptor(self.memory.read_u8(at as usize));
    let tail = at.wrapping_add(1) as usize;

    let location =
      match form {
        Form::Inline(value)           => Location::Immediate(value as u32),
        Form::InlinePointer(address)  => Location::Memory(address as u16),
        Form::Literal                 => Location::Immediate(self.memory.read(tail, width)),
        Form::LiteralPointer          => Location::Memory(self.memory.read_u16(tail)),
        Form::Register(code)          => Location::Register(code),
        Form::RegisterPointer(code)   => Location::Memory(self.registers.read_u16(code as usize)),
        Form::Special(Some(register)) => Location::Special(register),

        Form::SpecialPointer(Some(SpecialRegister::ProgramCounter)) => {
          Location::Memory(base.wrapping_sub(descriptor_offset).wrapping_sub(1))
        }

        Form::SpecialPointer(Some(SpecialRegister::StackPointer))   => {
          Location::Memory(self.stack_pointer)
        }

        | Form::Special(None)
        | Form::SpecialPointer(None)  => Location::Immediate(0),
      };

    (location, form.length(width))
  }

  /**
    Reads the operand that starts `offset + consumed` bytes into the operand stream and adds its
    encoded length to `consumed`. The value is zero-extended from `width`.
  */
  pub(crate) fn resolve(&self, base: u16, offset: u16, consumed: &mut u16, width: Width) -> u32 {
    let (location, length) = self.locate(base, offset + *consumed, width);
    *consumed += length;
    self.read_at(location, width)
  }

  /**
    Writes `value` to the destination whose descriptor is `offset` bytes into the operand stream.
    Immediates are not writable and are left alone. Nothing at all is written while commits are
    suppressed by a conditional in the previous cycle.
  */
  pub(crate) fn commit(&mut self, base: u16, offset: u16, value: u32, width: Width) {
    let (location, _length) = self.locate(base, offset, width);

    if !location.is_writable() {
      return;
    }

    if self.commit_suppressed {
      #[cfg(feature = "trace_computation")]
        println!("      skip {} <- 0x{:X}", location, value);
      return;
    }

    #[cfg(feature = "trace_computation")]
      println!("      {} <- 0x{:X}", location, value);

    self.write_at(location, width, value);
  }

  pub(crate) fn read_at(&self, location: Location, width: Width) -> u32 {
    match location {

      Location::Immediate(value) => value,

      Location::Memory(address)  => self.memory.read(address as usize, width),

      Location::Register(code)   => self.registers.read(code as usize, width),

      Location::Special(register) => {
        let value =
          match register {
            SpecialRegister::ProgramCounter => self.program_counter,
            SpecialRegister::StackPointer   => self.stack_pointer,
          } as u32;
        match width {
          Width::Byte => value & 0xFF,
          _           => value
        }
      }

    }
  }

  pub(crate) fn write_at(&mut self, location: Location, width: Width, value: u32) {
    match location {

      Location::Immediate(_)     => {},

      Location::Memory(address)  => self.memory.write(address as usize, width, value),

      Location::Register(code)   => self.registers.write(code as usize, width, value),

      Location::Special(SpecialRegister::ProgramCounter) => {
        self.program_counter = value as u16;
      }

      Location::Special(SpecialRegister::StackPointer)   => {
        self.stack_pointer = value as u16;
      }

    }
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::*;

  struct Silent;

  impl Host for Silent {
    fn on_interrupt(&mut self, _code: u32) {}
    fn on_breakpoint(&mut self, _code: u32) {}
  }

  const BASE: u16 = 0x0101;

  /// A machine that has just fetched an opcode at `BASE - 1`, with `operand` as its first operand.
  fn fetched(width: Width, operand: &[u8]) -> Cpu<Silent> {
    let mut cpu = Cpu::new(Silent);
    cpu.load(BASE - 1, &[encode_opcode(Operation::Mov, width)]);
    cpu.load(BASE, operand);
    cpu.set_program_counter(BASE);
    cpu
  }

  fn resolved(cpu: &Cpu<Silent>, width: Width) -> (u32, u16) {
    let mut consumed = 0;
    let value = cpu.resolve(BASE, 0, &mut consumed, width);
    (value, consumed)
  }

  /// The committer must find the same location and length as the resolver.
  fn assert_round_trip(cpu: &mut Cpu<Silent>, width: Width, value: u32) {
    let (_, consumed)       = resolved(cpu, width);
    let (_location, length) = cpu.locate(BASE, 0, width);
    assert_eq!(length, consumed);
    cpu.commit(BASE, 0, value, width);
    assert_eq!(resolved(cpu, width), (value, consumed));
  }

  #[test]
  fn inline_constant() {
    let mut cpu = fetched(Width::DoubleWord, &[inline(42)]);
    assert_eq!(resolved(&cpu, Width::DoubleWord), (42, 1));

    cpu.commit(BASE, 0, 7, Width::DoubleWord);
    assert_eq!(resolved(&cpu, Width::DoubleWord), (42, 1));
  }

  #[test]
  fn inline_pointer_operand() {
    let mut cpu = fetched(Width::Byte, &[inline_pointer(0x30)]);
    cpu.memory_mut().write_u8(0x30, 0xAB);
    assert_eq!(resolved(&cpu, Width::Byte), (0xAB, 1));
    assert_round_trip(&mut cpu, Width::Word, 0x1357);
    assert_eq!(cpu.memory().read_u16(0x30), 0x1357);
  }

  #[test]
  fn literal_constant() {
    let cpu = fetched(Width::Byte, &[literal(), 0x12]);
    assert_eq!(resolved(&cpu, Width::Byte), (0x12, 2));

    let cpu = fetched(Width::Word, &[literal(), 0x12, 0x34]);
    assert_eq!(resolved(&cpu, Width::Word), (0x1234, 3));

    let mut cpu = fetched(Width::DoubleWord, &[literal(), 0x12, 0x34, 0x56, 0x78]);
    assert_eq!(resolved(&cpu, Width::DoubleWord), (0x1234_5678, 5));

    cpu.commit(BASE, 0, 0, Width::DoubleWord);
    assert_eq!(resolved(&cpu, Width::DoubleWord), (0x1234_5678, 5));
  }

  #[test]
  fn literal_pointer_operand() {
    let mut cpu = fetched(Width::Word, &[literal_pointer(), 0x20, 0x00]);
    cpu.memory_mut().write_u16(0x2000, 0xBEEF);
    assert_eq!(resolved(&cpu, Width::Word), (0xBEEF, 3));
    assert_round_trip(&mut cpu, Width::DoubleWord, 0x0102_0304);
    assert_eq!(cpu.memory().read_u32(0x2000), 0x0102_0304);
  }

  #[test]
  fn register_operand_consumes_width() {
    let mut cpu = fetched(Width::Byte, &[register(3), 0]);
    cpu.registers_mut().write_u8(3, 0x77);
    assert_eq!(resolved(&cpu, Width::Byte), (0x77, 2));
    assert_eq!(resolved(&cpu, Width::Word), (0x7700, 3));
    assert_eq!(resolved(&cpu, Width::DoubleWord), (0x7700_0000, 5));
    assert_eq!(resolved(&cpu, Width::Void), (0, 1));
    assert_round_trip(&mut cpu, Width::Word, 0xA1B2);
    assert_eq!(cpu.registers().read_u8(3), 0xA1);
    assert_eq!(cpu.registers().read_u8(4), 0xB2);
  }

  #[test]
  fn register_pointer_operand() {
    let mut cpu = fetched(Width::DoubleWord, &[register_pointer(2)]);
    cpu.registers_mut().write_u16(2, 0x4000);
    cpu.memory_mut().write_u32(0x4000, 0xCAFE_F00D);
    assert_eq!(resolved(&cpu, Width::DoubleWord), (0xCAFE_F00D, 1));
    assert_round_trip(&mut cpu, Width::Byte, 0x5A);
    assert_eq!(cpu.memory().read_u8(0x4000), 0x5A);
  }

  #[test]
  fn program_counter_operand() {
    let mut cpu = fetched(Width::Byte, &[special(SPECIAL_PC)]);
    assert_eq!(resolved(&cpu, Width::Byte), (0x01, 1));
    assert_eq!(resolved(&cpu, Width::Word), (0x0101, 1));
    cpu.commit(BASE, 0, 0x0800, Width::Word);
    assert_eq!(cpu.program_counter(), 0x0800);
  }

  #[test]
  fn stack_pointer_operand() {
    let mut cpu = fetched(Width::Word, &[special(SPECIAL_SP)]);
    assert_eq!(resolved(&cpu, Width::Word), (0xFFFF, 1));
    assert_eq!(resolved(&cpu, Width::Byte), (0xFF, 1));
    assert_round_trip(&mut cpu, Width::Word, 0x8000);
    assert_eq!(cpu.stack_pointer(), 0x8000);
  }

  #[test]
  fn program_counter_pointer_addresses_opcode() {
    let cpu = fetched(Width::Byte, &[special_pointer(SPECIAL_PC)]);
    let opcode = encode_opcode(Operation::Mov, Width::Byte) as u32;
    assert_eq!(resolved(&cpu, Width::Byte), (opcode, 1));
    assert_eq!(cpu.locate(BASE, 0, Width::Byte), (Location::Memory(BASE - 1), 1));
    assert_eq!(cpu.locate(BASE, 2, Width::Byte).0, Location::Memory(BASE - 3));
  }

  #[test]
  fn program_counter_pointer_destination() {
    let mut cpu = fetched(Width::Byte, &[special_pointer(SPECIAL_PC)]);
    assert_round_trip(&mut cpu, Width::Byte, 0x28);
    assert_eq!(cpu.memory().read_u8((BASE - 1) as usize), 0x28);
    assert_eq!(cpu.program_counter(), BASE);
  }

  #[test]
  fn stack_pointer_pointer_operand() {
    let mut cpu = fetched(Width::Word, &[special_pointer(SPECIAL_SP)]);
    cpu.set_stack_pointer(0x3000);
    cpu.memory_mut().write_u16(0x3000, 0x4242);
    assert_eq!(resolved(&cpu, Width::Word), (0x4242, 1));
    assert_round_trip(&mut cpu, Width::Word, 0x1111);
    assert_eq!(cpu.memory().read_u16(0x3000), 0x1111);
  }

  #[test]
  fn unmapped_special_register() {
    let mut cpu = fetched(Width::Word, &[special(7)]);
    assert_eq!(resolved(&cpu, Width::Word), (0, 1));
    cpu.commit(BASE, 0, 0x9999, Width::Word);
    assert_eq!(cpu.program_counter(), BASE);
    assert_eq!(cpu.stack_pointer(), 0xFFFF);
  }

  #[test]
  fn second_operand_follows_first() {
    let cpu = fetched(Width::Word, &[register(0), 0, 0, literal(), 0xAB, 0xCD]);
    let mut consumed_a = 0;
    let mut consumed_b = 0;
    cpu.resolve(BASE, 0, &mut consumed_a, Width::Word);
    let b = cpu.resolve(BASE, consumed_a, &mut consumed_b, Width::Word);
    assert_eq!(consumed_a, 3);
    assert_eq!(consumed_b, 3);
    assert_eq!(b, 0xABCD);
  }

  #[test]
  fn suppressed_commit_writes_nothing() {
    let mut cpu = fetched(Width::Byte, &[register(0), 0]);
    cpu.commit_suppressed = true;
    cpu.commit(BASE, 0, 0x55, Width::Byte);
    assert_eq!(cpu.registers().read_u8(0), 0);
  }
}
