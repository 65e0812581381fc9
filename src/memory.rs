//! Byte stores with big-endian multi-byte access.
//!
//! Both the flat memory and the register file are plain byte arrays. The `BigEndian` trait holds
//! the 8/16/32-bit accessors once; implementors only decide how an index maps onto their bytes,
//! which is where the bounds policy lives.

use crate::bytecode::Width;

pub const MEMORY_SIZE: usize = 0x1_0000;
pub const ADDRESS_MASK: usize = MEMORY_SIZE - 1;
pub const REGISTER_COUNT: usize = 32;
/// Extra bytes after the last register so that a 32-bit access at register 31 stays in range.
pub const REGISTER_PADDING: usize = 3;
const REGISTER_SLOTS: usize = REGISTER_COUNT + REGISTER_PADDING;

/**
  Big-endian access over a byte store. The high byte of a multi-byte value lives at the lowest
  index. Indices past `u16`/register range are the implementor's business; see `Memory` and
  `RegisterFile`.
*/
pub trait BigEndian {
  fn byte(&self, index: usize) -> u8;
  fn set_byte(&mut self, index: usize, value: u8);

  fn read_u8(&self, index: usize) -> u8 {
    self.byte(index)
  }

  fn read_u16(&self, index: usize) -> u16 {
    u16::from_be_bytes([self.byte(index), self.byte(index + 1)])
  }

  fn read_u32(&self, index: usize) -> u32 {
    u32::from_be_bytes([
      self.byte(index),
      self.byte(index + 1),
      self.byte(index + 2),
      self.byte(index + 3)
    ])
  }

  fn write_u8(&mut self, index: usize, value: u8) {
    self.set_byte(index, value);
  }

  fn write_u16(&mut self, index: usize, value: u16) {
    for (i, byte) in value.to_be_bytes().iter().enumerate() {
      self.set_byte(index + i, *byte);
    }
  }

  fn write_u32(&mut self, index: usize, value: u32) {
    for (i, byte) in value.to_be_bytes().iter().enumerate() {
      self.set_byte(index + i, *byte);
    }
  }

  /// Reads a value of the given width, zero-extended. `Width::Void` reads nothing and yields 0.
  fn read(&self, index: usize, width: Width) -> u32 {
    match width {
      Width::Void       => 0,
      Width::Byte       => self.read_u8(index) as u32,
      Width::Word       => self.read_u16(index) as u32,
      Width::DoubleWord => self.read_u32(index),
    }
  }

  /// Writes the low `width` bytes of `value`. `Width::Void` writes nothing.
  fn write(&mut self, index: usize, width: Width, value: u32) {
    match width {
      Width::Void       => {},
      Width::Byte       => self.write_u8(index, value as u8),
      Width::Word       => self.write_u16(index, value as u16),
      Width::DoubleWord => self.write_u32(index, value),
    }
  }
}


/// The flat 64 KiB address space. Every index is masked into range, so accesses wrap around.
#[derive(Clone)]
pub struct Memory {
  bytes: Box<[u8]>
}

impl Memory {
  pub fn new() -> Memory {
    Memory {
      bytes: vec![0u8; MEMORY_SIZE].into_boxed_slice()
    }
  }

  /// Copies `data` into memory starting at `offset`, wrapping past the top of the address space.
  pub fn load(&mut self, offset: u16, data: &[u8]) {
    for (i, byte) in data.iter().enumerate() {
      self.set_byte(offset as usize + i, *byte);
    }
  }

  pub fn clear(&mut self) {
    for byte in self.bytes.iter_mut() {
      *byte = 0;
    }
  }

  pub fn as_slice(&self) -> &[u8] {
    &self.bytes
  }
}

impl Default for Memory {
  fn default() -> Self {
    Memory::new()
  }
}

impl BigEndian for Memory {
  fn byte(&self, index: usize) -> u8 {
    self.bytes[index & ADDRESS_MASK]
  }

  fn set_byte(&mut self, index: usize, value: u8) {
    self.bytes[index & ADDRESS_MASK] = value;
  }
}


/**
  The 32 general-purpose byte slots. A register code addresses a single byte; wider accesses
  spill into the following slots, and the padding keeps a 32-bit access at code 31 in bounds.
  The decoder masks register codes to five bits; indices past the padding wrap around the slots.
*/
#[derive(Clone)]
pub struct RegisterFile {
  slots: [u8; REGISTER_SLOTS]
}

impl RegisterFile {
  pub fn new() -> RegisterFile {
    RegisterFile {
      slots: [0; REGISTER_SLOTS]
    }
  }

  pub fn clear(&mut self) {
    self.slots = [0; REGISTER_SLOTS];
  }

  /// The visible registers, without padding.
  pub fn as_slice(&self) -> &[u8] {
    &self.slots[..REGISTER_COUNT]
  }
}

impl Default for RegisterFile {
  fn default() -> Self {
    RegisterFile::new()
  }
}

impl BigEndian for RegisterFile {
  fn byte(&self, index: usize) -> u8 {
    self.slots[index % REGISTER_SLOTS]
  }

  fn set_byte(&mut self, index: usize, value: u8) {
    self.slots[index % REGISTER_SLOTS] = value;
  }
}
