use byteorder::ReadBytesExt;
use checked::Checked;
use std::io;
use std::io::prelude::*;

pub trait ReadNumber: Read {
  /// Reads a BPS varint. If the value overflows, returns an
  /// [InvalidData](std::io::ErrorKind::InvalidData) error.
  fn read_number(&mut self) -> Result<u64, io::Error> {
    let mut data: u64 = 0;
    let mut shift = Checked::<u64>::new(1);
    loop {
      let byte = self.read_u8()?;
      let new_value: u64 = ((byte as u64 & 0x7F) * shift + data) //
        .ok_or_else(overflow_err)?;
      if is_msb_set(byte) {
        return Ok(new_value);
      }
      // equivalent to `shift << 7`, but multiplication will check for overflow
      shift = shift * 128;
      // BPS subtracts 1 after encoding each byte.
      // Adding the shift after decoding each byte reverses that operation.
      data = (new_value + shift).ok_or_else(overflow_err)?;
    }
  }

  /// Reads a signed offset: an unsigned varint holding the magnitude shifted
  /// up one bit, with the sign in the low bit.
  fn read_signed_number(&mut self) -> Result<i64, io::Error> {
    let encoded = self.read_number()?;
    // 63 bits always fit in an i64.
    Ok(((encoded >> 1) as i64) * (if encoded & 1 == 1 { -1 } else { 1 }))
  }
}

impl<R> ReadNumber for R where R: Read {}

/// The writing half of the varint codec. Patches are built in memory, so
/// this extends the output buffer directly instead of an [`io::Write`].
pub trait WriteNumber {
  fn write_number(&mut self, value: u64);
  fn write_signed_number(&mut self, value: i64);
}

impl WriteNumber for Vec<u8> {
  /// Writes a BPS varint. The most significant bit of the terminating byte
  /// is set; every continuation byte implicitly carries one extra unit, so
  /// each value has exactly one encoding.
  fn write_number(&mut self, mut value: u64) {
    loop {
      let byte = (value & 0x7F) as u8;
      value >>= 7;
      if value == 0 {
        self.push(byte | 0x80);
        return;
      }
      self.push(byte);
      value -= 1;
    }
  }

  /// Writes a signed offset. `+0` and `-0` share the encoding `0`.
  fn write_signed_number(&mut self, value: i64) {
    self.write_number((value.unsigned_abs() << 1) | u64::from(value < 0));
  }
}

pub fn overflow_err() -> io::Error {
  io::Error::from(io::ErrorKind::InvalidData)
}

fn is_msb_set(byte: u8) -> bool {
  byte & 0x80 == 0x80
}
