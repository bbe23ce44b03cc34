use std::fmt;

/// A CRC-32/ISO-HDLC checksum, as used by the BPS patch footer.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Crc32(u32);

/// The checksum of any byte sequence followed by its own checksum in
/// little-endian order. A patch hashed over its entire length, trailing
/// checksum field included, must produce this value.
pub const SELF_RESIDUE: Crc32 = Crc32(0x2144_DF1C);

impl Crc32 {
  pub fn new(value: u32) -> Self {
    Self(value)
  }

  pub fn of(bytes: &[u8]) -> Self {
    Self(crc32fast::hash(bytes))
  }

  pub fn value(&self) -> u32 {
    self.0
  }
}

impl fmt::Display for Crc32 {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:08x}", self.0)
  }
}
