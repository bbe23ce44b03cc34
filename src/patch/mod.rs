//! The BPS v1 patch format: byte-stream grammar, decoder and encoder.

use crate::crc::Crc32;

mod decode;
mod encode;
pub mod matcher;
pub mod search;
mod summary;
pub mod varint;

pub use self::decode::{Decoded, decode};
pub use self::encode::{Encoder, encode};
pub use self::err::*;
pub use self::summary::Summary;

pub const MAGIC: &[u8] = b"BPS1";

/// Three little-endian CRC32 values close every patch: source, target, and
/// the patch itself up to this final field.
pub const FOOTER_LEN: usize = 3 * size_of::<u32>();

/// Magic, three zero-valued size varints, footer. Nothing shorter parses.
pub const MIN_PATCH_LEN: usize = MAGIC.len() + 3 + FOOTER_LEN;

/// Upper bound on the lengths of source, target and patch alike.
pub const SIZE_LIMIT: usize = i32::MAX as usize;

/// One step of the command stream.
///
/// `SourceRead` and the copies pull `length` bytes from the named range;
/// `TargetRead` pulls `length` literal bytes stored in the patch right after
/// the command varint. The copies first displace their cursor by a signed
/// `offset`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
  SourceRead { length: u64 },
  TargetRead { length: u64 },
  SourceCopy { length: u64, offset: i64 },
  TargetCopy { length: u64, offset: i64 },
}

impl Command {
  pub fn length(&self) -> u64 {
    match *self {
      Command::SourceRead { length }
      | Command::TargetRead { length }
      | Command::SourceCopy { length, .. }
      | Command::TargetCopy { length, .. } => length,
    }
  }
}

mod err {
  use super::Crc32;
  use thiserror::Error;

  /// Hard failures. The operation aborts and no output is produced.
  #[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
  pub enum Error {
    #[error("The patch is too short or does not begin with \"BPS1\".")]
    BadHeader,
    #[error("The patch ends in the middle of a command near offset {offset}.")]
    Truncated { offset: usize },
    #[error(
      "The patch was made for a {expected}-byte source, but the supplied source is {actual} bytes."
    )]
    SizeMismatch { expected: u64, actual: u64 },
    #[error("A declared or supplied size exceeds the 2 GiB limit.")]
    SizeOverflow,
    #[error("Refusing to create a patch with an empty target.")]
    EmptyTarget,
  }

  /// Diagnostic mismatches noticed after decoding finished.
  ///
  /// None of these abort the operation: the checksums guard against
  /// accidental corruption, and a user patching a near-match of the intended
  /// source still gets a candidate output to inspect. Callers that want
  /// stricter behavior can escalate any warning to a failure themselves.
  #[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
  pub enum Warning {
    #[error(
      "The source's checksum is {actual}, but the patch expects {expected}; \
       this patch was probably made for a different file."
    )]
    SourceCrcMismatch { expected: Crc32, actual: Crc32 },
    #[error("The produced output's checksum is {actual}, but the patch expects {expected}.")]
    TargetCrcMismatch { expected: Crc32, actual: Crc32 },
    #[error("The patch file's own checksum does not match its contents.")]
    PatchCrcMismatch { actual: Crc32 },
    #[error("The command stream produced {actual} bytes, but the header declares {declared}.")]
    TargetSizeMismatch { declared: u64, actual: u64 },
  }
}
