use crate::crc::Crc32;
use crate::patch::varint::ReadNumber;
use crate::patch::{Error, FOOTER_LEN, MAGIC, MIN_PATCH_LEN};

/// A patch's header and footer, parsed without applying anything.
///
/// Backs the decoder's first pass and patch inspection. The command stream
/// itself is only delimited here, not interpreted.
#[derive(Clone, Copy, Debug)]
pub struct Summary<'a> {
  pub source_size: u64,
  pub target_size: u64,
  /// Opaque to the codec; by convention UTF-8 (often XML) written by the
  /// patch author.
  pub metadata: &'a [u8],
  pub source_crc: Crc32,
  pub target_crc: Crc32,
  pub patch_crc: Crc32,
  pub(crate) commands: &'a [u8],
  pub(crate) commands_offset: usize,
}

impl<'a> Summary<'a> {
  pub fn parse(patch: &'a [u8]) -> Result<Self, Error> {
    if patch.len() < MIN_PATCH_LEN {
      return Err(Error::BadHeader);
    }
    let Some(body) = patch.strip_prefix(MAGIC) else {
      return Err(Error::BadHeader);
    };
    let body = &body[..body.len() - FOOTER_LEN];

    // Offsets are relative to the whole patch; `body` excludes the magic.
    let body_end = MAGIC.len() + body.len();
    let truncated = |rest: &[u8]| Error::Truncated { offset: body_end - rest.len() };

    let mut reader = body;
    let source_size = reader.read_number().map_err(|_| truncated(reader))?;
    let target_size = reader.read_number().map_err(|_| truncated(reader))?;
    let metadata_size = reader.read_number().map_err(|_| truncated(reader))?;
    let metadata_size = usize::try_from(metadata_size).map_err(|_| truncated(reader))?;
    let Some((metadata, commands)) = reader.split_at_checked(metadata_size) else {
      return Err(truncated(reader));
    };

    let (source_crc, target_crc, patch_crc) = footer_crcs(patch);
    Ok(Self {
      source_size,
      target_size,
      metadata,
      source_crc,
      target_crc,
      patch_crc,
      commands,
      commands_offset: body_end - commands.len(),
    })
  }
}

fn footer_crcs(patch: &[u8]) -> (Crc32, Crc32, Crc32) {
  let crc_at = |index: usize| {
    let bytes = &patch[patch.len() - FOOTER_LEN + 4 * index..][..4];
    Crc32::new(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
  };
  (crc_at(0), crc_at(1), crc_at(2))
}

#[cfg(test)]
mod tests {
  use super::*;

  // magic, sizes 3/4, metadata "ab", no commands, arbitrary footer bytes
  const PATCH: &[u8] = &[
    0x42, 0x50, 0x53, 0x31, 0x83, 0x84, 0x82, b'a', b'b', //
    1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0,
  ];

  #[test]
  pub fn parses_header_and_footer() {
    let summary = Summary::parse(PATCH).unwrap();
    assert_eq!(summary.source_size, 3);
    assert_eq!(summary.target_size, 4);
    assert_eq!(summary.metadata, b"ab");
    assert_eq!(summary.commands, b"");
    assert_eq!(summary.commands_offset, 9);
    assert_eq!(summary.source_crc.value(), 1);
    assert_eq!(summary.target_crc.value(), 2);
    assert_eq!(summary.patch_crc.value(), 3);
  }

  #[test]
  pub fn rejects_short_or_mismagicked_patches() {
    assert_eq!(Summary::parse(b"BPS1").unwrap_err(), Error::BadHeader);
    assert_eq!(Summary::parse(&PATCH[..18]).unwrap_err(), Error::BadHeader);
    let mut wrong_magic = PATCH.to_vec();
    wrong_magic[3] = b'2';
    assert_eq!(Summary::parse(&wrong_magic).unwrap_err(), Error::BadHeader);
  }

  #[test]
  pub fn rejects_metadata_running_into_the_footer() {
    let mut patch = PATCH.to_vec();
    patch[6] = 0x90; // declares 16 metadata bytes; only 2 remain before the footer
    assert!(matches!(Summary::parse(&patch).unwrap_err(), Error::Truncated { .. }));
  }

  #[test]
  pub fn rejects_a_size_varint_running_into_the_footer() {
    // continuation bytes all the way to the footer boundary
    let patch = [&b"BPS1"[..], &[0u8; 3], &[0u8; FOOTER_LEN]].concat();
    assert!(matches!(Summary::parse(&patch).unwrap_err(), Error::Truncated { .. }));
  }
}
