use crate::crc;
use crate::crc::Crc32;
use crate::patch::varint::ReadNumber;
use crate::patch::{Command, Error, SIZE_LIMIT, Summary, Warning};
use std::io;
use std::io::prelude::*;

/// The outcome of a successful [`decode`]: the reconstructed target plus any
/// checksum or size mismatches noticed along the way.
#[derive(Clone, Debug)]
pub struct Decoded {
  pub target: Vec<u8>,
  pub warnings: Vec<Warning>,
}

/// Applies `patch` to `source`, reconstructing the target it was made for.
///
/// Structural problems (bad magic, truncated commands, a source of the
/// wrong length) are hard errors. Checksum mismatches are not: they are
/// collected as [`Warning`]s so the caller still receives the decoded bytes
/// when patching a close-but-not-identical source.
pub fn decode(source: &[u8], patch: &[u8]) -> Result<Decoded, Error> {
  if source.len() > SIZE_LIMIT || patch.len() > SIZE_LIMIT {
    return Err(Error::SizeOverflow);
  }
  let summary = Summary::parse(patch)?;
  if summary.source_size != source.len() as u64 {
    return Err(Error::SizeMismatch {
      expected: summary.source_size,
      actual: source.len() as u64,
    });
  }
  if summary.target_size > SIZE_LIMIT as u64 {
    return Err(Error::SizeOverflow);
  }

  let target = run_commands(source, &summary)?;

  let mut warnings = Vec::new();
  if target.len() as u64 != summary.target_size {
    warnings.push(Warning::TargetSizeMismatch {
      declared: summary.target_size,
      actual: target.len() as u64,
    });
  }
  let source_crc = Crc32::of(source);
  if source_crc != summary.source_crc {
    warnings.push(Warning::SourceCrcMismatch { expected: summary.source_crc, actual: source_crc });
  }
  let target_crc = Crc32::of(&target);
  if target_crc != summary.target_crc {
    warnings.push(Warning::TargetCrcMismatch { expected: summary.target_crc, actual: target_crc });
  }
  // A patch hashed over its own trailing checksum leaves a fixed residue.
  let patch_crc = Crc32::of(patch);
  if patch_crc != crc::SELF_RESIDUE {
    warnings.push(Warning::PatchCrcMismatch { actual: patch_crc });
  }
  for warning in &warnings {
    log::debug!("{warning}");
  }

  Ok(Decoded { target, warnings })
}

fn run_commands(source: &[u8], summary: &Summary<'_>) -> Result<Vec<u8>, Error> {
  let target_size = summary.target_size as usize;
  let mut target: Vec<u8> = Vec::with_capacity(target_size);
  let mut commands = summary.commands;
  let mut source_relative_offset: usize = 0;
  let mut target_relative_offset: usize = 0;

  while !commands.is_empty() {
    let at = summary.commands_offset + (summary.commands.len() - commands.len());
    let truncated = Error::Truncated { offset: at };
    let command = commands.decode_command().map_err(|_| truncated)?;

    // every command writes; never past the declared target size
    if target.len() as u64 + command.length() > summary.target_size {
      return Err(truncated);
    }
    let length = command.length() as usize;

    match command {
      Command::SourceRead { .. } => {
        let start = target.len();
        let data = source.get(start..start + length).ok_or(truncated)?;
        target.extend_from_slice(data);
      }
      Command::TargetRead { .. } => {
        let (data, rest) = commands.split_at_checked(length).ok_or(truncated)?;
        target.extend_from_slice(data);
        commands = rest;
      }
      Command::SourceCopy { offset, .. } => {
        source_relative_offset = displace(source_relative_offset, offset).ok_or(truncated)?;
        let data = source.get(source_relative_offset..source_relative_offset + length).ok_or(truncated)?;
        target.extend_from_slice(data);
        source_relative_offset += length;
      }
      Command::TargetCopy { offset, .. } => {
        target_relative_offset = displace(target_relative_offset, offset).ok_or(truncated)?;
        // reading ahead of the write cursor is meaningless; reading right up
        // to it (and past it, as the copy proceeds) is how runs are expanded
        if target_relative_offset >= target.len() {
          return Err(truncated);
        }
        if target_relative_offset + length <= target.len() {
          target.extend_from_within(target_relative_offset..target_relative_offset + length);
        } else {
          // Overlapping copy: each byte written becomes readable by the
          // next, so this must stay a bytewise loop, not a bulk copy.
          for index in target_relative_offset..target_relative_offset + length {
            let byte = target[index];
            target.push(byte);
          }
        }
        target_relative_offset += length;
      }
    }
  }

  Ok(target)
}

fn displace(position: usize, offset: i64) -> Option<usize> {
  isize::try_from(offset)
    .ok()
    .and_then(|offset| position.checked_add_signed(offset))
    // keeps later `position + length` arithmetic overflow-free
    .filter(|&position| position <= SIZE_LIMIT)
}

pub(crate) trait ReadCommands: Read + ReadNumber {
  fn decode_command(&mut self) -> Result<Command, io::Error> {
    let encoded = self.read_number()?;
    let length = (encoded >> 2) + 1;
    Ok(match encoded & 3 {
      0 => Command::SourceRead { length },
      1 => Command::TargetRead { length },
      2 => Command::SourceCopy { length, offset: self.read_signed_number()? },
      _ => Command::TargetCopy { length, offset: self.read_signed_number()? },
    })
  }
}

impl<R: Read> ReadCommands for R {}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::patch::varint::WriteNumber;
  use crate::patch::MAGIC;

  fn emit_command(patch: &mut Vec<u8>, command: Command) {
    patch.write_number(((command.length() - 1) << 2) | tag(command));
    if let Command::SourceCopy { offset, .. } | Command::TargetCopy { offset, .. } = command {
      patch.write_signed_number(offset);
    }
  }

  fn tag(command: Command) -> u64 {
    match command {
      Command::SourceRead { .. } => 0,
      Command::TargetRead { .. } => 1,
      Command::SourceCopy { .. } => 2,
      Command::TargetCopy { .. } => 3,
    }
  }

  /// Builds a structurally valid patch around the given command stream,
  /// with correct checksums throughout.
  fn patch_of(source: &[u8], target: &[u8], body: impl FnOnce(&mut Vec<u8>)) -> Vec<u8> {
    let mut patch = Vec::new();
    patch.extend_from_slice(MAGIC);
    patch.write_number(source.len() as u64);
    patch.write_number(target.len() as u64);
    patch.write_number(0);
    body(&mut patch);
    patch.extend_from_slice(&Crc32::of(source).value().to_le_bytes());
    patch.extend_from_slice(&Crc32::of(target).value().to_le_bytes());
    let patch_crc = Crc32::of(&patch);
    patch.extend_from_slice(&patch_crc.value().to_le_bytes());
    patch
  }

  #[test]
  pub fn source_read_and_target_read() {
    let source = b"Hello World";
    let target = b"Hello Rust!";
    let patch = patch_of(source, target, |patch| {
      emit_command(patch, Command::SourceRead { length: 6 });
      emit_command(patch, Command::TargetRead { length: 5 });
      patch.extend_from_slice(b"Rust!");
    });
    let decoded = decode(source, &patch).unwrap();
    assert_eq!(decoded.target, target);
    assert_eq!(decoded.warnings, vec![]);
  }

  #[test]
  pub fn overlapping_target_copy_expands_runs() {
    // "ab" then a copy reading one byte behind the write cursor: the copy
    // reads what it just wrote, yielding five more copies of 'b'.
    let source = b"";
    let target = b"abbbbbb";
    let patch = patch_of(source, target, |patch| {
      emit_command(patch, Command::TargetRead { length: 2 });
      patch.extend_from_slice(b"ab");
      emit_command(patch, Command::TargetCopy { length: 5, offset: 1 });
    });
    let decoded = decode(source, &patch).unwrap();
    assert_eq!(decoded.target, target);
    assert_eq!(decoded.warnings, vec![]);
  }

  #[test]
  pub fn backward_target_copy_repeats_a_period() {
    let source = b"";
    let target = b"ABCABCABCABC";
    let patch = patch_of(source, target, |patch| {
      emit_command(patch, Command::TargetRead { length: 3 });
      patch.extend_from_slice(b"ABC");
      emit_command(patch, Command::TargetCopy { length: 9, offset: 0 });
    });
    let decoded = decode(source, &patch).unwrap();
    assert_eq!(decoded.target, target);
    assert_eq!(decoded.warnings, vec![]);
  }

  #[test]
  pub fn target_copy_cursor_can_move_backward() {
    let source = b"";
    let target = b"aaaaaa";
    let patch = patch_of(source, target, |patch| {
      emit_command(patch, Command::TargetRead { length: 1 });
      patch.extend_from_slice(b"a");
      emit_command(patch, Command::TargetCopy { length: 2, offset: 0 });
      emit_command(patch, Command::TargetCopy { length: 3, offset: -2 });
    });
    let decoded = decode(source, &patch).unwrap();
    assert_eq!(decoded.target, target);
    assert_eq!(decoded.warnings, vec![]);
  }

  #[test]
  pub fn source_copy_honors_its_cursor() {
    let source = b"abcdef";
    let target = b"defabc";
    let patch = patch_of(source, target, |patch| {
      emit_command(patch, Command::SourceCopy { length: 3, offset: 3 });
      emit_command(patch, Command::SourceCopy { length: 3, offset: -6 });
    });
    let decoded = decode(source, &patch).unwrap();
    assert_eq!(decoded.target, target);
    assert_eq!(decoded.warnings, vec![]);
  }

  #[test]
  pub fn source_read_past_the_end_is_truncated() {
    let source = b"ab";
    let target = b"abcd";
    let patch = patch_of(source, target, |patch| {
      emit_command(patch, Command::SourceRead { length: 4 });
    });
    assert!(matches!(decode(source, &patch).unwrap_err(), Error::Truncated { .. }));
  }

  #[test]
  pub fn writing_past_the_declared_target_is_truncated() {
    let source = b"abcdef";
    let target = b"abc";
    let patch = patch_of(source, target, |patch| {
      emit_command(patch, Command::SourceRead { length: 5 });
    });
    assert!(matches!(decode(source, &patch).unwrap_err(), Error::Truncated { .. }));
  }

  #[test]
  pub fn target_copy_may_not_read_ahead_of_the_write_cursor() {
    let source = b"";
    let target = b"aaaa";
    let patch = patch_of(source, target, |patch| {
      emit_command(patch, Command::TargetRead { length: 1 });
      patch.extend_from_slice(b"a");
      emit_command(patch, Command::TargetCopy { length: 3, offset: 2 });
    });
    assert!(matches!(decode(source, &patch).unwrap_err(), Error::Truncated { .. }));
  }

  #[test]
  pub fn wrong_source_length_is_a_size_mismatch() {
    let source = b"Hello World";
    let patch = patch_of(source, source, |patch| {
      emit_command(patch, Command::SourceRead { length: source.len() as u64 });
    });
    let err = decode(b"Hello Worl", &patch).unwrap_err();
    assert_eq!(err, Error::SizeMismatch { expected: 11, actual: 10 });
  }

  #[test]
  pub fn short_command_stream_warns_about_the_size() {
    let source = b"abcdef";
    let target = b"abcdef";
    let patch = patch_of(source, target, |patch| {
      emit_command(patch, Command::SourceRead { length: 4 });
    });
    let decoded = decode(source, &patch).unwrap();
    assert_eq!(decoded.target, b"abcd");
    assert!(decoded.warnings.contains(&Warning::TargetSizeMismatch { declared: 6, actual: 4 }));
    // the produced bytes differ from the declared target, so its checksum
    // mismatches as well
    assert_eq!(decoded.warnings.len(), 2);
  }
}
