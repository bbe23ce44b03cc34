use crate::crc::Crc32;
use crate::patch::matcher::longest_common_prefix;
use crate::patch::search::{
  FindLongest, Found, LinearFinder, MIN_MATCH_LEN, RollingFinder,
};
use crate::patch::varint::WriteNumber;
use crate::patch::{Command, Error, MAGIC, MIN_PATCH_LEN, SIZE_LIMIT};

/// Haystacks up to this size are searched exhaustively; larger ones use the
/// rolling-hash finder.
const LINEAR_LIMIT: usize = 1 << 20;

/// Creates a patch that rewrites `source` into `target`.
///
/// Picks a search back-end by input size. Use [`Encoder`] directly to pin a
/// back-end, or to amortize a [`SuffixFinder`] index over many targets that
/// share one source.
///
/// [`SuffixFinder`]: crate::patch::search::SuffixFinder
pub fn encode(source: &[u8], target: &[u8], metadata: &str) -> Result<Vec<u8>, Error> {
  if usize::max(source.len(), target.len()) <= LINEAR_LIMIT {
    Encoder::<LinearFinder>::new(source).encode(target, metadata)
  } else {
    log::debug!("inputs exceed {LINEAR_LIMIT} bytes, searching with rolling hashes");
    Encoder::<RollingFinder>::new(source).encode(target, metadata)
  }
}

/// A patch writer bound to one source and one search back-end.
///
/// Reusable across targets; all other scratch state is rebuilt inside each
/// [`encode`](Encoder::encode) call, so successive patches come out exactly
/// as they would from a fresh instance.
pub struct Encoder<'s, F = LinearFinder> {
  source: &'s [u8],
  finder: F,
}

impl<'s, F: FindLongest + Default> Encoder<'s, F> {
  pub fn new(source: &'s [u8]) -> Self {
    Self::with_finder(source, F::default())
  }
}

impl<'s, F: FindLongest> Encoder<'s, F> {
  pub fn with_finder(source: &'s [u8], finder: F) -> Self {
    Self { source, finder }
  }

  /// Walks the target left to right, at each position emitting the command
  /// that covers the most bytes; positions no copy can serve accumulate
  /// into literal runs.
  pub fn encode(&mut self, target: &[u8], metadata: &str) -> Result<Vec<u8>, Error>
  where
    F: Default,
  {
    if target.is_empty() {
      return Err(Error::EmptyTarget);
    }
    if usize::max(self.source.len(), target.len()) > SIZE_LIMIT {
      return Err(Error::SizeOverflow);
    }

    let mut patch = Vec::with_capacity(MIN_PATCH_LEN + metadata.len());
    patch.extend_from_slice(MAGIC);
    patch.write_number(self.source.len() as u64);
    patch.write_number(target.len() as u64);
    patch.write_number(metadata.len() as u64);
    patch.extend_from_slice(metadata.as_bytes());

    // Searches of the already-produced target get a finder of the same
    // kind, built afresh per call.
    let mut target_finder = F::default();
    let mut output_pos: usize = 0;
    let mut source_relative_offset: usize = 0;
    let mut target_relative_offset: usize = 0;
    let mut literals = PendingLiterals::default();

    while output_pos < target.len() {
      match self.next_run(&mut target_finder, target, output_pos) {
        Run::Literal => {
          literals.extend_to(output_pos);
          output_pos += 1;
        }
        Run::SourceRead { length } => {
          literals.flush(&mut patch, target);
          emit(&mut patch, Command::SourceRead { length: length as u64 });
          output_pos += length;
        }
        Run::SourceCopy { start, length } => {
          literals.flush(&mut patch, target);
          let offset = relative_offset(source_relative_offset, start);
          emit(&mut patch, Command::SourceCopy { length: length as u64, offset });
          source_relative_offset = start + length;
          output_pos += length;
        }
        Run::TargetCopy { start, length } => {
          literals.flush(&mut patch, target);
          let offset = relative_offset(target_relative_offset, start);
          emit(&mut patch, Command::TargetCopy { length: length as u64, offset });
          target_relative_offset = start + length;
          output_pos += length;
        }
      }
    }
    literals.flush(&mut patch, target);

    patch.extend_from_slice(&Crc32::of(self.source).value().to_le_bytes());
    patch.extend_from_slice(&Crc32::of(target).value().to_le_bytes());
    let patch_crc = Crc32::of(&patch);
    patch.extend_from_slice(&patch_crc.value().to_le_bytes());
    Ok(patch)
  }

  /// Picks the action covering the most bytes at `output_pos`.
  ///
  /// At equal length, reading the source in place beats a source copy beats
  /// a target copy: the candidates are tried in that order and only a
  /// strict improvement displaces an earlier one. A literal byte is the
  /// fallback when no match reaches [`MIN_MATCH_LEN`].
  fn next_run(&mut self, target_finder: &mut F, target: &[u8], output_pos: usize) -> Run {
    let needle = &target[output_pos..];
    let mut best_len = MIN_MATCH_LEN - 1;
    let mut best = Run::Literal;

    if output_pos < self.source.len() {
      let (length, exhausted) = longest_common_prefix(&self.source[output_pos..], needle);
      if exhausted {
        // the rest of the target mirrors the source; nothing can cover more
        return Run::SourceRead { length };
      }
      if length > best_len {
        best_len = length;
        best = Run::SourceRead { length };
      }
    }

    if let Some(Found { start, length }) =
      self.finder.find_longest(self.source, self.source.len(), needle)
    {
      if length > best_len {
        best_len = length;
        best = Run::SourceCopy { start, length };
      }
    }

    if let Some(Found { start, length }) = target_finder.find_longest(target, output_pos, needle) {
      if length > best_len {
        best = Run::TargetCopy { start, length };
      }
    }

    best
  }
}

enum Run {
  Literal,
  SourceRead { length: usize },
  SourceCopy { start: usize, length: usize },
  TargetCopy { start: usize, length: usize },
}

/// Literal bytes accumulate until a copyable run interrupts them, then leave
/// as a single `TargetRead` command followed by the bytes themselves.
#[derive(Default)]
struct PendingLiterals {
  start: usize,
  length: usize,
}

impl PendingLiterals {
  fn extend_to(&mut self, position: usize) {
    if self.length == 0 {
      self.start = position;
    }
    self.length += 1;
  }

  fn flush(&mut self, patch: &mut Vec<u8>, target: &[u8]) {
    if self.length == 0 {
      return;
    }
    emit(patch, Command::TargetRead { length: self.length as u64 });
    patch.extend_from_slice(&target[self.start..self.start + self.length]);
    self.length = 0;
  }
}

fn emit(patch: &mut Vec<u8>, command: Command) {
  let tag = match command {
    Command::SourceRead { .. } => 0,
    Command::TargetRead { .. } => 1,
    Command::SourceCopy { .. } => 2,
    Command::TargetCopy { .. } => 3,
  };
  patch.write_number(((command.length() - 1) << 2) | tag);
  if let Command::SourceCopy { offset, .. } | Command::TargetCopy { offset, .. } = command {
    patch.write_signed_number(offset);
  }
}

// Cursors and match starts are both capped by SIZE_LIMIT, so the widening
// casts are lossless.
fn relative_offset(cursor: usize, start: usize) -> i64 {
  start as i64 - cursor as i64
}
