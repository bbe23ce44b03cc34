use crate::outfile;
use bpsdelta::crc::Crc32;
use bpsdelta::patch;
use bpsdelta::patch::Warning;
use fs_err as fs;
use std::io;
use std::path;

/// Apply a patch to `source`, writing the reconstructed file to `target`.
///
/// Checksum mismatches are reported but do not fail the run unless
/// `--strict` is given; a patch made for a close variant of the source
/// still produces output worth inspecting.
#[derive(Clone, Debug, clap::Args)]
pub struct Args {
  pub source: path::PathBuf,
  pub patch: path::PathBuf,
  pub target: path::PathBuf,
  /// Fail instead of warning when a checksum or size does not match.
  #[arg(long)]
  pub strict: bool,
}

impl Args {
  pub fn call(self) -> Result<(), Error> {
    let source = fs::read(&self.source)?;
    let patch_bytes = fs::read(&self.patch)?;
    let decoded = patch::decode(&source, &patch_bytes)?;
    for warning in &decoded.warnings {
      log::warn!("{warning}");
    }
    if self.strict && !decoded.warnings.is_empty() {
      return Err(strict_error(&source, &patch_bytes, &decoded.warnings));
    }
    outfile::write_replacing(&self.target, &decoded.target)?;
    log::info!(
      "Wrote {} bytes to {}.",
      decoded.target.len(),
      self.target.display()
    );
    Ok(())
  }
}

fn strict_error(source: &[u8], patch_bytes: &[u8], warnings: &[Warning]) -> Error {
  if warnings.iter().any(|warning| matches!(warning, Warning::SourceCrcMismatch { .. })) {
    // A source that already hashes to the declared output is not "wrong",
    // the patch has just been applied to it before.
    if let Ok(summary) = patch::Summary::parse(patch_bytes) {
      if Crc32::of(source) == summary.target_crc {
        return Error::AlreadyPatched;
      }
    }
    return Error::WrongInputFile;
  }
  Error::CorruptPatch
}

#[non_exhaustive]
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
  #[error(transparent)]
  IO(#[from] io::Error),
  #[error(transparent)]
  Decoding(#[from] patch::Error),
  #[error("This patch has already been applied to the input file.")]
  AlreadyPatched,
  #[error("The patch is not meant for this file.")]
  WrongInputFile,
  #[error("The patch or its output failed checksum validation.")]
  CorruptPatch,
}

impl Error {
  pub fn exit_code(&self) -> u8 {
    use bpsdelta::patch::Error as P;
    match self {
      Error::IO(_) => 2,
      Error::Decoding(P::BadHeader | P::Truncated { .. }) => 3,
      Error::Decoding(P::SizeMismatch { .. }) => 4,
      Error::Decoding(_) => 5,
      Error::AlreadyPatched | Error::WrongInputFile => 4,
      Error::CorruptPatch => 3,
    }
  }
}
