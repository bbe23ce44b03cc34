use crate::outfile;
use bpsdelta::patch;
use fs_err as fs;
use std::io;
use std::path;

/// Create a patch that rewrites `source` into `target`.
#[derive(Clone, Debug, clap::Args)]
pub struct Args {
  pub source: path::PathBuf,
  pub target: path::PathBuf,
  pub patch: path::PathBuf,
  /// Free-form note embedded in the patch header.
  pub metadata: Option<String>,
}

impl Args {
  pub fn call(self) -> Result<(), Error> {
    let source = fs::read(&self.source)?;
    let target = fs::read(&self.target)?;
    let patch = patch::encode(&source, &target, self.metadata.as_deref().unwrap_or(""))?;
    outfile::write_replacing(&self.patch, &patch)?;
    log::info!(
      "Wrote a {}-byte patch to {}.",
      patch.len(),
      self.patch.display()
    );
    Ok(())
  }
}

#[non_exhaustive]
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
  #[error(transparent)]
  IO(#[from] io::Error),
  #[error(transparent)]
  Encoding(#[from] patch::Error),
}

impl Error {
  pub fn exit_code(&self) -> u8 {
    match self {
      Error::IO(_) => 2,
      Error::Encoding(_) => 5,
    }
  }
}
