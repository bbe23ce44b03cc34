use bpsdelta::crc;
use bpsdelta::crc::Crc32;
use bpsdelta::patch;
use fs_err as fs;
use std::io;
use std::path;
use std::str;

/// Print a patch's declared sizes, checksums and metadata without applying it.
#[derive(Clone, Debug, clap::Args)]
pub struct Args {
  pub patch: path::PathBuf,
}

impl Args {
  pub fn call(self) -> Result<(), Error> {
    let patch_bytes = fs::read(&self.patch)?;
    let summary = patch::Summary::parse(&patch_bytes)?;
    let intact = Crc32::of(&patch_bytes) == crc::SELF_RESIDUE;
    println!("patch:       {} ({} bytes)", self.patch.display(), patch_bytes.len());
    println!("source size: {} bytes, crc32 {}", summary.source_size, summary.source_crc);
    println!("target size: {} bytes, crc32 {}", summary.target_size, summary.target_crc);
    println!("patch crc32: {} ({})", summary.patch_crc, if intact { "intact" } else { "MISMATCH" });
    if !summary.metadata.is_empty() {
      match str::from_utf8(summary.metadata) {
        Ok(text) => println!("metadata:    {text}"),
        Err(_) => println!("metadata:    {} bytes (not valid UTF-8)", summary.metadata.len()),
      }
    }
    Ok(())
  }
}

#[non_exhaustive]
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Error {
  #[error(transparent)]
  IO(#[from] io::Error),
  #[error(transparent)]
  Parsing(#[from] patch::Error),
}

impl Error {
  pub fn exit_code(&self) -> u8 {
    match self {
      Error::IO(_) => 2,
      Error::Parsing(_) => 3,
    }
  }
}
