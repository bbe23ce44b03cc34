use fs_err as fs;
use std::io;
use std::io::prelude::*;
use std::path;
use ulid::Ulid;

/// Writes `bytes` next to `path` under a temporary name, then renames into
/// place, so an interrupted run never leaves a half-written output behind.
pub fn write_replacing(path: &path::Path, bytes: &[u8]) -> io::Result<()> {
  let temp_path = path.with_file_name({
    let mut file_name = Ulid::new().to_string();
    file_name.push_str(".tmp");
    file_name
  });
  let mut temp_file = fs::OpenOptions::new()
    .create_new(true)
    .write(true)
    .open(&temp_path)?;
  let written = temp_file.write_all(bytes).and_then(|()| temp_file.flush());
  drop(temp_file); // close before renaming
  match written.and_then(|()| fs::rename(&temp_path, path)) {
    Ok(()) => Ok(()),
    Err(err) => {
      let _ = fs::remove_file(&temp_path);
      Err(err)
    }
  }
}
