//! Disk I/O helpers: load-and-validate and durable whole-file replace.
//!
//! The write goes to `<file>.tmp`, is fsynced, then renamed over the target,
//! so a reader sees either the old snapshot or the new one. On Unix the
//! parent directory is fsynced too so the rename itself survives a crash.
//! FAT32 and network shares give no such guarantee.

use crate::error::{Error, Result};
use crate::record::{validate, Record};
use crate::serializer::Serializer;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Reads and validates the file at `path`. A missing or empty file is an
/// empty table, not an error.
pub fn load<S: Serializer>(path: &Path, serializer: &S) -> Result<Vec<Record>> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::Io(e.to_string())),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    validate(serializer.deserialize(&bytes)?)
}

/// Write `bytes` to `<path>.tmp`, flush it to storage, then rename over
/// `path`. The temp file is removed if writing or renaming it fails.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let tmp = path.with_extension(format!("{ext}.tmp"));

    if let Err(err) = write_synced(&tmp, bytes).and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    sync_parent(path)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()
}

#[cfg(unix)]
fn sync_parent(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> Result<()> {
    Ok(())
}
