//! File-backed key-value store with atomic writes
//!
//! Each key maps to one JSON file under the data directory. Writes go to a
//! temp file in the same directory which is synced and then renamed over the
//! target, so a crash never leaves a half-written snapshot behind.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::store::KeyValueStore;
use crate::error::{LedgerError, LedgerResult};

/// Write bytes to a file atomically (write to temp, then rename)
pub fn write_bytes_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> LedgerResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            LedgerError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Temp file must live in the same directory for the rename to be atomic
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| LedgerError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .map_err(|e| LedgerError::Storage(format!("Failed to write data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| LedgerError::Storage(format!("Failed to flush data: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| LedgerError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        LedgerError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Stores every key as `<root>/<namespace>/<name>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a store key to a file path.
    ///
    /// Only the first `/` separates a directory; every other character that
    /// is not safe in a file name is percent-encoded, so tenant keys can never
    /// escape the data directory.
    pub fn path_for(&self, key: &str) -> PathBuf {
        match key.split_once('/') {
            Some((namespace, name)) => self
                .root
                .join(encode_segment(namespace))
                .join(format!("{}.json", encode_segment(name))),
            None => self.root.join(format!("{}.json", encode_segment(key))),
        }
    }
}

fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for (i, c) in segment.chars().enumerate() {
        let safe = c.is_alphanumeric() || c == '-' || c == '_' || (c == '.' && i > 0);
        if safe {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    if out.is_empty() {
        out.push('%');
    }
    out
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LedgerError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, bytes: &[u8]) -> LedgerResult<()> {
        let path = self.path_for(key);
        debug!(key, path = %path.display(), size = bytes.len(), "writing store key");
        write_bytes_atomic(path, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_key_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().to_path_buf());
        assert!(store.get("projects/acme").unwrap().is_none());
    }

    #[test]
    fn test_set_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().to_path_buf());

        store.set("projects/acme", b"[]").unwrap();
        assert_eq!(store.get("projects/acme").unwrap().unwrap(), b"[]");
        assert!(temp_dir.path().join("projects").join("acme.json").exists());
    }

    #[test]
    fn test_atomic_write_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.json");

        write_bytes_atomic(&path, b"{}").unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("test.json.tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("test.json");

        write_bytes_atomic(&path, b"{}").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_unsafe_key_stays_inside_root() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().to_path_buf());

        let path = store.path_for("projects/../../etc/passwd");
        assert!(path.starts_with(temp_dir.path().join("projects")));
        assert_eq!(path.parent().unwrap(), temp_dir.path().join("projects"));

        store.set("projects/a/b", b"1").unwrap();
        assert_eq!(store.get("projects/a/b").unwrap().unwrap(), b"1");
        assert!(store.get("projects/a").unwrap().is_none());
    }
}
