// storage/mod.rs
// Durable JSON files: atomic replace on write, tolerant read.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error_handling::PublishError;

/// A file written next to its target but not yet visible under the target name.
///
/// Dropping it without `commit` removes the temporary file.
pub struct StagedFile {
    tmp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    /// Renames the staged file over its target.
    pub fn commit(self) -> Result<(), PublishError> {
        let StagedFile { tmp, target } = self;
        tmp.persist(&target).map_err(|e| io_error(&target, e.error))?;
        log::debug!("Replaced {}", target.display());
        Ok(())
    }
}

/// Serializes `value` as pretty JSON into a staged file for `path`.
pub fn stage_json<T: Serialize>(
    path: &Path,
    value: &T,
    what: &'static str,
) -> Result<StagedFile, PublishError> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|source| PublishError::Serialize { what, source })?;
    stage_bytes(path, &bytes)
}

/// Writes `bytes` to a temporary file in the directory of `path`, flushed and
/// fsynced, so the later rename is the only step left.
pub fn stage_bytes(path: &Path, bytes: &[u8]) -> Result<StagedFile, PublishError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|source| io_error(dir, source))?;
    tmp.write_all(bytes)
        .map_err(|source| io_error(tmp.path(), source))?;
    tmp.flush().map_err(|source| io_error(tmp.path(), source))?;
    tmp.as_file()
        .sync_all()
        .map_err(|source| io_error(tmp.path(), source))?;

    log::debug!("Staged {} bytes for {}", bytes.len(), path.display());
    Ok(StagedFile {
        tmp,
        target: path.to_path_buf(),
    })
}

/// Serializes `value` as pretty JSON and replaces `path` atomically.
///
/// A reader sees either the previous file or the complete new one. On error
/// the previous file is untouched.
pub fn write_json_atomic<T: Serialize>(
    path: &Path,
    value: &T,
    what: &'static str,
) -> Result<(), PublishError> {
    stage_json(path, value, what)?.commit()
}

/// Replaces `path` with `bytes` through a temporary file and a rename.
pub fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> Result<(), PublishError> {
    stage_bytes(path, bytes)?.commit()
}

/// Current contents of `path`, `None` when it does not exist.
pub fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>, PublishError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(io_error(path, source)),
    }
}

/// Reads and deserializes a JSON file.
///
/// Returns `Ok(None)` when the file does not exist; any other I/O or parse
/// failure is returned as an error for the caller to classify.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&text)?))
}

fn io_error(path: &Path, source: std::io::Error) -> PublishError {
    PublishError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: usize,
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("sample.json");
        let sample = Sample {
            name: "銀座".into(),
            count: 3,
        };

        write_json_atomic(&path, &sample, "sample").expect("write");
        let loaded: Option<Sample> = read_json(&path).expect("read");
        assert_eq!(loaded, Some(sample));
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("sample.json");
        std::fs::write(&path, "old contents").expect("seed file");

        write_bytes_atomic(&path, b"{\"name\":\"new\",\"count\":1}").expect("write");
        let text = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(text, "{\"name\":\"new\",\"count\":1}");

        // Only the target remains; the temporary file was renamed over it
        let entries = std::fs::read_dir(dir.path()).expect("list").count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_staged_file_is_invisible_until_commit() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("sample.json");
        std::fs::write(&path, "old contents").expect("seed file");

        let staged = stage_bytes(&path, b"new contents").expect("stage");
        assert_eq!(std::fs::read(&path).expect("read"), b"old contents");

        staged.commit().expect("commit");
        assert_eq!(std::fs::read(&path).expect("read"), b"new contents");
    }

    #[test]
    fn test_dropped_stage_leaves_no_files() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("sample.json");

        drop(stage_bytes(&path, b"{}").expect("stage"));
        assert_eq!(std::fs::read_dir(dir.path()).expect("list").count(), 0);
        assert_eq!(read_bytes(&path).expect("read"), None);
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let loaded: Option<Sample> = read_json(&dir.path().join("absent.json")).expect("read");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_read_corrupt_file_is_error() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("corrupt.json");
        std::fs::write(&path, "{ not json").expect("seed file");
        let loaded: anyhow::Result<Option<Sample>> = read_json(&path);
        assert!(loaded.is_err());
    }

    #[test]
    fn test_write_into_file_path_parent_fails() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "i am a file").expect("seed file");

        // Parent "directory" is a regular file, so nothing can be created under it
        let result = write_bytes_atomic(&blocker.join("latest.json"), b"{}");
        assert!(matches!(result, Err(PublishError::Io { .. })));
    }
}
