//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt data on failure. Used by
//! the JSON store and by the exporters.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{ReviewError, ReviewResult};

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> ReviewResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| ReviewError::Store(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| ReviewError::Store(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write a file atomically: `fill` writes into a temp file next to `path`,
/// which is synced and renamed over `path` only if `fill` succeeds.
///
/// Errors from the filesystem are reported through `to_error`, so callers
/// decide whether a failure is a storage or an export problem.
pub fn write_atomic<P, F, E>(path: P, to_error: E, fill: F) -> ReviewResult<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> ReviewResult<()>,
    E: Fn(String) -> ReviewError,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            to_error(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Temp file in the same directory keeps the rename atomic
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let file = File::create(&temp_path)
        .map_err(|e| to_error(format!("Failed to create temp file: {}", e)))?;
    let mut writer = BufWriter::new(file);

    let written = fill(&mut writer)
        .and_then(|_| {
            writer
                .flush()
                .map_err(|e| to_error(format!("Failed to flush data: {}", e)))
        })
        .and_then(|_| {
            writer
                .get_ref()
                .sync_all()
                .map_err(|e| to_error(format!("Failed to sync data: {}", e)))
        });

    if let Err(e) = written {
        drop(writer);
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    drop(writer);

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        to_error(format!("Failed to rename temp file: {}", e))
    })
}

/// Write JSON to a file atomically
pub fn write_json_atomic<T, P>(path: P, data: &T) -> ReviewResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_atomic(path, ReviewError::Store, |writer| {
        serde_json::to_writer_pretty(writer, data)
            .map_err(|e| ReviewError::Store(format!("Failed to serialize data: {}", e)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn sample() -> TestData {
        TestData {
            name: "test".to_string(),
            value: 42,
        }
    }

    #[test]
    fn test_read_nonexistent_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let data: TestData = read_json(&path).unwrap();
        assert_eq!(data, TestData::default());
    }

    #[test]
    fn test_read_corrupt_file_is_store_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "not json at all").unwrap();

        let err = read_json::<TestData, _>(&path).unwrap_err();
        assert!(err.is_store());
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("test.json");

        write_json_atomic(&path, &sample()).unwrap();

        let loaded: TestData = read_json(&path).unwrap();
        assert_eq!(sample(), loaded);
        assert!(!temp_dir.path().join("nested").join("test.json.tmp").exists());
    }

    #[test]
    fn test_failed_fill_leaves_target_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        fs::write(&path, "original").unwrap();

        let result = write_atomic(&path, ReviewError::Export, |writer| {
            writer.write_all(b"partial").unwrap();
            Err(ReviewError::Export("boom".into()))
        });

        assert!(matches!(result, Err(ReviewError::Export(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
        assert!(!temp_dir.path().join("out.csv.tmp").exists());
    }
}
