//! Files backing a registry: one record per dictionary plus the alias metadata.
//!
//! Every write goes to a temporary file in the target directory, is synced,
//! and then renamed over the target. A reader sees either the previous
//! complete file or the new complete file.
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::constants::{METADATA_FILE, RECORD_EXTENSION};

/// A failed filesystem operation on a storage path.
#[derive(Debug, thiserror::Error)]
#[error("I/O error on '{}'", .path.display())]
pub struct StorageError {
    /// file or directory the operation touched
    pub path: PathBuf,
    /// underlying error
    #[source]
    pub source: io::Error,
}

trait Context<T> {
    fn at(self, path: &Path) -> Result<T, StorageError>;
}

impl<T> Context<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T, StorageError> {
        self.map_err(|source| StorageError {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Storage directory of a registry.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

/// Bytes written to a temporary file, waiting to replace their target.
///
/// Dropping it without [`StagedWrite::commit`] deletes the temporary file
/// and leaves the target as it was.
#[derive(Debug)]
pub struct StagedWrite {
    file: NamedTempFile,
    target: PathBuf,
}

impl StagedWrite {
    /// Path of the temporary file holding the new contents.
    pub fn temp_path(&self) -> &Path {
        self.file.path()
    }

    /// Atomically moves the new contents over the target.
    pub fn commit(self) -> Result<(), StorageError> {
        let StagedWrite { file, target } = self;

        file.persist(&target).map_err(|e| e.error).at(&target)?;

        #[cfg(unix)]
        if let Some(dir) = target.parent() {
            File::open(dir).and_then(|d| d.sync_all()).at(dir)?;
        }

        Ok(())
    }
}

impl Storage {
    /// Uses `dir`, which must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Storage {
        Storage { dir: dir.into() }
    }

    /// The storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record holding dictionary `code`.
    pub fn record_path(&self, code: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", code, RECORD_EXTENSION))
    }

    /// Path of the alias metadata file.
    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// Codes of every record file in the directory.
    pub fn record_codes(&self) -> Result<Vec<String>, StorageError> {
        let suffix = format!(".{}", RECORD_EXTENSION);
        let mut codes = vec![];

        for entry in fs::read_dir(&self.dir).at(&self.dir)? {
            let entry = entry.at(&self.dir)?;
            if !entry.file_type().at(&entry.path())?.is_file() {
                continue;
            }

            let name = match entry.file_name().into_string() {
                Ok(v) => v,
                Err(name) => {
                    log::warn!("skipping non UTF-8 file name {:?}", name);
                    continue;
                }
            };

            match name.strip_suffix(&suffix) {
                Some(code) if !code.is_empty() => codes.push(code.to_string()),
                _ => {}
            }
        }

        Ok(codes)
    }

    /// Raw contents of the record of `code`.
    pub fn read_record(&self, code: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.record_path(code);
        fs::read(&path).at(&path)
    }

    /// Raw metadata contents, `None` when no metadata was ever written.
    pub fn read_metadata(&self) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.metadata_path();
        match fs::read(&path) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).at(&path),
        }
    }

    /// Writes `bytes` next to `target` without touching `target` itself.
    pub fn stage(&self, target: PathBuf, bytes: &[u8]) -> Result<StagedWrite, StorageError> {
        let prefix = match target.file_name() {
            Some(name) => format!("{}.", name.to_string_lossy()),
            None => ".".to_string(),
        };

        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .at(&self.dir)?;

        file.write_all(bytes).at(file.path())?;
        file.flush().at(file.path())?;
        file.as_file().sync_all().at(file.path())?;

        Ok(StagedWrite { file, target })
    }

    /// Atomically replaces the record of `code`.
    pub fn write_record(&self, code: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.stage(self.record_path(code), bytes)?.commit()
    }

    /// Atomically replaces the metadata file.
    pub fn write_metadata(&self, bytes: &[u8]) -> Result<(), StorageError> {
        self.stage(self.metadata_path(), bytes)?.commit()
    }

    /// Deletes the record of `code`; a missing record is not an error.
    pub fn remove_record(&self, code: &str) -> Result<(), StorageError> {
        let path = self.record_path(code);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).at(&path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_records() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());

        storage.write_record("en", b"one").unwrap();
        storage.write_record("pt.br", b"two").unwrap();
        storage.write_metadata(b"{}").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::write(dir.path().join(".dict"), b"").unwrap();
        fs::create_dir(dir.path().join("nested.dict")).unwrap();

        let mut codes = storage.record_codes().unwrap();
        codes.sort();
        assert_eq!(codes, vec!["en".to_string(), "pt.br".to_string()]);
    }

    #[test]
    fn missing_metadata_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());

        assert!(storage.read_metadata().unwrap().is_none());
        storage.write_metadata(b"{}").unwrap();
        assert_eq!(storage.read_metadata().unwrap().unwrap(), b"{}");
    }

    #[test]
    fn uncommitted_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        storage.write_record("en", b"old").unwrap();

        let staged = storage.stage(storage.record_path("en"), b"new").unwrap();
        let temp = staged.temp_path().to_path_buf();
        assert_eq!(fs::read(&temp).unwrap(), b"new");
        assert_eq!(storage.read_record("en").unwrap(), b"old");
        assert_eq!(storage.record_codes().unwrap(), vec!["en".to_string()]);

        drop(staged);
        assert!(!temp.exists());
        assert_eq!(storage.read_record("en").unwrap(), b"old");
    }

    #[test]
    fn committed_write_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        storage.write_record("en", b"old").unwrap();

        let staged = storage.stage(storage.record_path("en"), b"new").unwrap();
        let temp = staged.temp_path().to_path_buf();
        staged.commit().unwrap();

        assert!(!temp.exists());
        assert_eq!(storage.read_record("en").unwrap(), b"new");
    }

    #[test]
    fn remove_missing_record_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());

        storage.remove_record("en").unwrap();
        storage.write_record("en", b"x").unwrap();
        storage.remove_record("en").unwrap();
        assert!(!storage.record_path("en").exists());
    }

    #[test]
    fn errors_carry_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("missing"));

        let err = storage.record_codes().unwrap_err();
        assert_eq!(err.path, dir.path().join("missing"));
        assert_eq!(err.source.kind(), io::ErrorKind::NotFound);
    }
}
