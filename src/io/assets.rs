use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
};

use crate::{Error, Result};

/// Where sample bytes come from.
///
/// Paths are relative and use `/` separators (`sounds/kung.mp3`).
pub trait AssetSource: Send + Sync {
    fn fetch(&self, path: &str) -> Result<Vec<u8>>;
}

/// Assets read from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for DirAssetSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.root.join(path);
        fs::read(&full).map_err(|source| Error::AssetUnavailable { path: full, source })
    }
}

/// Assets held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(path.into(), bytes);
    }
}

impl AssetSource for MemoryAssetSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::AssetUnavailable {
                path: PathBuf::from(path),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such asset"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_source_reads_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sounds")).unwrap();
        fs::write(dir.path().join("sounds/kung.mp3"), b"abc").unwrap();

        let source = DirAssetSource::new(dir.path());
        assert_eq!(source.fetch("sounds/kung.mp3").unwrap(), b"abc");
    }

    #[test]
    fn missing_file_is_asset_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirAssetSource::new(dir.path());

        let err = source.fetch("sounds/nope.mp3").unwrap_err();
        assert!(matches!(err, Error::AssetUnavailable { .. }));
    }

    #[test]
    fn memory_source_serves_inserted_files() {
        let source = MemoryAssetSource::new().with_file("a.wav", vec![1, 2, 3]);

        assert_eq!(source.fetch("a.wav").unwrap(), vec![1, 2, 3]);
        assert!(source.fetch("b.wav").is_err());
    }
}
