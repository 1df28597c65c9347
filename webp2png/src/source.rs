use std::fs;
use std::path::Path;

use crate::config::ConvertConfig;
use crate::error::{ConvertError, Result};

/// A user-selected file, read once into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Read `path`, admitting only the configured extension
    pub fn open(path: &Path, config: &ConvertConfig) -> Result<Self> {
        if !config.accepts(path) {
            return Err(ConvertError::UnsupportedFile(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .ok_or_else(|| ConvertError::UnsupportedFile(path.to_path_buf()))?
            .to_string_lossy()
            .into_owned();
        let data = fs::read(path)?;

        log::debug!("Read {} ({} bytes)", name, data.len());
        Ok(Self { name, data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The full file name with `.png` appended
    pub fn output_name(&self) -> String {
        // don't use Path::with_extension, the original extension stays
        let mut name = self.name.clone();
        name.push_str(".png");
        name
    }
}

#[test]
fn output_name_keeps_original_extension() {
    let source = SourceFile::new("Dr. STONE v01.webp", vec![1, 2, 3]);
    assert_eq!(source.output_name(), "Dr. STONE v01.webp.png");
}

#[test]
fn open_rejects_other_extensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.png");
    fs::write(&path, b"png").unwrap();

    let err = SourceFile::open(&path, &ConvertConfig::default()).unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedFile(p) if p == path));
}

#[test]
fn open_reads_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.webp");
    fs::write(&path, b"RIFF").unwrap();

    let source = SourceFile::open(&path, &ConvertConfig::default()).unwrap();
    assert_eq!(source.name, "photo.webp");
    assert_eq!(source.data, b"RIFF");
}
