//! Value Objects for the catalog

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// Raw image payload as received from the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into().trim_matches('"').to_string(), bytes }
    }
    pub fn file_name(&self) -> &str { &self.file_name }
    pub fn bytes(&self) -> &[u8] { &self.bytes }
    pub fn len(&self) -> i64 { self.bytes.len() as i64 }
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Extension of the original file name including the leading dot, or empty.
    pub fn extension(&self) -> String {
        Path::new(&self.file_name).extension().and_then(|e| e.to_str()).map(|e| format!(".{e}")).unwrap_or_default()
    }
}

/// Key under which image bytes are stored: a random id plus the original extension.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn generate(upload: &ImageUpload) -> Self { Self(format!("{}{}", Uuid::new_v4(), upload.extension())) }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn into_string(self) -> String { self.0 }
}

/// 1-based page window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page { index: u32, size: u32 }

impl Page {
    pub fn new(index: u32, size: u32) -> Result<Self, PageError> {
        if index == 0 { return Err(PageError::ZeroIndex); }
        if size == 0 { return Err(PageError::ZeroSize); }
        Ok(Self { index, size })
    }
    pub fn size(&self) -> u32 { self.size }
    pub fn offset(&self) -> u64 { u64::from(self.index - 1) * u64::from(self.size) }
}

#[derive(Debug, Clone)] pub enum PageError { ZeroIndex, ZeroSize }
impl std::error::Error for PageError {}
impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::ZeroIndex => write!(f, "page index starts at 1"), Self::ZeroSize => write!(f, "page size must be positive") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_keeps_extension() {
        let upload = ImageUpload::new("\"cover.photo.JPG\"", vec![1, 2, 3]);
        assert_eq!(upload.file_name(), "cover.photo.JPG");
        let key = StorageKey::generate(&upload);
        assert!(key.as_str().ends_with(".JPG"));
        assert_eq!(key.as_str().len(), 36 + 4);
        assert_ne!(key, StorageKey::generate(&upload));
    }

    #[test]
    fn test_storage_key_without_extension() {
        let key = StorageKey::generate(&ImageUpload::new("blob", vec![]));
        assert_eq!(key.as_str().len(), 36);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(Page::new(3, 2).unwrap().offset(), 4);
        assert_eq!(Page::new(1, 20).unwrap().offset(), 0);
        assert!(Page::new(0, 2).is_err());
        assert!(Page::new(1, 0).is_err());
    }
}
