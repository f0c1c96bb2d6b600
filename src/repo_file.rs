//! File view with lazily loaded content.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use crate::language::{classify, Classification};
use crate::vendor::is_vendored;

/// One file within a walk result.
///
/// Content is read on first access and cached for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct RepoFile {
    path: PathBuf,
    relative_path: PathBuf,
    classification: Classification,
    content: OnceCell<String>,
}

impl RepoFile {
    pub fn new(path: impl Into<PathBuf>, relative_path: impl Into<PathBuf>) -> Self {
        let relative_path = relative_path.into();
        Self {
            path: path.into(),
            classification: classify(&relative_path),
            relative_path,
            content: OnceCell::new(),
        }
    }

    /// Absolute path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the walk root.
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn protocol_language(&self) -> Option<&'static str> {
        self.classification.protocol_language
    }

    pub fn language_mode(&self) -> Option<&'static str> {
        self.classification.language_mode
    }

    pub fn is_code(&self) -> bool {
        self.classification.is_code
    }

    pub fn is_vendored(&self) -> bool {
        is_vendored(&self.relative_path)
    }

    /// File content, decoded as UTF-8 (BOM stripped) or UTF-16.
    ///
    /// Unreadable or undecodable files yield an empty string.
    pub fn content(&self) -> &str {
        self.content.get_or_init(|| match std::fs::read(&self.path) {
            Ok(bytes) => decode_text(&bytes).unwrap_or_else(|| {
                tracing::debug!(path = %self.path.display(), "unsupported encoding, using empty content");
                String::new()
            }),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "unreadable file, using empty content");
                String::new()
            }
        })
    }
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decode bytes as UTF-8, then UTF-16 (BOM-detected, little-endian default).
pub(crate) fn decode_text(bytes: &[u8]) -> Option<String> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(body) {
        return Some(text.to_string());
    }
    decode_utf16(bytes)
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (body, big_endian) = match bytes {
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        _ => (bytes, false),
    };
    if body.len() % 2 != 0 {
        return None;
    }

    let units = body.chunks_exact(2).map(|pair| {
        if big_endian {
            u16::from_be_bytes([pair[0], pair[1]])
        } else {
            u16::from_le_bytes([pair[0], pair[1]])
        }
    });
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_classification_from_relative_path() {
        let file = RepoFile::new("/tmp/x/src/app.ts", "src/app.ts");
        assert_eq!(file.protocol_language(), Some("typescript"));
        assert_eq!(file.language_mode(), Some("typescript"));
        assert!(file.is_code());
        assert!(!file.is_vendored());
        assert_eq!(file.relative_path(), Path::new("src/app.ts"));
    }

    #[test]
    fn test_vendored_flag() {
        let file = RepoFile::new("/tmp/x/node_modules/a/b.js", "node_modules/a/b.js");
        assert!(file.is_vendored());
    }

    #[test]
    fn test_content_is_cached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.py");
        fs::write(&path, "first").unwrap();

        let file = RepoFile::new(&path, "a.py");
        assert_eq!(file.content(), "first");

        fs::write(&path, "second").unwrap();
        assert_eq!(file.content(), "first");
    }

    #[test]
    fn test_missing_file_yields_empty_content() {
        let file = RepoFile::new("/nonexistent/a.py", "a.py");
        assert_eq!(file.content(), "");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bom.py");
        fs::write(&path, b"\xEF\xBB\xBFx = 1").unwrap();

        assert_eq!(RepoFile::new(&path, "bom.py").content(), "x = 1");
    }

    #[test]
    fn test_utf16_is_decoded() {
        let le: Vec<u8> = [0xFF, 0xFE]
            .into_iter()
            .chain("hi".encode_utf16().flat_map(|u| u.to_le_bytes()))
            .collect();
        assert_eq!(decode_text(&le).as_deref(), Some("hi"));

        let be: Vec<u8> = [0xFE, 0xFF]
            .into_iter()
            .chain("hi".encode_utf16().flat_map(|u| u.to_be_bytes()))
            .collect();
        assert_eq!(decode_text(&be).as_deref(), Some("hi"));
    }

    #[test]
    fn test_undecodable_bytes() {
        assert_eq!(decode_text(&[0xC3]), None);
    }
}
