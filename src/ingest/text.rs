// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Plain-text reading with a permissive decode fallback.

use std::fs;
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use tracing::warn;
use unicode_normalization::UnicodeNormalization;

use super::loader::LoadError;

/// Read a text-like file as UTF-8, falling back to Windows-1252 with NFKD
/// normalization when the bytes are not valid UTF-8.
pub fn read_text(path: &Path) -> Result<String, LoadError> {
    let bytes = fs::read(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(err) => {
            warn!(
                "UTF-8 decode failed for {}, falling back to Windows-1252",
                path.display()
            );
            let (decoded, _, _) = WINDOWS_1252.decode(err.as_bytes());
            Ok(decoded.nfkd().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("héllo wörld".as_bytes()).unwrap();
        let content = read_text(file.path()).unwrap();
        assert_eq!(content, "héllo wörld");
    }

    #[test]
    fn test_read_latin1_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        // "café" encoded as Latin-1: the 0xE9 byte is invalid UTF-8
        file.write_all(&[0x63, 0x61, 0x66, 0xE9]).unwrap();
        let content = read_text(file.path()).unwrap();
        assert!(content.starts_with("caf"));
        assert_eq!(content.chars().count(), 4);
    }
}
