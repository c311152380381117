// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PDF text extraction, page by page.

use std::path::Path;

use tracing::{debug, warn};

use super::loader::LoadError;

/// Extract text from every page of a PDF.
///
/// Pages that fail to extract are logged and skipped; a PDF with no
/// extractable text yields an empty string (the loader turns that into an
/// `EmptyContent` skip). Only a document-level parse failure is an error.
pub fn read_pdf(path: &Path) -> Result<String, LoadError> {
    let doc = lopdf::Document::load(path).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let pages = doc.get_pages();
    debug!("PDF {} has {} pages", path.display(), pages.len());

    let mut text = String::new();
    for &page_number in pages.keys() {
        match doc.extract_text(&[page_number]) {
            Ok(page_text) if !page_text.trim().is_empty() => {
                text.push_str(&format!("Page {}:\n{}\n\n", page_number, page_text));
            }
            Ok(_) => {
                warn!("No text found on page {} of {}", page_number, path.display());
            }
            Err(e) => {
                warn!(
                    "Error extracting text from page {} of {}: {}",
                    page_number,
                    path.display(),
                    e
                );
            }
        }
    }

    Ok(text)
}
