// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Directory scanner producing normalized text documents.
//!
//! Every file in the corpus directory is resolved to a [`DocumentFormat`] by
//! extension and handed to the matching extractor. Each file yields a typed
//! [`LoadOutcome`] so callers (and tests) can distinguish a loaded document
//! from a skip or a per-file failure; one bad file never aborts the scan.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use super::{pdf, tabular, text, word};

/// A normalized text document extracted from one source file.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub content: String,
    /// Lowercased extension of the source file, e.g. "pdf"
    pub doc_type: String,
    pub path: PathBuf,
}

/// Supported source formats, resolved from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Markdown,
    Tex,
    Pdf,
    Csv,
    Spreadsheet,
    Word,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "txt" => Some(Self::PlainText),
            "md" => Some(Self::Markdown),
            "tex" => Some(Self::Tex),
            "pdf" => Some(Self::Pdf),
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Spreadsheet),
            "docx" | "doc" => Some(Self::Word),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("document directory {0} does not exist")]
    MissingDirectory(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {detail}")]
    Parse { path: PathBuf, detail: String },
}

/// Why a file was excluded from the result without being an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Hidden,
    Directory,
    UnsupportedExtension(String),
    /// The extractor ran but produced no text (e.g. an image-only PDF)
    EmptyContent,
}

/// Per-file result of a directory scan.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Document),
    Skipped { path: PathBuf, reason: SkipReason },
    Failed { path: PathBuf, error: LoadError },
}

/// Scan a directory and extract text from every supported file.
///
/// Returns one [`LoadOutcome`] per entry, ordered by filename. Fails only if
/// the directory itself is missing or unreadable.
pub fn load_directory(dir: &Path) -> Result<Vec<LoadOutcome>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::MissingDirectory(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| LoadError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    paths.sort();

    info!("Scanning directory {} ({} entries)", dir.display(), paths.len());

    let outcomes: Vec<LoadOutcome> = paths.iter().map(|p| load_file(p)).collect();

    let loaded = outcomes
        .iter()
        .filter(|o| matches!(o, LoadOutcome::Loaded(_)))
        .count();
    info!(
        "Processed {} of {} entries from {}",
        loaded,
        outcomes.len(),
        dir.display()
    );
    for outcome in &outcomes {
        if let LoadOutcome::Loaded(doc) = outcome {
            info!(
                "  loaded {} ({}) - {} characters",
                doc.filename,
                doc.doc_type,
                doc.content.len()
            );
        }
    }

    Ok(outcomes)
}

/// Process a single file into a typed outcome.
pub fn load_file(path: &Path) -> LoadOutcome {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if filename.starts_with('.') {
        return LoadOutcome::Skipped {
            path: path.to_path_buf(),
            reason: SkipReason::Hidden,
        };
    }
    if path.is_dir() {
        return LoadOutcome::Skipped {
            path: path.to_path_buf(),
            reason: SkipReason::Directory,
        };
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let format = match DocumentFormat::from_extension(&ext) {
        Some(format) => format,
        None => {
            info!("Skipping unsupported file type: {}", path.display());
            return LoadOutcome::Skipped {
                path: path.to_path_buf(),
                reason: SkipReason::UnsupportedExtension(ext),
            };
        }
    };

    let content = match extract(format, path) {
        Ok(content) => content,
        Err(error) => {
            warn!("Failed to process {}: {}", path.display(), error);
            return LoadOutcome::Failed {
                path: path.to_path_buf(),
                error,
            };
        }
    };

    if content.trim().is_empty() {
        warn!("No content extracted from {}", path.display());
        return LoadOutcome::Skipped {
            path: path.to_path_buf(),
            reason: SkipReason::EmptyContent,
        };
    }

    LoadOutcome::Loaded(Document {
        filename,
        content,
        doc_type: ext,
        path: path.to_path_buf(),
    })
}

fn extract(format: DocumentFormat, path: &Path) -> Result<String, LoadError> {
    match format {
        DocumentFormat::PlainText | DocumentFormat::Markdown | DocumentFormat::Tex => {
            text::read_text(path)
        }
        DocumentFormat::Pdf => pdf::read_pdf(path),
        DocumentFormat::Csv => tabular::read_csv(path),
        DocumentFormat::Spreadsheet => tabular::read_spreadsheet(path),
        DocumentFormat::Word => word::read_docx(path),
    }
}

/// Collect just the loaded documents from a set of outcomes.
pub fn documents(outcomes: Vec<LoadOutcome>) -> Vec<Document> {
    outcomes
        .into_iter()
        .filter_map(|o| match o {
            LoadOutcome::Loaded(doc) => Some(doc),
            _ => None,
        })
        .collect()
}

/// Stand-in document used when the corpus directory has no usable files, so
/// the pipeline can still initialize.
pub fn placeholder_document() -> Document {
    Document {
        filename: "default.txt".to_string(),
        content: "No documents available.".to_string(),
        doc_type: "txt".to_string(),
        path: PathBuf::from("default"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DocumentFormat::from_extension("txt"),
            Some(DocumentFormat::PlainText)
        );
        assert_eq!(
            DocumentFormat::from_extension("xls"),
            Some(DocumentFormat::Spreadsheet)
        );
        assert_eq!(
            DocumentFormat::from_extension("doc"),
            Some(DocumentFormat::Word)
        );
        assert_eq!(DocumentFormat::from_extension("exe"), None);
        assert_eq!(DocumentFormat::from_extension(""), None);
    }

    #[test]
    fn test_placeholder_document() {
        let doc = placeholder_document();
        assert_eq!(doc.filename, "default.txt");
        assert!(!doc.content.is_empty());
    }
}
