// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Word document extraction: non-empty paragraph texts from the document XML.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use tracing::debug;

use super::loader::LoadError;

pub fn read_docx(path: &Path) -> Result<String, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?
        .read_to_string(&mut xml)
        .map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

    let paragraphs = paragraphs_from_xml(&xml).map_err(|detail| LoadError::Parse {
        path: path.to_path_buf(),
        detail,
    })?;
    debug!(
        "Extracted {} paragraphs from {}",
        paragraphs.len(),
        path.display()
    );

    Ok(format!(
        "Word Document: {}\n\n{}",
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        paragraphs.join("\n")
    ))
}

/// Walk the OOXML body collecting `w:t` text runs, one entry per non-empty
/// `w:p` paragraph.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = XmlReader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text_run = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"t" => in_text_run = false,
            Ok(Event::Text(t)) if in_text_run => {
                current.push_str(&t.unescape().map_err(|e| e.to_string())?);
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"tab" => current.push(' '),
            Ok(Event::End(e)) if e.local_name().as_ref() == b"p" => {
                let paragraph = current.trim();
                if !paragraph.is_empty() {
                    paragraphs.push(paragraph.to_string());
                }
                current.clear();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(e.to_string()),
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>
    <w:p><w:r><w:t></w:t></w:r></w:p>
    <w:p><w:r><w:t>Second </w:t></w:r><w:r><w:t>paragraph.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_paragraphs_from_xml() {
        let paragraphs = paragraphs_from_xml(DOCUMENT_XML).unwrap();
        assert_eq!(paragraphs, vec!["First paragraph.", "Second paragraph."]);
    }

    #[test]
    fn test_read_docx_from_zip() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(DOCUMENT_XML.as_bytes()).unwrap();
        writer.finish().unwrap();

        let content = read_docx(file.path()).unwrap();
        assert!(content.starts_with("Word Document: "));
        assert!(content.contains("First paragraph."));
        assert!(content.contains("Second paragraph."));
    }

    #[test]
    fn test_read_docx_not_a_zip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"plain bytes").unwrap();
        assert!(read_docx(file.path()).is_err());
    }
}
