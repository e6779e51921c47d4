use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result, anyhow, bail};
use docx_rs::{DocumentChild, read_docx};
use itertools::Itertools;
use log::info;

/// Document formats the text buffer can be filled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Pdf,
    Word,
}

impl DocumentKind {
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Text => "Text files",
            DocumentKind::Pdf => "PDF files",
            DocumentKind::Word => "Word documents",
        }
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            DocumentKind::Text => &["txt"],
            DocumentKind::Pdf => &["pdf"],
            DocumentKind::Word => &["docx"],
        }
    }

    pub fn load(self, path: &Path) -> Result<String> {
        info!("loading {:?} document {}", self, path.display());
        match self {
            DocumentKind::Text => load_text(path),
            DocumentKind::Pdf => load_pdf(path),
            DocumentKind::Word => load_docx(path),
        }
    }
}

/// Reads a text file, falling back to lossy conversion for non-UTF-8 content.
pub fn load_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

pub fn load_pdf(path: &Path) -> Result<String> {
    let text = pdf_extract::extract_text(path)
        .map_err(|err| anyhow!("failed to extract text from pdf: {err}"))?;
    if text.trim().is_empty() {
        bail!("no text could be extracted from the pdf");
    }
    Ok(text)
}

pub fn load_docx(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let docx = read_docx(&bytes).map_err(|err| anyhow!("failed to parse docx: {err:?}"))?;
    let text = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph.raw_text()),
            _ => None,
        })
        .join("\n");
    if text.trim().is_empty() {
        bail!("no text could be extracted from the document");
    }
    Ok(text)
}

pub fn save_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    info!("saved {} bytes to {}", text.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("readscreen-test-{}-{name}", std::process::id()))
    }

    #[test]
    fn text_round_trip() {
        let path = temp_path("roundtrip.txt");
        save_text(&path, "line one\nline two").unwrap();
        let loaded = load_text(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded, "line one\nline two");
    }

    #[test]
    fn invalid_utf8_is_loaded_lossily() {
        let path = temp_path("latin1.txt");
        fs::write(&path, b"caf\xe9 au lait").unwrap();
        let loaded = load_text(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded, "caf\u{fffd} au lait");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_text(Path::new("/nonexistent/readscreen.txt")).is_err());
        assert!(load_pdf(Path::new("/nonexistent/readscreen.pdf")).is_err());
        assert!(load_docx(Path::new("/nonexistent/readscreen.docx")).is_err());
    }

    #[test]
    fn kind_filters_match_extensions() {
        assert_eq!(DocumentKind::Text.extensions(), &["txt"]);
        assert_eq!(DocumentKind::Pdf.extensions(), &["pdf"]);
        assert_eq!(DocumentKind::Word.extensions(), &["docx"]);
    }
}
