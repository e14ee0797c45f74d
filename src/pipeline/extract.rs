//! PDF text extraction via pdfium.
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and must not run on a Tokio worker thread. All work happens inside
//! `tokio::task::spawn_blocking`.
//!
//! Output layout: pages in document order, the text segments of one page
//! joined by a single space, every page terminated by `\n`. Blank segments
//! are dropped and runs of spaces or tabs collapse to one space.

use crate::error::ExtractionError;
use crate::pipeline::analyze::MIN_SERMON_CHARS;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Text pulled out of a sermon PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
}

impl ExtractedText {
    /// Characters of text after trimming.
    pub fn trimmed_chars(&self) -> usize {
        self.text.trim().chars().count()
    }

    /// Reject extractions with fewer than [`MIN_SERMON_CHARS`] trimmed
    /// characters. Returns the trimmed character count otherwise.
    pub fn ensure_text(&self) -> Result<usize, ExtractionError> {
        let chars = self.trimmed_chars();
        if chars < MIN_SERMON_CHARS {
            return Err(ExtractionError::NoText { chars });
        }
        Ok(chars)
    }
}

static RUNS_OF_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));

/// Join per-page text items into the extracted document text.
pub fn join_pages<S: AsRef<str>>(pages: &[Vec<S>]) -> String {
    let mut out = String::new();
    for items in pages {
        let line = items
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&RUNS_OF_SPACES.replace_all(&line, " "));
        out.push('\n');
    }
    out
}

/// Extract all page text from a PDF.
pub async fn extract_text(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<ExtractedText, ExtractionError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || extract_text_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| ExtractionError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Bind to pdfium: `PDFIUM_LIB_PATH` (file or directory), then the working
/// directory, then the system library.
fn bind_pdfium() -> Result<Pdfium, ExtractionError> {
    let from_env = std::env::var("PDFIUM_LIB_PATH")
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .map(|p| {
            if p.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&p)
            } else {
                p
            }
        });

    let bindings = match from_env {
        Some(lib) => Pdfium::bind_to_library(&lib),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| ExtractionError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

fn extract_text_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<ExtractedText, ExtractionError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                ExtractionError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                ExtractionError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            ExtractionError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let pages = document.pages();
    let page_count = pages.len() as usize;
    info!("PDF loaded: {} pages", page_count);

    let mut page_items: Vec<Vec<String>> = Vec::with_capacity(page_count);
    for (idx, page) in pages.iter().enumerate() {
        let text = page.text().map_err(|e| ExtractionError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("page {}: {:?}", idx + 1, e),
        })?;

        let items: Vec<String> = text
            .segments()
            .iter()
            .map(|segment| segment.text())
            .filter(|s| !s.trim().is_empty())
            .collect();
        debug!("Page {}: {} text segments", idx + 1, items.len());
        page_items.push(items);
    }

    let text = join_pages(&page_items);
    debug!("Extracted {} chars", text.len());

    Ok(ExtractedText { text, page_count })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_joined_by_newline_items_by_space() {
        let pages = vec![
            vec!["The Lord", "is my shepherd;"],
            vec!["I shall not want."],
        ];
        assert_eq!(join_pages(&pages), "The Lord is my shepherd;\nI shall not want.\n");
    }

    #[test]
    fn empty_pages_still_emit_newline() {
        let pages: Vec<Vec<&str>> = vec![vec![], vec!["Amen"]];
        assert_eq!(join_pages(&pages), "\nAmen\n");
    }

    #[test]
    fn space_runs_collapse_to_one() {
        let pages = vec![vec!["grace   upon", "\tgrace"]];
        assert_eq!(join_pages(&pages), "grace upon grace\n");
    }

    fn extracted(text: &str) -> ExtractedText {
        ExtractedText {
            text: text.into(),
            page_count: 1,
        }
    }

    #[test]
    fn trimmed_chars_counts_scalars() {
        assert_eq!(extracted("  은혜와 평강  \n").trimmed_chars(), 6);
    }

    #[test]
    fn ensure_text_threshold() {
        assert!(matches!(
            extracted(" 123456789 \n").ensure_text(),
            Err(ExtractionError::NoText { chars: 9 })
        ));
        assert_eq!(extracted(" 1234567890 \n").ensure_text().unwrap(), 10);
        assert!(matches!(
            extracted("  \n\t\n \n").ensure_text(),
            Err(ExtractionError::NoText { chars: 0 })
        ));
        assert_eq!(extracted("하나님은사랑이십니다\n").ensure_text().unwrap(), 10);
    }
}
