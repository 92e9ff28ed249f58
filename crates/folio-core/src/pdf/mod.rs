//! PDF text recovery module.

mod extractor;

pub use extractor::PdfFragmentExtractor;

use tracing::{debug, warn};

use crate::error::PdfError;
use crate::layout::{group_pages, lines_from_text};
use crate::models::config::PdfConfig;
use crate::models::fragment::{Line, PageFragments};

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for sources of positioned page text.
pub trait FragmentSource {
    /// Load a document from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages.
    fn page_count(&self) -> u32;

    /// Positioned fragments of one page (1-indexed).
    fn page_fragments(&self, page: u32) -> Result<PageFragments>;

    /// Plain text of the whole document, pages separated by form feeds.
    fn extract_text(&self) -> Result<String>;

    /// Fragments of every page, up to `max_pages` (0 = all).
    fn all_pages(&self, max_pages: usize) -> Result<Vec<PageFragments>> {
        let count = match (self.page_count(), max_pages) {
            (n, 0) => n,
            (n, max) => n.min(max as u32),
        };
        (1..=count).map(|page| self.page_fragments(page)).collect()
    }
}

/// Load a PDF and reconstruct its lines.
///
/// Falls back to plain text extraction when the content streams yield no
/// positioned text and the fallback is enabled.
pub fn extract_lines(data: &[u8], config: &PdfConfig) -> Result<Vec<Line>> {
    let mut extractor = PdfFragmentExtractor::new();
    extractor.load(data)?;

    let pages = extractor.all_pages(config.max_pages)?;
    let lines = group_pages(&pages);
    if !lines.is_empty() {
        debug!("Recovered {} lines from {} pages", lines.len(), pages.len());
        return Ok(lines);
    }

    if !config.text_fallback {
        return Err(PdfError::TextExtraction("no positioned text found".to_string()));
    }

    warn!("No positioned text in content streams, falling back to plain text extraction");
    let text = extractor.extract_text()?;
    Ok(lines_from_text(&text))
}
