//! Positioned text fragments and the lines reconstructed from them.

use serde::{Deserialize, Serialize};

/// A positioned run of text as produced by a page-text extractor.
///
/// Coordinates follow PDF user space: origin at the bottom-left corner, so
/// visually higher rows have larger `y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Text content.
    pub text: String,
    /// Horizontal coordinate of the left edge.
    pub x: f32,
    /// Vertical coordinate of the baseline.
    pub y: f32,
    /// Advance width, when the extractor knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
}

impl TextFragment {
    /// Create a fragment without width information.
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width: None,
        }
    }

    /// Set the advance width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }
}

/// All fragments recovered from one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageFragments {
    /// Page number (1-indexed).
    pub page: u32,
    /// Fragments in extractor order (not reading order).
    pub fragments: Vec<TextFragment>,
}

impl PageFragments {
    pub fn new(page: u32, fragments: Vec<TextFragment>) -> Self {
        Self { page, fragments }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// One fragment inside a reconstructed line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    pub x: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
}

impl Cell {
    /// Right edge when the width is known, left edge otherwise.
    pub fn right(&self) -> f32 {
        self.x + self.width.unwrap_or(0.0)
    }
}

/// A logical row: fragments sharing a rounded `y`, ordered left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Page the line came from (1-indexed, 0 for synthetic lines).
    pub page: u32,
    /// Rounded vertical coordinate used as the grouping key.
    pub y: i32,
    /// Fragments in ascending `x` order.
    pub cells: Vec<Cell>,
    /// Cell texts joined with single spaces.
    pub text: String,
}

impl Line {
    /// Build a synthetic single-cell line from plain text.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into().trim().to_string();
        Self {
            page: 0,
            y: 0,
            cells: vec![Cell {
                text: text.clone(),
                x: 0.0,
                width: None,
            }],
            text,
        }
    }

    /// Tag the line with a page number.
    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Build synthetic lines from newline-separated text, skipping blank lines.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<Self> {
        lines
            .into_iter()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(Self::from_text)
            .collect()
    }

    /// Lower-cased line text.
    pub fn lower(&self) -> String {
        self.text.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_from_text_trims() {
        let line = Line::from_text("  12 Jan  ");
        assert_eq!(line.text, "12 Jan");
        assert_eq!(line.cells.len(), 1);
        assert_eq!(line.page, 0);
    }

    #[test]
    fn test_from_lines_skips_blank() {
        let lines = Line::from_lines("a\n\n  \nb".lines());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text, "b");
    }
}
