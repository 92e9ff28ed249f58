//! Positioned text extraction using lopdf, with pdf-extract for plain text.

use lopdf::content::Content;
use lopdf::{Document, Object};
use tracing::{debug, trace};

use super::{FragmentSource, Result};
use crate::error::PdfError;
use crate::models::fragment::{PageFragments, TextFragment};

/// Glyph advance as a fraction of the font size, for width estimates.
const GLYPH_WIDTH: f32 = 0.5;

/// TJ adjustments below this (thousandths of an em) are read as a space.
const TJ_SPACE_THRESHOLD: f32 = -200.0;

type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn multiply(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn translate(tx: f32, ty: f32) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn numbers(operands: &[Object]) -> Vec<f32> {
    operands.iter().filter_map(number).collect()
}

/// Decode a PDF string: UTF-16BE with a byte-order mark, Latin-1 otherwise.
fn decode_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}

/// Text state carried across operators of one content stream.
#[derive(Debug, Clone)]
struct TextState {
    ctm: Matrix,
    tm: Matrix,
    tlm: Matrix,
    font_size: f32,
    leading: f32,
    char_spacing: f32,
    word_spacing: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            tm: IDENTITY,
            tlm: IDENTITY,
            font_size: 12.0,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = multiply(&translate(tx, ty), &self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        let leading = self.leading;
        self.move_line(0.0, -leading);
    }

    /// Horizontal advance of a run in text space.
    fn advance(&self, text: &str) -> f32 {
        let chars = text.chars().count() as f32;
        let spaces = text.chars().filter(|c| *c == ' ').count() as f32;
        chars * (self.font_size * GLYPH_WIDTH + self.char_spacing) + spaces * self.word_spacing
    }

    /// Emit a fragment at the current position and advance past it.
    fn show(&mut self, text: &str, out: &mut Vec<TextFragment>) {
        let advance = self.advance(text);
        let device = multiply(&self.tm, &self.ctm);
        if !text.trim().is_empty() {
            out.push(TextFragment::new(text, device[4], device[5]).with_width(advance * device[0].abs()));
        }
        self.tm = multiply(&translate(advance, 0.0), &self.tm);
    }

    /// Move by a TJ adjustment, in thousandths of an em. Negative moves right.
    fn shift(&mut self, adjustment: f32) {
        let tx = -adjustment / 1000.0 * self.font_size;
        self.tm = multiply(&translate(tx, 0.0), &self.tm);
    }
}

/// PDF fragment extractor using lopdf.
pub struct PdfFragmentExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfFragmentExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))
    }

    /// Walk a decoded content stream and collect its text runs.
    fn fragments_from_content(content: &Content) -> Vec<TextFragment> {
        let mut state = TextState::default();
        let mut saved: Vec<Matrix> = Vec::new();
        let mut out = Vec::new();

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => saved.push(state.ctm),
                "Q" => {
                    if let Some(ctm) = saved.pop() {
                        state.ctm = ctm;
                    }
                }
                "cm" => {
                    let m = numbers(operands);
                    if let [a, b, c, d, e, f] = m[..] {
                        state.ctm = multiply(&[a, b, c, d, e, f], &state.ctm);
                    }
                }
                "BT" => {
                    state.tm = IDENTITY;
                    state.tlm = IDENTITY;
                }
                "Tf" => {
                    if let Some(size) = operands.get(1).and_then(number) {
                        state.font_size = size;
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(number) {
                        state.leading = leading;
                    }
                }
                "Tc" => {
                    if let Some(spacing) = operands.first().and_then(number) {
                        state.char_spacing = spacing;
                    }
                }
                "Tw" => {
                    if let Some(spacing) = operands.first().and_then(number) {
                        state.word_spacing = spacing;
                    }
                }
                "Td" => {
                    if let [tx, ty] = numbers(operands)[..] {
                        state.move_line(tx, ty);
                    }
                }
                "TD" => {
                    if let [tx, ty] = numbers(operands)[..] {
                        state.leading = -ty;
                        state.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    let m = numbers(operands);
                    if let [a, b, c, d, e, f] = m[..] {
                        state.tlm = [a, b, c, d, e, f];
                        state.tm = state.tlm;
                    }
                }
                "T*" => state.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        state.show(&decode_string(bytes), &mut out);
                    }
                }
                "'" => {
                    state.next_line();
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        state.show(&decode_string(bytes), &mut out);
                    }
                }
                "\"" => {
                    if let (Some(aw), Some(ac)) = (
                        operands.first().and_then(number),
                        operands.get(1).and_then(number),
                    ) {
                        state.word_spacing = aw;
                        state.char_spacing = ac;
                    }
                    state.next_line();
                    if let Some(Object::String(bytes, _)) = operands.get(2) {
                        state.show(&decode_string(bytes), &mut out);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        let mut run = String::new();
                        let mut kerning = 0.0;
                        for item in items {
                            match item {
                                Object::String(bytes, _) => run.push_str(&decode_string(bytes)),
                                other => {
                                    if let Some(adjustment) = number(other) {
                                        kerning += adjustment;
                                        if adjustment < TJ_SPACE_THRESHOLD && !run.ends_with(' ') {
                                            // The inserted space already advanced by one glyph.
                                            run.push(' ');
                                            kerning += GLYPH_WIDTH * 1000.0;
                                        }
                                    }
                                }
                            }
                        }
                        state.show(&run, &mut out);
                        state.shift(kerning);
                    }
                }
                "ET" => {}
                other => trace!("Ignoring operator {}", other),
            }
        }

        out
    }
}

impl Default for PdfFragmentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentSource for PdfFragmentExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // Keep the decrypted bytes for pdf_extract
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn page_fragments(&self, page: u32) -> Result<PageFragments> {
        let doc = self.document()?;
        let pages = doc.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let bytes = doc
            .get_page_content(*page_id)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        let content =
            Content::decode(&bytes).map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        let fragments = Self::fragments_from_content(&content);
        debug!("Page {}: {} text fragments", page, fragments.len());
        Ok(PageFragments::new(page, fragments))
    }

    fn extract_text(&self) -> Result<String> {
        let text = pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        Ok(text)
    }
}
