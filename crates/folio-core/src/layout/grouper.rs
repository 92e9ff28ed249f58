//! Groups fragments into lines by rounded baseline.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::models::fragment::{Cell, Line, PageFragments, TextFragment};

/// Reconstruct the lines of one page, top to bottom.
///
/// Fragments are bucketed by their `y` rounded to the nearest integer, so two
/// visual rows that round to the same value merge into a single line. Buckets
/// are emitted by descending `y` (PDF origin is bottom-left) and fragments
/// within a bucket by ascending `x`; equal `x` keeps extractor order.
pub fn group_page(page: u32, fragments: &[TextFragment]) -> Vec<Line> {
    let mut buckets: BTreeMap<i32, Vec<&TextFragment>> = BTreeMap::new();

    for fragment in fragments {
        if fragment.text.trim().is_empty() {
            continue;
        }
        if !fragment.x.is_finite() || !fragment.y.is_finite() {
            trace!("Skipping fragment with non-finite position: {:?}", fragment.text);
            continue;
        }
        buckets
            .entry(fragment.y.round() as i32)
            .or_default()
            .push(fragment);
    }

    let lines: Vec<Line> = buckets
        .into_iter()
        .rev()
        .map(|(y, mut row)| {
            row.sort_by(|a, b| a.x.total_cmp(&b.x));
            let cells: Vec<Cell> = row
                .iter()
                .map(|f| Cell {
                    text: f.text.trim().to_string(),
                    x: f.x,
                    width: f.width,
                })
                .collect();
            let text = cells
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();
            Line {
                page,
                y,
                cells,
                text,
            }
        })
        .collect();

    debug!(
        "Page {}: grouped {} fragments into {} lines",
        page,
        fragments.len(),
        lines.len()
    );
    lines
}

/// Reconstruct lines for a whole document, pages in page-number order.
pub fn group_pages(pages: &[PageFragments]) -> Vec<Line> {
    let mut ordered: Vec<&PageFragments> = pages.iter().collect();
    ordered.sort_by_key(|p| p.page);

    ordered
        .into_iter()
        .flat_map(|p| group_page(p.page, &p.fragments))
        .collect()
}

/// Build lines from plain extracted text.
///
/// Pages are separated by form feeds, as produced by `pdf-extract`.
pub fn lines_from_text(text: &str) -> Vec<Line> {
    text.split('\u{000C}')
        .enumerate()
        .flat_map(|(index, page)| {
            Line::from_lines(page.lines())
                .into_iter()
                .map(move |line| line.on_page(index as u32 + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_orders_rows_top_down_and_cells_left_right() {
        let fragments = vec![
            TextFragment::new("b", 5.0, 10.0),
            TextFragment::new("a", 1.0, 10.0),
            TextFragment::new("top", 0.0, 30.0),
        ];
        let lines = group_page(1, &fragments);
        assert_eq!(texts(&lines), vec!["top", "a b"]);
        assert_eq!(lines[0].y, 30);
        assert_eq!(lines[1].cells[0].x, 1.0);
    }

    #[test]
    fn test_rounding_merges_jittered_rows() {
        let fragments = vec![
            TextFragment::new("left", 10.0, 100.2),
            TextFragment::new("right", 200.0, 99.7),
        ];
        let lines = group_page(1, &fragments);
        assert_eq!(texts(&lines), vec!["left right"]);
    }

    #[test]
    fn test_blank_fragments_dropped() {
        let fragments = vec![
            TextFragment::new("   ", 10.0, 50.0),
            TextFragment::new("", 20.0, 40.0),
            TextFragment::new(" kept ", 30.0, 40.0),
        ];
        let lines = group_page(1, &fragments);
        assert_eq!(texts(&lines), vec!["kept"]);
    }

    #[test]
    fn test_pages_in_page_order() {
        let pages = vec![
            PageFragments::new(2, vec![TextFragment::new("second", 0.0, 10.0)]),
            PageFragments::new(1, vec![TextFragment::new("first", 0.0, 10.0)]),
        ];
        let lines = group_pages(&pages);
        assert_eq!(texts(&lines), vec!["first", "second"]);
        assert_eq!(lines[1].page, 2);
    }

    #[test]
    fn test_lines_from_text_splits_pages() {
        let lines = lines_from_text("one\n\ntwo\u{000C}three\n");
        assert_eq!(texts(&lines), vec!["one", "two", "three"]);
        assert_eq!(lines[2].page, 2);
    }
}
