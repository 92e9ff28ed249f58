//! Splits activity lines into classifiable tokens.

use serde::Serialize;

use super::rules::amounts::has_cents_shape;
use super::rules::{split_date_prefix, split_trailing_amounts};
use crate::models::fragment::Line;

/// A piece of a line, small enough to carry a single meaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub text: String,
    /// Index of the source line within the tokenized slice.
    pub line: usize,
    /// Left edge, for tokens that came from their own positioned cell.
    pub x: Option<f32>,
    /// Right edge, when the cell width is known.
    pub right: Option<f32>,
}

impl Token {
    fn text(text: &str, line: usize) -> Self {
        Self {
            text: text.to_string(),
            line,
            x: None,
            right: None,
        }
    }
}

/// Tokenize one line.
///
/// Cells that are a bare amount keep their position. Runs of other cells are
/// joined and split into a leading date, the remaining text, and any trailing
/// amounts.
pub fn tokenize_line(line: &Line, index: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for cell in &line.cells {
        if has_cents_shape(&cell.text) {
            flush_run(&mut run, index, &mut tokens);
            tokens.push(Token {
                text: cell.text.clone(),
                line: index,
                x: Some(cell.x),
                right: cell.width.map(|_| cell.right()),
            });
        } else {
            run.push(&cell.text);
        }
    }
    flush_run(&mut run, index, &mut tokens);

    tokens
}

/// Tokenize a sequence of lines, numbering them by position.
pub fn tokenize(lines: &[&Line]) -> Vec<Token> {
    lines
        .iter()
        .enumerate()
        .flat_map(|(i, line)| tokenize_line(line, i))
        .collect()
}

fn flush_run(run: &mut Vec<&str>, index: usize, tokens: &mut Vec<Token>) {
    if run.is_empty() {
        return;
    }
    let joined = run.join(" ");
    run.clear();

    let mut text = joined.trim();
    if let Some((date, rest)) = split_date_prefix(text) {
        tokens.push(Token::text(&date.label(), index));
        text = rest.trim();
    }
    if text.is_empty() {
        return;
    }

    let (head, amounts) = split_trailing_amounts(text);
    if !head.is_empty() {
        tokens.push(Token::text(head, index));
    }
    tokens.extend(amounts.into_iter().map(|a| Token::text(a, index)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fragment::Cell;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_plain_line() {
        let line = Line::from_text("12 Jan e-Transfer sent ABC123 50.00 900.00");
        let tokens = tokenize_line(&line, 0);
        assert_eq!(
            texts(&tokens),
            vec!["12 Jan", "e-Transfer sent ABC123", "50.00", "900.00"]
        );
        assert!(tokens.iter().all(|t| t.x.is_none()));
    }

    #[test]
    fn test_date_only_line_is_normalised() {
        let tokens = tokenize_line(&Line::from_text("03jan"), 4);
        assert_eq!(texts(&tokens), vec!["3 Jan"]);
        assert_eq!(tokens[0].line, 4);
    }

    #[test]
    fn test_positioned_cells_keep_x() {
        let line = Line {
            page: 1,
            y: 500,
            cells: vec![
                Cell { text: "12 Jan".into(), x: 40.0, width: None },
                Cell { text: "Payroll".into(), x: 90.0, width: None },
                Cell { text: "deposit".into(), x: 120.0, width: None },
                Cell { text: "1,500.00".into(), x: 400.0, width: Some(40.0) },
            ],
            text: "12 Jan Payroll deposit 1,500.00".into(),
        };
        let tokens = tokenize_line(&line, 0);
        assert_eq!(texts(&tokens), vec!["12 Jan", "Payroll deposit", "1,500.00"]);
        assert_eq!(tokens[2].x, Some(400.0));
        assert_eq!(tokens[2].right, Some(440.0));
    }

    #[test]
    fn test_store_numbers_stay_in_text() {
        let tokens = tokenize_line(&Line::from_text("Contactless Interac purchase - 1234"), 0);
        assert_eq!(texts(&tokens), vec!["Contactless Interac purchase - 1234"]);
    }
}
