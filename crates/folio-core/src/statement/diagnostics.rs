//! Classification dump for troubleshooting new statement layouts.

use std::fmt::Write;

use serde::Serialize;

use super::classifier::{Marker, TokenClass, TokenClassifier};
use super::tokens::tokenize_line;
use crate::models::fragment::Line;

/// One token with every class it satisfies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenAnnotation {
    pub text: String,
    pub classes: Vec<TokenClass>,
    pub primary: TokenClass,
}

/// One line of the document as the parser sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineDiagnostic {
    pub index: usize,
    pub page: u32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    /// Line-level noise class, when the whole line is skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise: Option<TokenClass>,
    pub tokens: Vec<TokenAnnotation>,
}

/// Annotate every line with its marker, noise class and token classes.
pub fn annotate(lines: &[Line], classifier: &TokenClassifier) -> Vec<LineDiagnostic> {
    let mut previous: Option<String> = None;

    lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let noise = if classifier.is_header_noise(&line.text) {
                Some(TokenClass::HeaderNoise)
            } else if classifier.is_footer_noise(&line.text) {
                Some(TokenClass::FooterNoise)
            } else {
                None
            };

            let tokens = tokenize_line(line, index)
                .into_iter()
                .map(|token| {
                    let classes = classifier.classify(&token.text, previous.as_deref());
                    let primary = classes
                        .iter()
                        .next()
                        .copied()
                        .unwrap_or(TokenClass::Unclassified);
                    previous = Some(token.text.clone());
                    TokenAnnotation {
                        text: token.text,
                        classes: classes.into_iter().collect(),
                        primary,
                    }
                })
                .collect();

            LineDiagnostic {
                index,
                page: line.page,
                text: line.text.clone(),
                marker: classifier.marker(&line.text),
                noise,
                tokens,
            }
        })
        .collect()
}

/// Human-readable rendering, one line per source line.
pub fn render(diagnostics: &[LineDiagnostic]) -> String {
    let mut out = String::new();
    for d in diagnostics {
        let _ = write!(out, "{:>4} p{:<3}", d.index, d.page);
        if let Some(marker) = d.marker {
            let _ = write!(out, " [{:?}]", marker);
        }
        if let Some(noise) = d.noise {
            let _ = writeln!(out, " ({}) {}", noise, d.text);
            continue;
        }
        let tokens: Vec<String> = d
            .tokens
            .iter()
            .map(|t| format!("{}<{}>", t.text, t.primary))
            .collect();
        let _ = writeln!(out, " {}", tokens.join(" | "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_marks_markers_and_noise() {
        let lines = Line::from_lines([
            "Details of your account activity",
            "Date Description Withdrawals ($) Deposits ($) Balance ($)",
            "12 Jan e-Transfer sent 50.00",
        ]);
        let diagnostics = annotate(&lines, &TokenClassifier::default());
        assert_eq!(diagnostics[0].marker, Some(Marker::Activity));
        assert_eq!(diagnostics[1].noise, Some(TokenClass::HeaderNoise));
        let primaries: Vec<_> = diagnostics[2].tokens.iter().map(|t| t.primary).collect();
        assert_eq!(
            primaries,
            vec![TokenClass::Date, TokenClass::TransactionOpener, TokenClass::Amount]
        );
    }

    #[test]
    fn test_render() {
        let lines = Line::from_lines(["12 Jan e-Transfer sent 50.00"]);
        let text = render(&annotate(&lines, &TokenClassifier::default()));
        assert!(text.contains("12 Jan<date>"));
        assert!(text.contains("e-Transfer sent<opener>"));
        assert!(text.contains("50.00<amount>"));
    }
}
