// Identifier lines - registration number followed by a name
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::RecognizedPage;

/// A company registration number (`12.345.678/0001-90`) or a personal one
/// (`123.456.789-00`), then whatever follows on the line.
///
/// The personal shape accepts any character in place of its dots. Digits are
/// ASCII only.
const IDENTIFIER_PATTERN: &str =
    r"([0-9]{2}\.[0-9]{3}\.[0-9]{3}/[0-9]{4}-[0-9]{2}|[0-9]{3}.[0-9]{3}.[0-9]{3}-[0-9]{2})\s*(.+)";

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern compiles"));

/// All non-overlapping identifier matches in `text`, in reading order.
pub fn find_identifier_lines(text: &str) -> Vec<&str> {
    IDENTIFIER_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Recover `(company, collaborator)` from one page of OCR text.
///
/// The first identifier line names the company, the second the collaborator;
/// anything after that is ignored. Both fields stay empty unless at least two
/// lines are present, which is what continuation sheets look like.
pub fn parse_page(text: &str) -> RecognizedPage {
    let lines = find_identifier_lines(text);
    if lines.len() < 2 {
        return RecognizedPage::default();
    }

    RecognizedPage::new(field_value(lines[0]), field_value(lines[1]))
}

/// Drop the leading number and keep the rest of the line.
///
/// A line with nothing after the number yields the number itself.
fn field_value(line: &str) -> String {
    match line.split_once(' ') {
        Some((token, rest)) => {
            let rest = rest.trim();
            if rest.is_empty() {
                token.trim().to_string()
            } else {
                rest.to_string()
            }
        }
        None => line.trim().to_string(),
    }
}
