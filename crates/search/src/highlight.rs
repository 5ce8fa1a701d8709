//! Highlight markup for search hits
//!
//! For each weighted field that contains one of the matched terms, a preview
//! window of up to 50 characters on either side of the first match is cut,
//! the match is wrapped in `<mark>…</mark>`, and `...` marks truncation.

use helpsearch_core::{Document, Field, Highlight};

/// Characters of context kept on each side of a match
pub const CONTEXT_CHARS: usize = 50;

const MARK_OPEN: &str = "<mark>";
const MARK_CLOSE: &str = "</mark>";

/// Case-insensitive search that maps the match back to char positions in
/// the original text. Returns `(start_char, end_char)`.
fn find_char_span(text: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    let mut lower = String::with_capacity(text.len());
    // byte offset in `lower` where each original char begins
    let mut starts = Vec::with_capacity(text.len());
    for c in text.chars() {
        starts.push(lower.len());
        lower.extend(c.to_lowercase());
    }

    let begin = lower.find(needle)?;
    let end = begin + needle.len();
    let start_char = starts.iter().rposition(|&s| s <= begin).unwrap_or(0);
    let end_char = starts
        .iter()
        .position(|&s| s >= end)
        .unwrap_or(starts.len());
    Some((start_char, end_char))
}

/// Build a marked-up preview of `text` around the first match of `term`
///
/// `term` must already be lower-cased. Returns `None` when it does not occur.
pub fn snippet(text: &str, term: &str) -> Option<String> {
    let (start, end) = find_char_span(text, term)?;
    let chars: Vec<char> = text.chars().collect();
    let from = start.saturating_sub(CONTEXT_CHARS);
    let to = (end + CONTEXT_CHARS).min(chars.len());

    let mut out = String::new();
    if from > 0 {
        out.push_str("...");
    }
    out.extend(&chars[from..start]);
    out.push_str(MARK_OPEN);
    out.extend(&chars[start..end]);
    out.push_str(MARK_CLOSE);
    out.extend(&chars[end..to]);
    if to < chars.len() {
        out.push_str("...");
    }
    Some(out)
}

/// One highlight per field that contains any of `terms`
///
/// Terms are tried in the order given, so callers pass the original query
/// tokens before expansion terms.
pub fn highlight_document<'a, I>(doc: &Document, terms: I) -> Vec<Highlight>
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let terms = terms.into_iter();
    let mut out = Vec::new();
    for field in Field::ALL {
        let Some(text) = doc.field_text(field) else {
            continue;
        };
        for term in terms.clone() {
            if let Some(snippet) = snippet(&text, term) {
                out.push(Highlight {
                    field,
                    term: term.to_string(),
                    snippet,
                });
                break;
            }
        }
    }
    out
}
