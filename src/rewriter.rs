//! Link rewriting.
//!
//! Replacements are computed from the spans the scanner records and applied in
//! reverse offset order, so one replacement never shifts another and nothing
//! outside a link's path text is touched.

use crate::resolver::{link_path, split_fragment};
use crate::scanner::{self, LinkKind, LinkOccurrence};
use serde::Serialize;
use std::collections::HashMap;

/// One link spelling to rewrite across a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteMapping {
    /// Link path as written in the document, without alias or `#fragment`.
    /// Matched byte for byte, not canonicalized.
    pub old_path: String,
    pub new_path: String,
    /// Grammar of the first link to the renamed file. Reported only; links of
    /// both grammars are rewritten.
    pub kind: LinkKind,
}

/// A single text replacement with position information.
#[derive(Debug, Clone)]
struct Replacement {
    start: usize,
    end: usize,
    new_text: String,
}

/// Builds the link syntax for `occurrence` pointing at `new_path`.
///
/// Wiki embeds are rebuilt with their alias; inline embeds keep their full
/// text with only the path swapped, so alt text stays byte-identical. A
/// `#heading` or `#^block` suffix is kept in both grammars.
pub fn link_text(occurrence: &LinkOccurrence, new_path: &str) -> String {
    match occurrence.kind {
        LinkKind::Wiki => {
            let (_, fragment) = split_fragment(&occurrence.raw_link);
            match &occurrence.alias {
                Some(alias) => format!("![[{}{}|{}]]", new_path, fragment, alias),
                None => format!("![[{}{}]]", new_path, fragment),
            }
        }
        LinkKind::Inline => {
            let mut text = occurrence.full_text.clone();
            let start = occurrence.path_start - occurrence.start;
            let end = file_path_end(occurrence) - occurrence.start;
            text.replace_range(start..end, new_path);
            text
        }
    }
}

/// End of the file path within the raw link, before any `#fragment`.
fn file_path_end(occurrence: &LinkOccurrence) -> usize {
    occurrence.path_start + split_fragment(&occurrence.raw_link).0.len()
}

/// Replaces exactly the span of `occurrence` within `line`.
pub fn rewrite_span(line: &str, occurrence: &LinkOccurrence, new_path: &str) -> String {
    apply_replacements(
        line,
        vec![Replacement {
            start: occurrence.start,
            end: occurrence.end,
            new_text: link_text(occurrence, new_path),
        }],
    )
}

/// Rewrites every embed in `content` whose path matches a mapping.
///
/// All mappings are matched against the original text in one pass, so a new
/// path is never re-matched by another mapping and paths that contain each
/// other cannot interfere. Only the file path of each link is replaced; alias,
/// alt text and `#fragment` suffixes are kept.
pub fn rewrite_document(content: &str, mappings: &[RewriteMapping]) -> String {
    let by_path: HashMap<&str, &RewriteMapping> = mappings
        .iter()
        .map(|mapping| (mapping.old_path.as_str(), mapping))
        .collect();
    if by_path.is_empty() {
        return content.to_string();
    }

    let replacements = scanner::scan(content)
        .into_iter()
        .filter_map(|occurrence| {
            let mapping = by_path.get(link_path(&occurrence.raw_link))?;
            Some(Replacement {
                start: occurrence.path_start,
                end: file_path_end(&occurrence),
                new_text: mapping.new_path.clone(),
            })
        })
        .collect();

    apply_replacements(content, replacements)
}

fn apply_replacements(content: &str, mut replacements: Vec<Replacement>) -> String {
    // Sort by start offset descending so we can apply from end to start
    replacements.sort_by(|a, b| b.start.cmp(&a.start));

    let mut result = content.to_string();
    for rep in replacements {
        if rep.start <= rep.end && rep.end <= result.len() {
            result.replace_range(rep.start..rep.end, &rep.new_text);
        }
    }

    result
}
