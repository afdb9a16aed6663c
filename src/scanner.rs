//! Embedded image link scanner.
//!
//! Recognizes the two embed grammars used in vault notes:
//!
//! * wiki embeds, `![[path|alias]]`
//! * inline embeds, `![alt](path)`
//!
//! The scanner is a small hand-written parser rather than a set of regexes, so
//! every [`LinkOccurrence`] carries exact byte spans for both the whole link
//! and the path inside it. Also collects the markdown documents of a vault for
//! the `scan` subcommand.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Which embed grammar an occurrence was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Wiki,
    Inline,
}

/// One embedded link found in a text buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkOccurrence {
    pub kind: LinkKind,
    /// Path text as written: up to `|` for wiki embeds, the parenthesized text
    /// for inline embeds.
    pub raw_link: String,
    /// Wiki alias after `|`, or inline alt text.
    pub alias: Option<String>,
    /// Byte offset of the leading `!`.
    pub start: usize,
    /// Byte offset just past the closing `]]` or `)`.
    pub end: usize,
    /// Byte range of `raw_link` within the buffer.
    pub path_start: usize,
    pub path_end: usize,
    pub full_text: String,
}

impl LinkOccurrence {
    /// Whether `cursor` touches this link, both ends inclusive.
    pub fn contains(&self, cursor: usize) -> bool {
        self.start <= cursor && cursor <= self.end
    }
}

/// Returns every embed in `text`, in document order.
///
/// At each `!` the wiki grammar is tried before the inline one. A parsed link
/// is consumed whole, so occurrences never overlap.
pub fn scan(text: &str) -> Vec<LinkOccurrence> {
    let mut occurrences = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('!') {
        let start = pos + offset;
        match parse_wiki(text, start).or_else(|| parse_inline(text, start)) {
            Some(occurrence) => {
                pos = occurrence.end;
                occurrences.push(occurrence);
            }
            None => pos = start + 1,
        }
    }

    occurrences
}

/// Finds the embed under `cursor` (a byte offset into `line`).
///
/// When several spans contain the cursor the smallest wins, then the earliest.
pub fn occurrence_at(line: &str, cursor: usize) -> Option<LinkOccurrence> {
    scan(line)
        .into_iter()
        .filter(|occurrence| occurrence.contains(cursor))
        .min_by_key(|occurrence| (occurrence.end - occurrence.start, occurrence.start))
}

fn parse_wiki(text: &str, start: usize) -> Option<LinkOccurrence> {
    let body = text[start..].strip_prefix("![[")?;
    let body_start = start + 3;

    let close = body.find("]]")?;
    let inner = &body[..close];
    if inner.contains('\n') {
        return None;
    }

    let (path, alias) = match inner.find('|') {
        Some(idx) => (&inner[..idx], Some(inner[idx + 1..].to_string())),
        None => (inner, None),
    };
    let end = body_start + close + 2;

    Some(LinkOccurrence {
        kind: LinkKind::Wiki,
        raw_link: path.to_string(),
        alias,
        start,
        end,
        path_start: body_start,
        path_end: body_start + path.len(),
        full_text: text[start..end].to_string(),
    })
}

fn parse_inline(text: &str, start: usize) -> Option<LinkOccurrence> {
    let body = text[start..].strip_prefix("![")?;
    let alt_start = start + 2;

    let alt_len = body.find([']', '\n'])?;
    if !body[alt_len..].starts_with(']') {
        return None;
    }

    let target = body[alt_len + 1..].strip_prefix('(')?;
    let path_start = alt_start + alt_len + 2;

    let path_len = target.find([')', '\n'])?;
    if !target[path_len..].starts_with(')') {
        return None;
    }
    let end = path_start + path_len + 1;

    Some(LinkOccurrence {
        kind: LinkKind::Inline,
        raw_link: target[..path_len].to_string(),
        alias: Some(body[..alt_len].to_string()),
        start,
        end,
        path_start,
        path_end: path_start + path_len,
        full_text: text[start..end].to_string(),
    })
}

/// Collects all `.md` files under `paths`.
///
/// Entries whose names start with `.` or `_` are skipped when
/// `default_excludes` is set. `excludes` holds glob patterns matched against
/// both the entry name and its full path.
pub fn collect_markdown_files(
    paths: &[PathBuf],
    excludes: &[String],
    default_excludes: bool,
) -> Result<Vec<PathBuf>> {
    let patterns = excludes
        .iter()
        .map(|raw| glob::Pattern::new(raw).with_context(|| format!("Invalid exclude pattern '{}'", raw)))
        .collect::<Result<Vec<_>>>()?;

    let mut files = Vec::new();

    for path in paths {
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_excluded(e, &patterns, default_excludes))
        {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "md")
            {
                files.push(entry.into_path());
            }
        }
    }

    Ok(files)
}

fn is_excluded(entry: &walkdir::DirEntry, patterns: &[glob::Pattern], default_excludes: bool) -> bool {
    let name = entry.file_name().to_string_lossy();
    if default_excludes && (name.starts_with('.') || name.starts_with('_')) {
        return true;
    }
    patterns
        .iter()
        .any(|p| p.matches(&name) || p.matches_path(entry.path()))
}
