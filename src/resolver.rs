//! Link resolution.
//!
//! Turns the path text of an embed into a file in the vault. The host's own
//! resolver is asked first; when it has no answer a short list of guessed
//! candidate paths is tried in order.

use crate::error::{Error, Result};
use crate::paths;
use crate::vault::{LinkResolver, StoredFile, Vault};
use log::debug;

/// Drops a trailing `|alias` and surrounding whitespace.
pub fn strip_alias(raw_link: &str) -> &str {
    raw_link.split('|').next().unwrap_or(raw_link).trim()
}

/// Splits `link` at its first `#` into the file path and the heading or block
/// suffix, which keeps its `#`.
pub fn split_fragment(link: &str) -> (&str, &str) {
    match link.find('#') {
        Some(idx) => link.split_at(idx),
        None => (link, ""),
    }
}

/// File path a link points at, without alias or `#fragment`.
pub fn link_path(raw_link: &str) -> &str {
    split_fragment(strip_alias(raw_link)).0.trim()
}

/// Whether `link` starts with a URI scheme such as `https://`.
pub fn is_external(link: &str) -> bool {
    match link.find("://") {
        Some(idx) if idx > 0 => link[..idx].chars().all(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}

/// Resolves `raw_link`, as written in the document at `source_path`.
///
/// 1. Strips the alias; an empty link is [`Error::UnresolvableLink`]
/// 2. Scheme-prefixed links are [`Error::ExternalLink`]
/// 3. Asks the vault's [`LinkResolver`]
/// 4. Falls back to [`candidates`], first existing file wins
/// 5. Otherwise [`Error::FileNotFound`]
pub fn resolve<V>(vault: &V, raw_link: &str, source_path: &str) -> Result<StoredFile>
where
    V: Vault + LinkResolver + ?Sized,
{
    let link = strip_alias(raw_link);
    if link.is_empty() {
        return Err(Error::UnresolvableLink(raw_link.to_string()));
    }
    if is_external(link) {
        return Err(Error::ExternalLink(link.to_string()));
    }

    if let Some(file) = vault.resolve_link_path(link, source_path) {
        return Ok(file);
    }

    candidates(link_path(link), source_path)
        .into_iter()
        .find_map(|candidate| {
            let file = vault.lookup(&candidate)?;
            debug!("resolved '{}' via fallback candidate {}", link, candidate);
            Some(file)
        })
        .ok_or_else(|| Error::FileNotFound(link.to_string()))
}

/// Guessed locations for a link the host could not resolve, in order:
/// the link as a vault-root path, the link relative to the source document's
/// folder, and the link without a leading `/`.
pub fn candidates(link: &str, source_path: &str) -> Vec<String> {
    let mut found = vec![link.to_string(), paths::join(paths::parent(source_path), link)];
    if let Some(stripped) = link.strip_prefix('/') {
        found.push(stripped.to_string());
    }
    found.dedup();
    found
}
