//! Vault path helpers.
//!
//! Vault paths are relative to the vault root and always use `/` as the
//! separator. [`canonical_key`] is the single normalization used wherever two
//! paths are compared: resolution candidates, task deduplication and link
//! matching during rewrites.

/// Normalizes a vault path for comparison.
///
/// Converts `\` to `/`, drops empty and `.` segments (which removes leading,
/// trailing and doubled slashes) and folds `..` into its parent. Comparison
/// stays case-sensitive.
pub fn canonical_key(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();

    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Returns the folder containing `path`, or `""` for files at the root.
pub fn parent(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..idx])
}

/// Joins a folder and a relative path, then canonicalizes the result.
pub fn join(folder: &str, path: &str) -> String {
    if folder.is_empty() {
        canonical_key(path)
    } else {
        canonical_key(&format!("{}/{}", folder, path))
    }
}

/// Returns the last path segment.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Returns the file name without its extension.
///
/// Dotfiles such as `.hidden` have no extension and keep their full name.
pub fn basename(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Returns the extension without its leading dot, or `""`.
pub fn extension(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[idx + 1..],
        _ => "",
    }
}
