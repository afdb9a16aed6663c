//! Storage and link resolution collaborators.
//!
//! The rename workflows only talk to storage through [`Vault`] and to the
//! host's link resolution through [`LinkResolver`]. [`FsVault`] implements
//! both over a directory on disk.

use crate::error::{Error, Result};
use crate::paths::{self, canonical_key};
use chrono::{DateTime, Local, NaiveDateTime};
use log::debug;
use serde::Serialize;
use std::cell::RefCell;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// A file that exists in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    /// Vault-relative path with `/` separators.
    pub path: String,
    /// File name including the extension.
    pub name: String,
    /// Extension without the leading dot.
    pub extension: String,
    /// Last modification time in local time.
    pub modified: NaiveDateTime,
}

impl StoredFile {
    pub fn new(path: &str, modified: NaiveDateTime) -> Self {
        let path = canonical_key(path);
        Self {
            name: paths::file_name(&path).to_string(),
            extension: paths::extension(&path).to_string(),
            path,
            modified,
        }
    }

    /// File name without its extension.
    pub fn basename(&self) -> &str {
        paths::basename(&self.path)
    }

    /// Containing folder, `""` at the vault root.
    pub fn folder(&self) -> &str {
        paths::parent(&self.path)
    }
}

/// Document and asset storage.
pub trait Vault {
    /// Returns the file at `path`, or `None` if it is absent or a folder.
    fn lookup(&self, path: &str) -> Option<StoredFile>;

    fn read(&self, file: &StoredFile) -> Result<String>;

    fn modify(&self, file: &StoredFile, content: &str) -> Result<()>;

    /// Moves `file` to `new_path`.
    ///
    /// Fails with [`Error::RenameConflict`] if `new_path` is taken and with
    /// [`Error::FileNotFound`] if `file` no longer exists.
    fn rename(&self, file: &StoredFile, new_path: &str) -> Result<()>;
}

/// The host's own link resolution.
pub trait LinkResolver {
    /// Resolves `link` as written in the document at `source_path`.
    fn resolve_link_path(&self, link: &str, source_path: &str) -> Option<StoredFile>;
}

/// A vault rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    /// File list for name-based resolution, built on first use and dropped
    /// after every rename.
    index: RefCell<Option<Vec<String>>>,
}

impl FsVault {
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = fs::canonicalize(root.as_ref())?;
        if !root.is_dir() {
            return Err(Error::FileNotFound(root.display().to_string()));
        }
        Ok(Self {
            root,
            index: RefCell::default(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a vault path.
    pub fn absolute(&self, path: &str) -> PathBuf {
        self.root.join(canonical_key(path))
    }

    /// Vault path of an on-disk location, if it lies inside the vault.
    pub fn relative(&self, path: &Path) -> Option<String> {
        self.vault_path(&fs::canonicalize(path).ok()?)
    }

    fn vault_path(&self, path: &Path) -> Option<String> {
        let rest = path.strip_prefix(&self.root).ok()?;
        let segments: Vec<_> = rest
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Some(segments.join("/"))
    }

    /// All files in the vault, skipping dot-directories such as `.obsidian`.
    pub fn files(&self) -> Vec<String> {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| self.vault_path(entry.path()))
            .collect()
    }

    fn with_index<T>(&self, f: impl FnOnce(&[String]) -> T) -> T {
        let mut index = self.index.borrow_mut();
        let files = index.get_or_insert_with(|| self.files());
        f(files.as_slice())
    }
}

impl Vault for FsVault {
    fn lookup(&self, path: &str) -> Option<StoredFile> {
        let key = canonical_key(path);
        if key.is_empty() {
            return None;
        }
        let metadata = fs::metadata(self.absolute(&key)).ok()?;
        if !metadata.is_file() {
            return None;
        }
        let modified = metadata
            .modified()
            .map(|time| DateTime::<Local>::from(time).naive_local())
            .unwrap_or_default();
        Some(StoredFile::new(&key, modified))
    }

    fn read(&self, file: &StoredFile) -> Result<String> {
        Ok(fs::read_to_string(self.absolute(&file.path))?)
    }

    fn modify(&self, file: &StoredFile, content: &str) -> Result<()> {
        Ok(fs::write(self.absolute(&file.path), content)?)
    }

    fn rename(&self, file: &StoredFile, new_path: &str) -> Result<()> {
        let target = canonical_key(new_path);
        if target == canonical_key(&file.path) {
            return Ok(());
        }

        let from = self.absolute(&file.path);
        let to = self.absolute(&target);
        if !from.is_file() {
            return Err(Error::FileNotFound(file.path.clone()));
        }
        if to.exists() {
            return Err(Error::RenameConflict {
                from: file.path.clone(),
                to: target,
            });
        }

        let failure = |err: std::io::Error| Error::RenameFailure {
            from: file.path.clone(),
            to: target.clone(),
            reason: err.to_string(),
        };
        if let Some(dir) = to.parent() {
            fs::create_dir_all(dir).map_err(failure)?;
        }
        fs::rename(&from, &to).map_err(failure)?;
        self.index.borrow_mut().take();
        Ok(())
    }
}

impl LinkResolver for FsVault {
    /// Relative links (`./`, `../`) resolve against the source folder. Other
    /// links try an exact vault path first, then any file whose path ends with
    /// the link, preferring the source folder, then the shortest path.
    fn resolve_link_path(&self, link: &str, source_path: &str) -> Option<StoredFile> {
        let link = link.split('#').next().unwrap_or(link).trim();
        if link.is_empty() {
            return None;
        }

        let source_folder = paths::parent(source_path);
        if link.starts_with("./") || link.starts_with("../") {
            return self.lookup(&paths::join(source_folder, link));
        }
        if let Some(file) = self.lookup(link) {
            return Some(file);
        }

        let wanted = canonical_key(link);
        let suffix = format!("/{}", wanted);
        let best = self.with_index(|files| {
            files
                .iter()
                .filter(|path| **path == wanted || path.ends_with(&suffix))
                .min_by_key(|path| (paths::parent(path) != source_folder, path.len(), path.to_string()))
                .cloned()
        })?;

        debug!("resolved '{}' from {} by file name: {}", link, source_path, best);
        self.lookup(&best)
    }
}

/// In-memory vault used by unit tests.
#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, HashMap, HashSet};

    #[derive(Default)]
    pub struct MemoryVault {
        files: RefCell<BTreeMap<String, (NaiveDateTime, String)>>,
        oracle: HashMap<String, String>,
        failing: HashSet<String>,
        pub renames: RefCell<Vec<(String, String)>>,
        pub writes: RefCell<usize>,
    }

    impl MemoryVault {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(self, path: &str, modified: NaiveDateTime, content: &str) -> Self {
            self.files
                .borrow_mut()
                .insert(canonical_key(path), (modified, content.to_string()));
            self
        }

        /// Makes the oracle answer `link` with `path`.
        pub fn with_oracle(mut self, link: &str, path: &str) -> Self {
            self.oracle.insert(link.to_string(), path.to_string());
            self
        }

        /// Makes renames of `path` fail.
        pub fn failing_rename(mut self, path: &str) -> Self {
            self.failing.insert(path.to_string());
            self
        }

        pub fn content(&self, path: &str) -> Option<String> {
            self.files.borrow().get(path).map(|(_, content)| content.clone())
        }

        pub fn exists(&self, path: &str) -> bool {
            self.files.borrow().contains_key(path)
        }
    }

    impl Vault for MemoryVault {
        fn lookup(&self, path: &str) -> Option<StoredFile> {
            let key = canonical_key(path);
            self.files
                .borrow()
                .get(&key)
                .map(|(modified, _)| StoredFile::new(&key, *modified))
        }

        fn read(&self, file: &StoredFile) -> Result<String> {
            self.content(&file.path)
                .ok_or_else(|| Error::FileNotFound(file.path.clone()))
        }

        fn modify(&self, file: &StoredFile, content: &str) -> Result<()> {
            let mut files = self.files.borrow_mut();
            let entry = files
                .get_mut(&file.path)
                .ok_or_else(|| Error::FileNotFound(file.path.clone()))?;
            entry.1 = content.to_string();
            *self.writes.borrow_mut() += 1;
            Ok(())
        }

        fn rename(&self, file: &StoredFile, new_path: &str) -> Result<()> {
            if self.failing.contains(&file.path) {
                return Err(Error::RenameFailure {
                    from: file.path.clone(),
                    to: new_path.to_string(),
                    reason: "permission denied".to_string(),
                });
            }
            let mut files = self.files.borrow_mut();
            if files.contains_key(new_path) {
                return Err(Error::RenameConflict {
                    from: file.path.clone(),
                    to: new_path.to_string(),
                });
            }
            let entry = files
                .remove(&file.path)
                .ok_or_else(|| Error::FileNotFound(file.path.clone()))?;
            files.insert(new_path.to_string(), entry);
            self.renames
                .borrow_mut()
                .push((file.path.clone(), new_path.to_string()));
            Ok(())
        }
    }

    impl LinkResolver for MemoryVault {
        fn resolve_link_path(&self, link: &str, _source_path: &str) -> Option<StoredFile> {
            self.oracle.get(link).and_then(|path| self.lookup(path))
        }
    }
}
