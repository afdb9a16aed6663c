//! Rename workflows.
//!
//! [`Renamer`] drives both entry points:
//!
//! * the single-link workflow, which renames the image under the editor cursor
//!   and rewrites that one link, and
//! * the batch workflow, which renames every local image a document embeds and
//!   rewrites the document in one write.
//!
//! Batch renames are best effort. Each rename runs to completion before the
//! next starts, a failure is recorded against its task only, and only links to
//! files that were actually renamed are rewritten.

use crate::editor::{Editor, Position};
use crate::error::{Error, Result};
use crate::naming;
use crate::paths::canonical_key;
use crate::resolver::{self, link_path};
use crate::rewriter::{self, RewriteMapping};
use crate::scanner::{self, LinkKind, LinkOccurrence};
use crate::vault::{LinkResolver, StoredFile, Vault};
use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "svg", "webp", "avif", "tif", "tiff", "ico",
];

#[derive(Debug, Clone)]
pub struct RenameOptions {
    /// Extensions, without dot, of files that may be renamed.
    pub image_extensions: Vec<String>,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            image_extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RenameOptions {
    pub fn with_extensions(mut self, extra: impl IntoIterator<Item = String>) -> Self {
        for ext in extra {
            let ext = ext.trim_start_matches('.').to_ascii_lowercase();
            if !ext.is_empty() && !self.image_extensions.contains(&ext) {
                self.image_extensions.push(ext);
            }
        }
        self
    }

    pub fn is_image(&self, file: &StoredFile) -> bool {
        self.image_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(&file.extension))
    }
}

/// One file to rename during a batch.
#[derive(Debug, Clone, Serialize)]
pub struct RenameTask {
    pub target: StoredFile,
    pub new_path: String,
    /// Grammar of the first link that referenced the target.
    pub kind: LinkKind,
    /// Every distinct link spelling in the document that resolved to `target`,
    /// without alias or `#fragment`.
    pub links: Vec<String>,
}

impl RenameTask {
    pub fn is_noop(&self) -> bool {
        canonical_key(&self.new_path) == canonical_key(&self.target.path)
    }

    pub fn mappings(&self) -> impl Iterator<Item = RewriteMapping> + '_ {
        self.links.iter().map(|link| RewriteMapping {
            old_path: link.clone(),
            new_path: self.new_path.clone(),
            kind: self.kind,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RenameStatus {
    Renamed,
    /// The file already carries the generated name.
    Unchanged,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskOutcome {
    pub old_path: String,
    pub new_path: String,
    pub kind: LinkKind,
    #[serde(flatten)]
    pub status: RenameStatus,
}

/// Result of a batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub document: String,
    pub outcomes: Vec<TaskOutcome>,
    pub renamed: usize,
    pub failed: usize,
    pub content_updated: bool,
}

/// Result of a single-link rename.
#[derive(Debug, Clone, Serialize)]
pub struct SingleOutcome {
    pub old_path: String,
    pub new_path: String,
    /// Replacement link syntax for the occurrence.
    pub link_text: String,
}

/// Current local wall-clock time.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub struct Renamer<'a, V: ?Sized> {
    vault: &'a V,
    options: RenameOptions,
    clock: fn() -> NaiveDateTime,
}

impl<'a, V> Renamer<'a, V>
where
    V: Vault + LinkResolver + ?Sized,
{
    pub fn new(vault: &'a V, options: RenameOptions) -> Self {
        Self {
            vault,
            options,
            clock: local_now,
        }
    }

    /// Replaces the wall clock used by the single-link workflow.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    fn resolve_image(&self, raw_link: &str, source: &StoredFile) -> Result<StoredFile> {
        let target = resolver::resolve(self.vault, raw_link, &source.path)?;
        if !self.options.is_image(&target) {
            return Err(Error::NotAnImage(target.path));
        }
        Ok(target)
    }

    /// Renames the image behind `occurrence`, named after `source` and the
    /// current time.
    ///
    /// Returns the link text the occurrence should be replaced with. Storage
    /// is left untouched when resolution fails.
    pub fn rename_occurrence(
        &self,
        occurrence: &LinkOccurrence,
        source: &StoredFile,
    ) -> Result<SingleOutcome> {
        let target = self.resolve_image(&occurrence.raw_link, source)?;
        let new_path = naming::new_path(&target, source.basename(), (self.clock)());

        if canonical_key(&new_path) != canonical_key(&target.path) {
            self.vault.rename(&target, &new_path)?;
            info!("renamed {} -> {}", target.path, new_path);
        }

        Ok(SingleOutcome {
            link_text: rewriter::link_text(occurrence, &new_path),
            old_path: target.path,
            new_path,
        })
    }

    /// Renames the image linked under the editor cursor and rewrites that
    /// link in place. The editor is only touched after the rename succeeded.
    pub fn rename_at_cursor<E>(&self, editor: &mut E, source: &StoredFile) -> Result<SingleOutcome>
    where
        E: Editor + ?Sized,
    {
        let cursor = editor.cursor();
        let line = editor.line(cursor.line).ok_or(Error::NoLinkAtCursor)?;
        let occurrence = scanner::occurrence_at(&line, cursor.ch).ok_or(Error::NoLinkAtCursor)?;

        let outcome = self.rename_occurrence(&occurrence, source)?;
        editor.replace_span(
            &outcome.link_text,
            Position {
                line: cursor.line,
                ch: occurrence.start,
            },
            Position {
                line: cursor.line,
                ch: occurrence.end,
            },
        );
        Ok(outcome)
    }

    /// Renames every local image embedded in `active`.
    pub fn rename_all(&self, active: Option<&StoredFile>) -> Result<BatchReport> {
        let document = active.ok_or(Error::NoActiveDocument)?;
        let content = self.vault.read(document)?;

        let tasks = self.plan(document, &content);
        if tasks.is_empty() {
            return Err(Error::NoImagesFound(document.path.clone()));
        }

        self.execute(document, &content, &tasks)
    }

    /// Resolves every embed in `content` and builds one task per distinct
    /// target file, in order of first reference.
    ///
    /// Links that do not resolve to a local image are skipped. New names use
    /// each target's modification time.
    pub fn plan(&self, document: &StoredFile, content: &str) -> Vec<RenameTask> {
        let mut tasks: Vec<RenameTask> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for occurrence in scanner::scan(content) {
            let target = match self.resolve_image(&occurrence.raw_link, document) {
                Ok(target) => target,
                Err(err) => {
                    debug!("skipping {}: {}", occurrence.full_text, err);
                    continue;
                }
            };
            let link = link_path(&occurrence.raw_link).to_string();

            match index.entry(canonical_key(&target.path)) {
                Entry::Occupied(slot) => {
                    let task = &mut tasks[*slot.get()];
                    if !task.links.contains(&link) {
                        task.links.push(link);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(tasks.len());
                    let new_path = naming::new_path(&target, document.basename(), target.modified);
                    tasks.push(RenameTask {
                        target,
                        new_path,
                        kind: occurrence.kind,
                        links: vec![link],
                    });
                }
            }
        }

        tasks
    }

    /// Runs `tasks` one after another, then rewrites `content` for the tasks
    /// that succeeded and writes it back to `document` once.
    pub fn execute(
        &self,
        document: &StoredFile,
        content: &str,
        tasks: &[RenameTask],
    ) -> Result<BatchReport> {
        let (outcomes, mappings) = tasks.iter().fold(
            (Vec::new(), Vec::new()),
            |(mut outcomes, mut mappings), task| {
                let status = self.apply(task);
                if status == RenameStatus::Renamed {
                    mappings.extend(task.mappings());
                }
                outcomes.push(TaskOutcome {
                    old_path: task.target.path.clone(),
                    new_path: task.new_path.clone(),
                    kind: task.kind,
                    status,
                });
                (outcomes, mappings)
            },
        );

        let updated = rewriter::rewrite_document(content, &mappings);
        let content_updated = updated != content;
        if content_updated {
            self.vault.modify(document, &updated)?;
            info!("updated links in {}", document.path);
        }

        let renamed = outcomes
            .iter()
            .filter(|o| o.status == RenameStatus::Renamed)
            .count();
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o.status, RenameStatus::Failed { .. }))
            .count();

        Ok(BatchReport {
            document: document.path.clone(),
            outcomes,
            renamed,
            failed,
            content_updated,
        })
    }

    fn apply(&self, task: &RenameTask) -> RenameStatus {
        if task.is_noop() {
            return RenameStatus::Unchanged;
        }
        match self.vault.rename(&task.target, &task.new_path) {
            Ok(()) => {
                info!("renamed {} -> {}", task.target.path, task.new_path);
                RenameStatus::Renamed
            }
            Err(err) => {
                warn!("failed to rename {}: {}", task.target.path, err);
                RenameStatus::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}
