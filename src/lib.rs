//! image-rename library for renaming images embedded in markdown notes.
//!
//! Images are renamed to `<note>-<YYYYMMDD>-<HHMMSS>.<ext>` in the folder they
//! already live in, and the note's embeds are rewritten to match. The
//! workflow has four phases:
//!
//! 1. **Scanning**: find `![[path|alias]]` and `![alt](path)` embeds
//! 2. **Resolution**: map each embed to a file in the vault
//! 3. **Renaming**: move the files, one at a time, best effort
//! 4. **Rewriting**: update only the path text of the affected embeds
//!
//! # Example
//!
//! ```no_run
//! use image_rename::{FsVault, RenameOptions, Renamer, Vault};
//!
//! let vault = FsVault::open("./vault").unwrap();
//! let note = vault.lookup("notes/diary.md");
//!
//! let renamer = Renamer::new(&vault, RenameOptions::default());
//! let report = renamer.rename_all(note.as_ref()).unwrap();
//!
//! println!("Renamed {} image(s)", report.renamed);
//! ```

pub mod editor;
pub mod error;
pub mod naming;
pub mod paths;
pub mod renamer;
pub mod resolver;
pub mod rewriter;
pub mod scanner;
pub mod vault;

// Re-export commonly used types at crate root
pub use editor::{DocumentEditor, Editor, Position};
pub use error::{Error, Result};
pub use renamer::{BatchReport, RenameOptions, RenameStatus, RenameTask, Renamer, SingleOutcome};
pub use rewriter::RewriteMapping;
pub use scanner::{LinkKind, LinkOccurrence};
pub use vault::{FsVault, LinkResolver, StoredFile, Vault};
