//! Error kinds shared by the resolver, the rename workflows and the vault.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The link is empty once its alias has been stripped.
    #[error("link has no path: '{0}'")]
    UnresolvableLink(String),

    /// Scheme-prefixed links (`https://...`) are left alone.
    #[error("external link is not renamed: {0}")]
    ExternalLink(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("not an image: {0}")]
    NotAnImage(String),

    #[error("cannot rename {from} to {to}: destination already exists")]
    RenameConflict { from: String, to: String },

    #[error("cannot rename {from} to {to}: {reason}")]
    RenameFailure {
        from: String,
        to: String,
        reason: String,
    },

    #[error("no active document")]
    NoActiveDocument,

    #[error("no local images found in {0}")]
    NoImagesFound(String),

    #[error("no image link under the cursor")]
    NoLinkAtCursor,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
