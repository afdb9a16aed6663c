//! Command-line interface definitions.
//!
//! Defines the argument parser and subcommands using clap's derive API.
//! Each subcommand corresponds to a distinct operation: listing the embeds of
//! a vault, renaming the image under a cursor position, or renaming every
//! image a note embeds.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rename images embedded in markdown notes and keep their links in sync.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Vault root. Note and image paths are relative to it.
    #[arg(long, global = true, default_value = ".")]
    pub vault: PathBuf,

    /// Extra file extension to treat as an image (e.g. "heic"). Repeatable.
    #[arg(long = "ext", global = true)]
    pub extensions: Vec<String>,

    /// Log resolution and rename details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List embedded images per note and how each link resolves.
    Scan {
        /// Paths to scan. Defaults to the vault root.
        #[arg(short, long)]
        paths: Option<Vec<PathBuf>>,

        /// Glob patterns for directories/files to exclude (e.g., "templates", "*.excalidraw.md").
        /// By default, entries starting with `.` or `_` are excluded.
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Disable default exclusion of `.` and `_` prefixed entries.
        #[arg(long)]
        no_default_excludes: bool,

        /// Emit JSON instead of human-readable output.
        #[arg(long)]
        json: bool,
    },

    /// Rename the image linked at a cursor position and rewrite that link.
    Rename {
        /// Note containing the link, relative to the vault root.
        document: String,

        /// Line of the cursor, 1-indexed.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        line: u32,

        /// Column of the cursor in characters, 1-indexed.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        column: u32,

        /// Emit JSON instead of human-readable output.
        #[arg(long)]
        json: bool,
    },

    /// Rename every local image a note embeds and rewrite its links.
    Batch {
        /// Note to process, relative to the vault root.
        document: String,

        /// Actually rename files and rewrite the note (default is dry-run).
        #[arg(long)]
        write: bool,

        /// Interactively confirm each rename before applying.
        #[arg(short, long, requires = "write")]
        interactive: bool,

        /// Emit JSON instead of human-readable output.
        #[arg(long)]
        json: bool,
    },
}
