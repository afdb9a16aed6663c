//! image-rename: rename images embedded in markdown notes.
//!
//! Renames each image to `<note>-<YYYYMMDD>-<HHMMSS>.<ext>` next to where it
//! already lives and rewrites the note's `![[...]]` and `![...](...)` embeds so
//! they keep pointing at it.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Commands};
use colored::Colorize;
use dialoguer::Confirm;
use image_rename::{
    BatchReport, DocumentEditor, Error, FsVault, LinkKind, RenameOptions, RenameStatus, RenameTask,
    Renamer, Vault, resolver, scanner,
};
use log::warn;
use serde::Serialize;
use std::path::PathBuf;

/// Embeds found in one note.
#[derive(Debug, Serialize)]
struct NoteLinks {
    note: String,
    links: Vec<LinkStatus>,
}

/// One embed and what it resolves to.
#[derive(Debug, Serialize)]
struct LinkStatus {
    kind: LinkKind,
    link: String,
    /// Line number, 1-indexed.
    line: usize,
    /// Column number, 1-indexed.
    column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let vault = FsVault::open(&args.vault)
        .with_context(|| format!("Failed to open vault {}", args.vault.display()))?;
    let options = RenameOptions::default().with_extensions(args.extensions);

    match args.command {
        Commands::Scan {
            paths,
            exclude,
            no_default_excludes,
            json,
        } => cmd_scan(&vault, &options, paths, &exclude, !no_default_excludes, json),
        Commands::Rename {
            document,
            line,
            column,
            json,
        } => cmd_rename(&vault, options, &document, line as usize, column as usize, json),
        Commands::Batch {
            document,
            write,
            interactive,
            json,
        } => cmd_batch(&vault, options, &document, write, interactive, json),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn cmd_scan(
    vault: &FsVault,
    options: &RenameOptions,
    paths: Option<Vec<PathBuf>>,
    exclude: &[String],
    default_excludes: bool,
    json_output: bool,
) -> Result<()> {
    let scan_paths = paths.unwrap_or_else(|| vec![vault.root().to_path_buf()]);
    let files = scanner::collect_markdown_files(&scan_paths, exclude, default_excludes)?;

    let mut notes = Vec::new();
    for file in &files {
        let Some(note) = vault.relative(file) else {
            warn!("{} is outside the vault, skipping", file.display());
            continue;
        };
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;

        let links: Vec<LinkStatus> = scanner::scan(&content)
            .into_iter()
            .map(|occurrence| {
                let (line, column) = offset_to_line_col(&content, occurrence.start);
                let (resolved, reason) = match resolver::resolve(vault, &occurrence.raw_link, &note) {
                    Ok(file) if options.is_image(&file) => (Some(file.path), None),
                    Ok(file) => (Some(file.path), Some("not an image".to_string())),
                    Err(err) => (None, Some(err.to_string())),
                };
                LinkStatus {
                    kind: occurrence.kind,
                    link: occurrence.raw_link,
                    line,
                    column,
                    resolved,
                    reason,
                }
            })
            .collect();

        if !links.is_empty() {
            notes.push(NoteLinks { note, links });
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&notes)?);
    } else {
        print_scan_result(&notes, files.len());
    }

    Ok(())
}

fn cmd_rename(
    vault: &FsVault,
    options: RenameOptions,
    document: &str,
    line: usize,
    column: usize,
    json_output: bool,
) -> Result<()> {
    let note = vault
        .lookup(document)
        .ok_or(Error::NoActiveDocument)
        .with_context(|| format!("Note not found: {}", document))?;
    let content = vault.read(&note)?;

    let mut editor = DocumentEditor::at_column(content, line - 1, column - 1);
    let renamer = Renamer::new(vault, options);
    let outcome = renamer
        .rename_at_cursor(&mut editor, &note)
        .with_context(|| format!("Rename failed at {}:{}:{}", document, line, column))?;
    vault.modify(&note, editor.content())?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!(
            "{} {} {} {}",
            "ok:".green().bold(),
            outcome.old_path.red(),
            "->".green(),
            outcome.new_path.green()
        );
    }

    Ok(())
}

fn cmd_batch(
    vault: &FsVault,
    options: RenameOptions,
    document: &str,
    write: bool,
    interactive: bool,
    json_output: bool,
) -> Result<()> {
    let note = vault.lookup(document);
    let renamer = Renamer::new(vault, options);

    if write && !interactive {
        return match renamer.rename_all(note.as_ref()) {
            Ok(report) => print_batch_report(&report, json_output),
            Err(Error::NoImagesFound(path)) => {
                println!("{} No local images found in {}", "info:".blue().bold(), path);
                Ok(())
            }
            Err(err) => Err(err).with_context(|| format!("Batch rename failed for {}", document)),
        };
    }

    let note = note
        .ok_or(Error::NoActiveDocument)
        .with_context(|| format!("Note not found: {}", document))?;
    let content = vault.read(&note)?;
    let tasks = renamer.plan(&note, &content);

    if tasks.is_empty() {
        println!("{} No local images found in {}", "info:".blue().bold(), note.path);
        return Ok(());
    }

    if !write {
        if json_output {
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        } else {
            print_plan(&tasks);
            println!("\n{} Use --write to apply changes", "hint:".cyan().bold());
        }
        return Ok(());
    }

    let selected = confirm_tasks(tasks)?;
    if selected.is_empty() {
        println!("{} No renames selected", "info:".blue().bold());
        return Ok(());
    }
    let report = renamer.execute(&note, &content, &selected)?;
    print_batch_report(&report, json_output)
}

fn confirm_tasks(tasks: Vec<RenameTask>) -> Result<Vec<RenameTask>> {
    let mut selected = Vec::new();
    for task in tasks {
        if task.is_noop() {
            continue;
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Rename {} -> {}?", task.target.path, task.new_path))
            .default(true)
            .interact()?;
        if confirmed {
            selected.push(task);
        }
    }
    Ok(selected)
}

fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn print_scan_result(notes: &[NoteLinks], files_scanned: usize) {
    if notes.is_empty() {
        println!(
            "{} No embedded images in {} note(s)",
            "ok:".green().bold(),
            files_scanned
        );
        return;
    }

    for note in notes {
        println!("\n{}", note.note.bold());
        for link in &note.links {
            let loc = format!("{}:{}", link.line, link.column);
            match (&link.resolved, &link.reason) {
                (Some(path), None) => {
                    println!("  {} {} {} {}", loc.dimmed(), link.link, "->".green(), path.green())
                }
                (_, reason) => println!(
                    "  {} {} {}",
                    loc.dimmed(),
                    link.link.yellow(),
                    format!("({})", reason.as_deref().unwrap_or("unresolved")).dimmed()
                ),
            }
        }
    }
}

fn print_plan(tasks: &[RenameTask]) {
    println!("{}", "Would rename:".yellow().bold());
    for task in tasks {
        if task.is_noop() {
            println!("  {} {}", task.target.path.dimmed(), "(already named)".dimmed());
        } else {
            println!(
                "  {} {} {}",
                task.target.path.red(),
                "->".green(),
                task.new_path.green()
            );
        }
    }
}

fn print_batch_report(report: &BatchReport, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for outcome in &report.outcomes {
        match &outcome.status {
            RenameStatus::Renamed => println!(
                "  {} {} {}",
                outcome.old_path.red(),
                "->".green(),
                outcome.new_path.green()
            ),
            RenameStatus::Unchanged => println!(
                "  {} {}",
                outcome.old_path.dimmed(),
                "(already named)".dimmed()
            ),
            RenameStatus::Failed { reason } => println!(
                "  {} {}",
                outcome.old_path.red(),
                format!("({})", reason).dimmed()
            ),
        }
    }

    println!(
        "\n{} Renamed {} image(s) in {}",
        "ok:".green().bold(),
        report.renamed,
        report.document
    );
    if report.failed > 0 {
        eprintln!(
            "{} {} rename(s) failed",
            "warn:".yellow().bold(),
            report.failed
        );
    }

    Ok(())
}
