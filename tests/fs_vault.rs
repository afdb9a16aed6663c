//! End-to-end rename workflows against a vault on disk.

use chrono::{DateTime, Local};
use image_rename::naming;
use image_rename::{
    DocumentEditor, Error, FsVault, RenameOptions, RenameStatus, Renamer, Vault,
};
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

fn set_mtime(root: &Path, path: &str, secs: u64) -> SystemTime {
    let time = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
    File::options()
        .write(true)
        .open(root.join(path))
        .unwrap()
        .set_modified(time)
        .unwrap();
    time
}

fn stamp(base: &str, time: SystemTime, ext: &str) -> String {
    naming::generate(base, DateTime::<Local>::from(time).naive_local(), ext)
}

fn vault_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

#[test]
fn batch_renames_embedded_image_next_to_original() {
    let dir = vault_dir();
    let root = dir.path();
    write(root, "notes/diary.md", "# Day\n\n![[assets/photo.jpg]]\n");
    write(root, "assets/photo.jpg", "jpeg bytes");
    let mtime = set_mtime(root, "assets/photo.jpg", 1_709_625_600);

    let vault = FsVault::open(root).unwrap();
    let note = vault.lookup("notes/diary.md");
    let report = Renamer::new(&vault, RenameOptions::default())
        .rename_all(note.as_ref())
        .unwrap();

    let new_path = format!("assets/{}", stamp("diary", mtime, ".jpg"));
    assert_eq!(report.renamed, 1);
    assert_eq!(report.outcomes[0].new_path, new_path);
    assert!(!root.join("assets/photo.jpg").exists());
    assert_eq!(fs::read_to_string(root.join(&new_path)).unwrap(), "jpeg bytes");
    assert_eq!(
        fs::read_to_string(root.join("notes/diary.md")).unwrap(),
        format!("# Day\n\n![[{}]]\n", new_path)
    );
}

#[test]
fn batch_updates_every_spelling_of_the_same_image() {
    let dir = vault_dir();
    let root = dir.path();
    write(
        root,
        "notes/trip.md",
        "![[beach.png|wide]]\n![the beach](../media/beach.png)\n![[media/beach.png]]\n",
    );
    write(root, "media/beach.png", "png");
    let mtime = set_mtime(root, "media/beach.png", 1_700_000_000);

    let vault = FsVault::open(root).unwrap();
    let note = vault.lookup("notes/trip.md");
    let report = Renamer::new(&vault, RenameOptions::default())
        .rename_all(note.as_ref())
        .unwrap();

    let new_path = format!("media/{}", stamp("trip", mtime, ".png"));
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.renamed, 1);
    assert_eq!(
        fs::read_to_string(root.join("notes/trip.md")).unwrap(),
        format!(
            "![[{0}|wide]]\n![the beach]({0})\n![[{0}]]\n",
            new_path
        )
    );
}

#[test]
fn batch_leaves_external_and_missing_links_untouched() {
    let dir = vault_dir();
    let root = dir.path();
    let content = "![remote](https://example.com/cat.png)\n![[missing.png]]\n![[img.gif]]\n";
    write(root, "note.md", content);
    write(root, "img.gif", "gif");
    let mtime = set_mtime(root, "img.gif", 1_650_000_000);

    let vault = FsVault::open(root).unwrap();
    let note = vault.lookup("note.md");
    Renamer::new(&vault, RenameOptions::default())
        .rename_all(note.as_ref())
        .unwrap();

    assert_eq!(
        fs::read_to_string(root.join("note.md")).unwrap(),
        format!(
            "![remote](https://example.com/cat.png)\n![[missing.png]]\n![[{}]]\n",
            stamp("note", mtime, ".gif")
        )
    );
}

#[test]
fn batch_conflict_keeps_link_to_unrenamed_file() {
    let dir = vault_dir();
    let root = dir.path();
    write(root, "note.md", "![[a.png]] ![[b.png]]");
    write(root, "a.png", "a");
    write(root, "b.png", "b");
    let mtime = set_mtime(root, "a.png", 1_600_000_000);
    set_mtime(root, "b.png", 1_600_000_000);

    let vault = FsVault::open(root).unwrap();
    let note = vault.lookup("note.md");
    let report = Renamer::new(&vault, RenameOptions::default())
        .rename_all(note.as_ref())
        .unwrap();

    let new_name = stamp("note", mtime, ".png");
    assert_eq!(report.renamed, 1);
    assert_eq!(report.failed, 1);
    assert!(matches!(report.outcomes[1].status, RenameStatus::Failed { .. }));
    assert!(root.join("b.png").exists());
    assert_eq!(
        fs::read_to_string(root.join("note.md")).unwrap(),
        format!("![[{}]] ![[b.png]]", new_name)
    );
}

#[test]
fn batch_without_images_reports_and_writes_nothing() {
    let dir = vault_dir();
    let root = dir.path();
    write(root, "note.md", "no embeds here");

    let vault = FsVault::open(root).unwrap();
    let note = vault.lookup("note.md");
    let err = Renamer::new(&vault, RenameOptions::default())
        .rename_all(note.as_ref())
        .unwrap_err();

    assert!(matches!(err, Error::NoImagesFound(_)));
    assert_eq!(fs::read_to_string(root.join("note.md")).unwrap(), "no embeds here");
}

fn fixed_clock() -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(8, 7, 9)
        .unwrap()
}

#[test]
fn single_rename_at_cursor_then_repeat_fails() {
    let dir = vault_dir();
    let root = dir.path();
    let content = "Look: ![a cat](img/cat.png) and ![[img/dog.png]]";
    write(root, "pets.md", content);
    write(root, "img/cat.png", "cat");
    write(root, "img/dog.png", "dog");

    let vault = FsVault::open(root).unwrap();
    let note = vault.lookup("pets.md").unwrap();
    let renamer = Renamer::new(&vault, RenameOptions::default()).with_clock(fixed_clock);

    let mut editor = DocumentEditor::at_column(vault.read(&note).unwrap(), 0, 10);
    let outcome = renamer.rename_at_cursor(&mut editor, &note).unwrap();
    vault.modify(&note, editor.content()).unwrap();

    assert_eq!(outcome.new_path, "img/pets-20240305-080709.png");
    assert!(root.join("img/pets-20240305-080709.png").is_file());
    assert!(root.join("img/dog.png").is_file());
    assert_eq!(
        fs::read_to_string(root.join("pets.md")).unwrap(),
        "Look: ![a cat](img/pets-20240305-080709.png) and ![[img/dog.png]]"
    );

    let mut stale = DocumentEditor::at_column(content.to_string(), 0, 10);
    let err = renamer.rename_at_cursor(&mut stale, &note).unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
    assert_eq!(stale.content(), content);
}

#[test]
fn batch_keeps_heading_fragment_on_rewritten_link() {
    let dir = vault_dir();
    let root = dir.path();
    write(root, "note.md", "![[img.png#center|x]]\n");
    write(root, "img.png", "png");
    let mtime = set_mtime(root, "img.png", 1_600_000_000);

    let vault = FsVault::open(root).unwrap();
    let note = vault.lookup("note.md");
    let report = Renamer::new(&vault, RenameOptions::default())
        .rename_all(note.as_ref())
        .unwrap();

    assert_eq!(report.renamed, 1);
    assert_eq!(
        fs::read_to_string(root.join("note.md")).unwrap(),
        format!("![[{}#center|x]]\n", stamp("note", mtime, ".png"))
    );
}

#[test]
fn single_rename_keeps_heading_fragment() {
    let dir = vault_dir();
    let root = dir.path();
    let content = "![[img.png#center|x]] and ![a](pic.png#top)";
    write(root, "note.md", content);
    write(root, "img.png", "png");
    write(root, "pic.png", "png");

    let vault = FsVault::open(root).unwrap();
    let note = vault.lookup("note.md").unwrap();
    let renamer = Renamer::new(&vault, RenameOptions::default()).with_clock(fixed_clock);

    let mut editor = DocumentEditor::at_column(content.to_string(), 0, 3);
    renamer.rename_at_cursor(&mut editor, &note).unwrap();
    assert_eq!(
        editor.content(),
        "![[note-20240305-080709.png#center|x]] and ![a](pic.png#top)"
    );

    let mut editor = DocumentEditor::at_column(editor.into_content(), 0, 44);
    let renamer = renamer.with_clock(|| fixed_clock() + chrono::Duration::seconds(1));
    renamer.rename_at_cursor(&mut editor, &note).unwrap();
    assert_eq!(
        editor.content(),
        "![[note-20240305-080709.png#center|x]] and ![a](note-20240305-080710.png#top)"
    );
}
