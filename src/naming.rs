//! Timestamped file names.

use crate::vault::StoredFile;
use chrono::NaiveDateTime;

/// Builds `<doc_base>-<YYYYMMDD>-<HHMMSS><extension>`.
///
/// `extension` is appended verbatim, so callers pass it with its dot. Names
/// are only unique to the second.
pub fn generate(doc_base: &str, timestamp: NaiveDateTime, extension: &str) -> String {
    format!("{}-{}{}", doc_base, timestamp.format("%Y%m%d-%H%M%S"), extension)
}

/// Prefixes a bare extension with `.`; empty stays empty.
pub fn dotted(extension: &str) -> String {
    if extension.is_empty() || extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{}", extension)
    }
}

/// New vault path for `target`, in the folder it already lives in.
pub fn new_path(target: &StoredFile, doc_base: &str, timestamp: NaiveDateTime) -> String {
    let name = generate(doc_base, timestamp, &dotted(&target.extension));
    match target.folder() {
        "" => name,
        folder => format!("{}/{}", folder, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn zero_pads_every_component() {
        assert_eq!(
            generate("Note", at(2024, 3, 5, 8, 7, 9), ".png"),
            "Note-20240305-080709.png"
        );
    }

    #[test]
    fn pads_short_years() {
        assert_eq!(generate("n", at(987, 1, 1, 0, 0, 0), ".gif"), "n-09870101-000000.gif");
    }

    #[test]
    fn same_second_collides() {
        let ts = at(2024, 12, 31, 23, 59, 59);
        assert_eq!(generate("a", ts, ".png"), generate("a", ts, ".png"));
    }

    #[test]
    fn dotted_normalizes_extension() {
        assert_eq!(dotted("png"), ".png");
        assert_eq!(dotted(".png"), ".png");
        assert_eq!(dotted(""), "");
    }

    #[test]
    fn new_path_keeps_folder() {
        let ts = at(2024, 3, 5, 8, 7, 9);
        let nested = StoredFile::new("assets/photo.jpg", ts);
        assert_eq!(new_path(&nested, "diary", ts), "assets/diary-20240305-080709.jpg");
        let root = StoredFile::new("photo", ts);
        assert_eq!(new_path(&root, "diary", ts), "diary-20240305-080709");
    }
}
