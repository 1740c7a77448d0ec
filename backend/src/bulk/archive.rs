//! ZIP packaging of rendered cards.

use crate::error::BulkError;
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::OnceLock;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One rendered card ready to be packaged.
#[derive(Debug, Clone)]
pub struct CardImage {
    pub name: String,
    pub identifier: String,
    pub row_index: usize,
    pub png: Vec<u8>,
}

/// A finished archive, held until the client downloads it.
#[derive(Debug, Clone)]
pub struct ExportArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub entries: Vec<String>,
}

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9]").expect("static pattern"))
}

/// Strip everything but ASCII letters and digits.
pub fn sanitize(value: &str) -> String {
    non_alphanumeric().replace_all(value, "").into_owned()
}

/// `<Name>_<Identifier>.png`, falling back to `Card` / `Row<n>` for empty parts.
pub fn entry_name(card: &CardImage) -> String {
    let name = Some(sanitize(&card.name))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Card".to_string());
    let id = Some(sanitize(&card.identifier))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("Row{}", card.row_index));
    format!("{name}_{id}.png")
}

/// `<Institution>_BulkIDCards_<YYYY-MM-DD>.zip`.
pub fn archive_name(institution: &str, date: NaiveDate) -> String {
    let institution = Some(sanitize(institution))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Institution".to_string());
    format!("{institution}_BulkIDCards_{}.zip", date.format("%Y-%m-%d"))
}

fn entry_options(level: i64) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(level))
}

/// Package `cards` into one deflated ZIP. Duplicate entry names get the row
/// number appended. An empty card list is refused.
pub fn build_archive(
    cards: &[CardImage],
    file_name: String,
    compression_level: i64,
) -> Result<ExportArchive, BulkError> {
    if cards.is_empty() {
        return Err(BulkError::NothingGenerated);
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut used = HashSet::new();
    let mut entries = Vec::with_capacity(cards.len());

    for card in cards {
        let base = entry_name(card);
        let stem = base.trim_end_matches(".png");
        let mut name = base.clone();
        let mut attempt = 1;
        while !used.insert(name.to_lowercase()) {
            name = match attempt {
                1 => format!("{stem}_{}.png", card.row_index),
                n => format!("{stem}_{}_{n}.png", card.row_index),
            };
            attempt += 1;
        }
        zip.start_file(name.as_str(), entry_options(compression_level))?;
        zip.write_all(&card.png)?;
        entries.push(name);
    }

    let bytes = zip.finish()?.into_inner();
    Ok(ExportArchive {
        file_name,
        bytes,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn card(name: &str, id: &str, row: usize) -> CardImage {
        CardImage {
            name: name.to_string(),
            identifier: id.to_string(),
            row_index: row,
            png: vec![row as u8; 16],
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Asha Rao"), "AshaRao");
        assert_eq!(sanitize("R-100/x"), "R100x");
        assert_eq!(sanitize("../../etc"), "etc");
    }

    #[test]
    fn test_entry_name_fallbacks() {
        assert_eq!(entry_name(&card("Asha Rao", "R100", 1)), "AshaRao_R100.png");
        assert_eq!(entry_name(&card("", "", 7)), "Card_Row7.png");
    }

    #[test]
    fn test_archive_name() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(
            archive_name("St. Mary's School", date),
            "StMarysSchool_BulkIDCards_2026-03-09.zip"
        );
        assert_eq!(archive_name("", date), "Institution_BulkIDCards_2026-03-09.zip");
    }

    #[test]
    fn test_archive_contains_one_entry_per_card() {
        let cards = vec![card("Asha", "R1", 1), card("Ben", "R2", 2), card("Asha", "R1", 3)];
        let archive = build_archive(&cards, "out.zip".into(), 6).unwrap();
        assert_eq!(archive.entries, vec!["Asha_R1.png", "Ben_R2.png", "Asha_R1_3.png"]);

        let mut zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
        assert_eq!(zip.len(), 3);
        let mut buf = Vec::new();
        zip.by_name("Ben_R2.png").unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, vec![2u8; 16]);
    }

    #[test]
    fn test_empty_archive_is_refused() {
        assert!(matches!(
            build_archive(&[], "out.zip".into(), 6),
            Err(BulkError::NothingGenerated)
        ));
    }
}
