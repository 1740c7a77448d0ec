//! Identifier-based photo matching.
//!
//! A record's identifier (first non-empty of `rollNo`, `enrollmentNo`,
//! `employeeId`, `participantId`) matches a photo when either string contains the
//! other, ignoring case. Records that already have a photo are never touched.
//!
//! Matching runs in two passes over all records. Exact identifier matches are
//! handed out first, lowest row first, so a longer identifier keeps its own photo
//! even when a lower row's identifier is a substring of it. The substring pass then
//! runs over the photos that remain: lowest row first, the candidate whose
//! identifier length is closest wins, then the earliest upload. A photo is consumed
//! by the first record that claims it.

use common::model::photo::PhotoMapping;
use common::model::record::Record;
use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoMatch {
    pub record_id: String,
    pub photo_index: usize,
    pub exact: bool,
}

/// Distance of a substring match between two lowercased identifiers. `None` when
/// unrelated or exact.
fn substring_distance(identifier: &str, photo_id: &str) -> Option<usize> {
    if photo_id == identifier {
        return None;
    }
    if photo_id.contains(identifier) || identifier.contains(photo_id) {
        return Some(photo_id.len().abs_diff(identifier.len()));
    }
    None
}

/// Compute the matches for `records` against `photos` without changing either.
pub fn find_matches(records: &[Record], photos: &[PhotoMapping]) -> Vec<PhotoMatch> {
    let photo_ids: Vec<String> = photos
        .iter()
        .map(|p| p.identifier.trim().to_lowercase())
        .collect();

    let mut candidates: Vec<(usize, &Record, String)> = records
        .iter()
        .filter(|r| !r.has_photo())
        .filter_map(|r| {
            r.identifier()
                .map(|id| (r.row_index, r, id.to_lowercase()))
        })
        .collect();
    candidates.sort_by_key(|(row, _, _)| *row);

    let mut claimed = vec![false; photos.len()];
    let mut served = vec![false; candidates.len()];
    let mut matches = Vec::new();

    for (c, (_, record, identifier)) in candidates.iter().enumerate() {
        let exact = photo_ids
            .iter()
            .enumerate()
            .find(|(p, photo_id)| !claimed[*p] && !photo_id.is_empty() && *photo_id == identifier)
            .map(|(p, _)| p);
        if let Some(p) = exact {
            claimed[p] = true;
            served[c] = true;
            matches.push(PhotoMatch {
                record_id: record.id.clone(),
                photo_index: p,
                exact: true,
            });
        }
    }

    for (c, (_, record, identifier)) in candidates.iter().enumerate() {
        if served[c] {
            continue;
        }
        let best = photo_ids
            .iter()
            .enumerate()
            .filter(|(p, photo_id)| !claimed[*p] && !photo_id.is_empty())
            .filter_map(|(p, photo_id)| substring_distance(identifier, photo_id).map(|d| (d, p)))
            .min();
        if let Some((_, p)) = best {
            claimed[p] = true;
            matches.push(PhotoMatch {
                record_id: record.id.clone(),
                photo_index: p,
                exact: false,
            });
        }
    }
    matches
}

/// Link matched photos to their records and drop them from the pending set.
///
/// Returns the number of new matches; `0` means nothing changed.
pub fn apply_matches(records: &mut [Record], photos: &mut Vec<PhotoMapping>) -> usize {
    if records.is_empty() || photos.is_empty() {
        return 0;
    }
    let matches = find_matches(records, photos);
    if matches.is_empty() {
        return 0;
    }

    for m in &matches {
        if let Some(record) = records.iter_mut().find(|r| r.id == m.record_id) {
            debug!(
                "Photo '{}' matched row {}",
                photos[m.photo_index].file_name, record.row_index
            );
            record.profile_photo = Some(photos[m.photo_index].image.clone());
            record.photo_matched = true;
            record.reset_status();
        }
    }

    let mut consumed: Vec<usize> = matches.iter().map(|m| m.photo_index).collect();
    consumed.sort_unstable();
    for index in consumed.into_iter().rev() {
        photos.remove(index);
    }
    matches.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::field::{Category, FieldKey};

    fn record(row: usize, roll: &str) -> Record {
        let mut r = Record::new(format!("r{row}"), row, Category::School.default_fields());
        r.field_mut(FieldKey::Name).unwrap().value = format!("Person {row}");
        r.field_mut(FieldKey::RollNo).unwrap().value = roll.to_string();
        r
    }

    fn photo(file: &str) -> PhotoMapping {
        PhotoMapping::from_file_name(file, format!("data:{file}"))
    }

    #[test]
    fn test_substring_match_both_ways() {
        let mut records = vec![record(1, "S001"), record(2, "long-id-42")];
        let mut photos = vec![photo("s001_front.jpg"), photo("42.png")];
        assert_eq!(apply_matches(&mut records, &mut photos), 2);
        assert_eq!(records[0].profile_photo.as_deref(), Some("data:s001_front.jpg"));
        assert_eq!(records[1].profile_photo.as_deref(), Some("data:42.png"));
        assert!(records.iter().all(|r| r.photo_matched));
        assert!(photos.is_empty());
    }

    #[test]
    fn test_existing_photo_never_overwritten() {
        let mut manual = record(1, "S001");
        manual.profile_photo = Some("manual.png".into());
        let mut records = vec![manual];
        let mut photos = vec![photo("S001.jpg")];
        assert_eq!(apply_matches(&mut records, &mut photos), 0);
        assert_eq!(records[0].profile_photo.as_deref(), Some("manual.png"));
        assert!(!records[0].photo_matched);
        assert_eq!(photos.len(), 1);
    }

    #[test]
    fn test_record_without_identifier_is_skipped() {
        let mut records = vec![record(1, "")];
        let mut photos = vec![photo("anything.jpg")];
        assert_eq!(apply_matches(&mut records, &mut photos), 0);
    }

    #[test]
    fn test_exact_beats_substring() {
        let records = vec![record(1, "S1")];
        let photos = vec![photo("S10.jpg"), photo("s1.jpg")];
        let matches = find_matches(&records, &photos);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].photo_index, 1);
        assert!(matches[0].exact);
    }

    #[test]
    fn test_lowest_row_claims_shared_photo() {
        let records = vec![record(5, "A1"), record(2, "A1")];
        let photos = vec![photo("A1.jpg")];
        let matches = find_matches(&records, &photos);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].record_id, "r2");
    }

    #[test]
    fn test_exact_match_wins_over_lower_row_substring() {
        let mut records = vec![record(1, "R1"), record(2, "R10")];
        let mut photos = vec![photo("R10.jpg")];
        assert_eq!(apply_matches(&mut records, &mut photos), 1);
        assert_eq!(records[0].profile_photo, None);
        assert_eq!(records[1].profile_photo.as_deref(), Some("data:R10.jpg"));

        let mut later = vec![photo("R1.jpg")];
        assert_eq!(apply_matches(&mut records, &mut later), 1);
        assert_eq!(records[0].profile_photo.as_deref(), Some("data:R1.jpg"));
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut records = vec![record(1, "R100"), record(2, "R101")];
        let mut photos = vec![photo("R100.jpg")];
        assert_eq!(apply_matches(&mut records, &mut photos), 1);
        let snapshot = records.clone();
        assert_eq!(apply_matches(&mut records, &mut photos), 0);
        assert_eq!(records, snapshot);
    }

    #[test]
    fn test_empty_photo_identifier_matches_nothing() {
        let records = vec![record(1, "R1")];
        let photos = vec![PhotoMapping {
            identifier: "  ".into(),
            image: "x".into(),
            file_name: ".png".into(),
        }];
        assert!(find_matches(&records, &photos).is_empty());
    }
}
