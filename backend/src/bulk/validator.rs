//! Pre-export sync-check.
//!
//! A blank `name` is an error and blocks the export; a missing photo is only a
//! warning. Records are checked in parallel, results are reported in stored order.
//! "Row N" is the 1-based position in the stored list, which stays unique across
//! additive imports.

use common::model::field::FieldKey;
use common::model::record::Record;
use common::model::validation::ValidationResult;
use rayon::prelude::*;

struct RecordCheck {
    error: Option<String>,
    warning: Option<String>,
    has_photo: bool,
}

fn check_record(position: usize, record: &Record) -> RecordCheck {
    let error = record
        .value(FieldKey::Name)
        .is_empty()
        .then(|| format!("Row {position}: Missing name"));
    let has_photo = record.has_photo();
    let warning = (!has_photo).then(|| format!("Row {position}: No photo"));
    RecordCheck {
        error,
        warning,
        has_photo,
    }
}

/// Validate every record. The full lists are always returned, valid or not.
pub fn validate(records: &[Record]) -> ValidationResult {
    let checks: Vec<RecordCheck> = records
        .par_iter()
        .enumerate()
        .map(|(i, record)| check_record(i + 1, record))
        .collect();

    let mut result = ValidationResult {
        records_validated: records.len(),
        ..Default::default()
    };
    for check in checks {
        if check.has_photo {
            result.photos_matched += 1;
        } else {
            result.photos_missing += 1;
        }
        result.errors.extend(check.error);
        result.warnings.extend(check.warning);
    }
    result.is_valid = result.errors.is_empty();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::field::Category;

    fn record(row: usize, name: &str, photo: Option<&str>) -> Record {
        let mut r = Record::new(format!("r{row}"), row, Category::School.default_fields());
        r.field_mut(FieldKey::Name).unwrap().value = name.to_string();
        r.profile_photo = photo.map(str::to_string);
        r
    }

    #[test]
    fn test_blank_name_is_an_error() {
        let result = validate(&[record(1, "Asha", Some("p")), record(2, "  ", Some("p"))]);
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["Row 2: Missing name".to_string()]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_photo_is_a_warning() {
        let result = validate(&[record(1, "Asha", Some("p")), record(2, "Ben", None)]);
        assert!(result.is_valid);
        assert_eq!(result.warnings, vec!["Row 2: No photo".to_string()]);
        assert_eq!(result.photos_matched, 1);
        assert_eq!(result.photos_missing, 1);
        assert_eq!(result.records_validated, 2);
    }

    #[test]
    fn test_order_follows_records() {
        let records: Vec<Record> = (1..=200).map(|i| record(i, "", None)).collect();
        let result = validate(&records);
        let expected: Vec<String> = (1..=200).map(|i| format!("Row {i}: Missing name")).collect();
        assert_eq!(result.errors, expected);
    }

    #[test]
    fn test_rows_are_numbered_across_imports() {
        // Two imports both start their row_index at 1.
        let records = vec![
            record(1, "Asha", Some("p")),
            record(2, "Ben", Some("p")),
            record(1, "", Some("p")),
            record(2, "Dev", None),
        ];
        let result = validate(&records);
        assert_eq!(result.errors, vec!["Row 3: Missing name".to_string()]);
        assert_eq!(result.warnings, vec!["Row 4: No photo".to_string()]);
    }

    #[test]
    fn test_empty_set_is_valid() {
        let result = validate(&[]);
        assert!(result.is_valid);
        assert_eq!(result.records_validated, 0);
    }
}
