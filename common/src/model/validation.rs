use serde::{Deserialize, Serialize};

/// Snapshot produced by the pre-export sync-check. Recomputed on every attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub records_validated: usize,
    pub photos_matched: usize,
    pub photos_missing: usize,
}

/// What is shown to the user: every line when the list is short, a count otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationNotice {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub hidden_errors: usize,
    pub hidden_warnings: usize,
}

impl ValidationResult {
    /// Condense the result for display, listing at most `limit` lines per kind.
    pub fn notice(&self, limit: usize) -> ValidationNotice {
        let (errors, hidden_errors) = surface(&self.errors, limit, |n| {
            format!("{n} rows have errors")
        });
        let (warnings, hidden_warnings) = surface(&self.warnings, limit, |n| {
            format!("{n} records are missing photos")
        });
        ValidationNotice {
            errors,
            warnings,
            hidden_errors,
            hidden_warnings,
        }
    }
}

fn surface(
    lines: &[String],
    limit: usize,
    summary: impl Fn(usize) -> String,
) -> (Vec<String>, usize) {
    if lines.len() <= limit {
        (lines.to_vec(), 0)
    } else {
        (vec![summary(lines.len())], lines.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_warnings(n: usize) -> ValidationResult {
        ValidationResult {
            is_valid: true,
            warnings: (1..=n).map(|i| format!("Row {i}: No photo")).collect(),
            records_validated: n,
            photos_missing: n,
            ..Default::default()
        }
    }

    #[test]
    fn test_short_lists_are_listed() {
        let notice = result_with_warnings(3).notice(5);
        assert_eq!(notice.warnings.len(), 3);
        assert_eq!(notice.hidden_warnings, 0);
    }

    #[test]
    fn test_long_lists_are_counted() {
        let notice = result_with_warnings(12).notice(5);
        assert_eq!(notice.warnings, vec!["12 records are missing photos".to_string()]);
        assert_eq!(notice.hidden_warnings, 12);
        assert!(notice.errors.is_empty());
    }
}
