//! Spreadsheet import: CSV and XLS/XLSX files into `Record`s.
//!
//! Both formats are first reduced to a grid of string cells. The header row is
//! normalized (trimmed, unquoted, lower-cased) and matched against the category's
//! field keys and labels; the remaining rows become records that always carry the
//! category's full field set, whether or not a column was found for each field.

use crate::error::ImportError;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use common::model::field::{Category, FieldKey};
use common::model::record::Record;
use log::{debug, info};
use std::io::Cursor;
use uuid::Uuid;

/// Header fragments that mark the identifier column.
const IDENTIFIER_HEADERS: &[&str] = &[
    "student_id",
    "studentid",
    "roll",
    "enrollment",
    "employee_id",
    "employeeid",
];

/// Header fragments that mark an inline photo column.
const PHOTO_HEADERS: &[&str] = &["photo", "image", "picture"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Result<Self, ImportError> {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xls" => Ok(Self::Workbook),
            _ => Err(ImportError::UnsupportedExtension(file_name.to_string())),
        }
    }
}

/// Parse an uploaded file into records for `category`.
pub fn parse_file(
    file_name: &str,
    bytes: &[u8],
    category: Category,
) -> Result<Vec<Record>, ImportError> {
    let rows = match SourceFormat::from_file_name(file_name)? {
        SourceFormat::Csv => read_csv_rows(bytes)?,
        SourceFormat::Workbook => read_workbook_rows(bytes)?,
    };
    let records = records_from_rows(&rows, category)?;
    info!(
        "Parsed {} record(s) from '{}' ({} row(s))",
        records.len(),
        file_name,
        rows.len()
    );
    Ok(records)
}

/// Pick the most frequent delimiter in the header line, `,` when none occurs.
pub fn detect_delimiter(header_line: &str) -> u8 {
    let mut best = (b',', 0usize);
    for d in [b',', b';', b'\t', b'|'] {
        let count = header_line.bytes().filter(|b| *b == d).count();
        if count > best.1 {
            best = (d, count);
        }
    }
    best.0
}

/// Trim a cell, drop one pair of surrounding quotes and non-breaking spaces.
pub fn normalize_cell(cell: &str) -> String {
    let s = cell.trim();
    let s = s
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(s);
    s.replace('\u{00A0}', " ").trim().to_string()
}

/// Tokenize CSV text into rows. Quoted fields may contain the delimiter and
/// line breaks; rows may have differing lengths.
pub fn read_csv_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, ImportError> {
    let text = std::str::from_utf8(bytes).map_err(|_| ImportError::Encoding)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let delimiter = detect_delimiter(text.lines().next().unwrap_or_default());

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ImportError::Malformed(e.to_string()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Read the first worksheet of an XLS/XLSX workbook.
pub fn read_workbook_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::Workbook(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::Workbook("the workbook has no sheets".to_string()))?
        .map_err(|e| ImportError::Workbook(e.to_string()))?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

/// Lower-case and remove whitespace, `_` and `-` for loose header comparison.
fn compact(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn header_matches(header: &str, key: FieldKey) -> bool {
    let key_name = key.as_str().to_lowercase();
    let label = key.default_label().to_lowercase();
    if header == key_name || header == label {
        return true;
    }
    let header = compact(header);
    !header.is_empty() && (header == compact(&key_name) || header == compact(&label))
}

/// Which column feeds which field, resolved once per file from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub fields: Vec<(FieldKey, Option<usize>)>,
    pub identifier: Option<usize>,
    pub photo: Option<usize>,
}

impl ColumnMapping {
    /// `headers` must already be normalized and lower-cased.
    pub fn from_headers(headers: &[String], category: Category) -> Self {
        let fields = category
            .field_keys()
            .iter()
            .map(|key| (*key, headers.iter().position(|h| header_matches(h, *key))))
            .collect();
        let identifier = headers
            .iter()
            .position(|h| h == "id" || IDENTIFIER_HEADERS.iter().any(|frag| h.contains(frag)));
        let photo = headers
            .iter()
            .position(|h| PHOTO_HEADERS.iter().any(|frag| h.contains(frag)));
        Self {
            fields,
            identifier,
            photo,
        }
    }

    fn build_record(&self, row_index: usize, row: &[String], category: Category) -> Record {
        let cell = |col: usize| row.get(col).map(|c| normalize_cell(c)).unwrap_or_default();

        let mut fields = category.default_fields();
        for (key, column) in &self.fields {
            if let (Some(col), Some(field)) = (column, fields.iter_mut().find(|f| f.key == *key))
            {
                field.value = cell(*col);
            }
        }

        if let Some(col) = self.identifier {
            let value = cell(col);
            if let Some(field) = fields.iter_mut().find(|f| f.key.is_identifier()) {
                if field.value.is_empty() && !value.is_empty() {
                    field.value = value;
                }
            }
        }

        let mut record = Record::new(Uuid::new_v4().to_string(), row_index, fields);
        if let Some(col) = self.photo {
            let photo = cell(col);
            if !photo.is_empty() {
                record.profile_photo = Some(photo);
            }
        }
        record
    }
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Turn a header + data grid into records. Row indices are 1-based data rows.
pub fn records_from_rows(
    rows: &[Vec<String>],
    category: Category,
) -> Result<Vec<Record>, ImportError> {
    if rows.len() < 2 {
        return Err(ImportError::TooFewRows);
    }

    let headers: Vec<String> = rows[0]
        .iter()
        .map(|h| normalize_cell(h).to_lowercase())
        .collect();
    let mapping = ColumnMapping::from_headers(&headers, category);
    debug!("Column mapping for {}: {:?}", category.as_str(), mapping);

    let records: Vec<Record> = rows
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| !is_blank_row(row))
        .map(|(index, row)| mapping.build_record(index, row, category))
        .collect();

    if records.is_empty() {
        return Err(ImportError::NoRecords);
    }
    Ok(records)
}
