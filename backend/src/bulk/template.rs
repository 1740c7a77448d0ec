//! Downloadable CSV template for a category.

use common::model::field::{Category, FieldKey};

/// Header of the leading identifier column.
const ID_HEADER: &str = "ID";
const ID_SAMPLE: &str = "1001";

fn sample_value(key: FieldKey) -> &'static str {
    match key {
        FieldKey::Name => "John Doe",
        FieldKey::Dob => "2005-01-15",
        FieldKey::Phone => "+91 9876543210",
        FieldKey::BloodGroup => "O+",
        _ => "",
    }
}

/// Header row (`ID` + field labels) and one example row for `category`.
pub fn build_template(category: Category) -> Result<Vec<u8>, csv::Error> {
    let keys = category.field_keys();
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(
        std::iter::once(ID_HEADER).chain(keys.iter().map(|k| k.default_label())),
    )?;
    writer.write_record(std::iter::once(ID_SAMPLE).chain(keys.iter().map(|k| sample_value(*k))))?;

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

pub fn template_file_name(category: Category) -> String {
    format!("{}_template.csv", category.as_str())
}
