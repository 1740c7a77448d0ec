use serde::{Deserialize, Serialize};

/// An uploaded photo waiting to be linked to a record.
///
/// `identifier` is the file name without its extension (`STU001_photo.jpg` ->
/// `STU001_photo`). Mappings are consumed once matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMapping {
    pub identifier: String,
    pub image: String,
    pub file_name: String,
}

impl PhotoMapping {
    pub fn from_file_name(file_name: &str, image: String) -> Self {
        Self {
            identifier: identifier_from_file_name(file_name),
            image,
            file_name: file_name.to_string(),
        }
    }
}

/// Strip any directory part and the last extension from an uploaded file name.
pub fn identifier_from_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();
    match base.rfind('.') {
        Some(dot) if dot > 0 => base[..dot].to_string(),
        _ => base.to_string(),
    }
}
