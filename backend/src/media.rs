//! Inline image references (`data:` URLs) and photo file types.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Photo extensions accepted for upload.
pub const PHOTO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

pub fn is_photo_file(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| PHOTO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Encode `bytes` as a `data:` URL, guessing the mime type from `file_name`.
pub fn data_url_for_file(file_name: &str, bytes: &[u8]) -> String {
    let mime = mime_guess::from_path(file_name).first_or_octet_stream();
    to_data_url(mime.essence_str(), bytes)
}

pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Decode a base64 `data:` URL. `None` when `reference` is not a data URL.
pub fn decode_data_url(reference: &str) -> Option<Result<Vec<u8>, base64::DecodeError>> {
    let rest = reference.trim().strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if !meta.ends_with(";base64") {
        return None;
    }
    Some(BASE64.decode(payload.trim()))
}
