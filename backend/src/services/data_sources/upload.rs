use crate::error::BulkError;
use actix_multipart::Multipart;
use futures_util::StreamExt;

/// One file part of a multipart upload.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Read every part that carries a file name. Other parts are drained and ignored.
///
/// Files larger than `max_bytes` fail the whole upload.
pub async fn collect_files(
    mut payload: Multipart,
    max_bytes: usize,
) -> Result<Vec<UploadedFile>, BulkError> {
    let mut files = Vec::new();

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()));

        let Some(file_name) = file_name else {
            while let Some(chunk) = field.next().await {
                chunk?;
            }
            continue;
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            bytes.extend_from_slice(&chunk?);
            if bytes.len() > max_bytes {
                return Err(BulkError::Upload(format!(
                    "'{}' exceeds the {} MB upload limit",
                    file_name,
                    max_bytes / (1024 * 1024)
                )));
            }
        }
        files.push(UploadedFile { file_name, bytes });
    }

    Ok(files)
}
