use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use thiserror::Error;

/// Declared content types accepted on `/predict`.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/jpg"];

const FILE_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn has_allowed_type(&self) -> bool {
        self.content_type
            .as_deref()
            .map_or(false, |ct| ALLOWED_CONTENT_TYPES.contains(&ct))
    }
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Malformed multipart body: {0}")]
    Multipart(String),

    #[error("Upload exceeds {0} bytes")]
    TooLarge(usize),
}

/// Reads the `file` part of a multipart form, or the first part carrying a
/// filename when no field has that name. Returns `None` if the form holds no
/// file at all.
pub async fn read_upload(
    mut payload: Multipart,
    limit: usize,
) -> Result<Option<UploadedImage>, UploadError> {
    let mut fallback: Option<UploadedImage> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| UploadError::Multipart(e.to_string()))?
    {
        let is_file_field = field.name() == FILE_FIELD;
        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_string);

        if !is_file_field && (filename.is_none() || fallback.is_some()) {
            continue;
        }

        let content_type = field.content_type().map(|m| m.essence_str().to_string());
        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| UploadError::Multipart(e.to_string()))?
        {
            if bytes.len() + chunk.len() > limit {
                return Err(UploadError::TooLarge(limit));
            }
            bytes.extend_from_slice(&chunk);
        }

        let upload = UploadedImage {
            filename: filename.unwrap_or_default(),
            content_type,
            bytes,
        };
        if is_file_field {
            return Ok(Some(upload));
        }
        fallback = Some(upload);
    }

    Ok(fallback)
}
