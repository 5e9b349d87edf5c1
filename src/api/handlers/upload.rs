//! Multipart parsing shared by the create/update upload endpoints.
//!
//! The upload contract is a `data` part holding a JSON document plus at
//! most one named file part (`qr_code` or `payment_screenshot`).

use axum::extract::Multipart;
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::blob::UploadedFile;
use crate::error::ApiError;

/// Walks the multipart body, extracting the `data` text part and the
/// named file part. Unknown parts are ignored.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] on a malformed multipart stream or
/// an unreadable file part.
pub(crate) async fn split_upload(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<(Option<String>, Option<UploadedFile>), ApiError> {
    let mut data = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("data") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(format!("unreadable data field: {e}")))?;
                data = Some(text);
            }
            Some(n) if n == file_field => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes: Bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("unreadable file field: {e}")))?;
                file = Some(UploadedFile {
                    bytes,
                    content_type,
                    filename,
                });
            }
            _ => {}
        }
    }

    Ok((data, file))
}

/// Deserializes the `data` part into `T`.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] when the part is missing or does
/// not parse as the expected document.
pub(crate) fn parse_data<T: DeserializeOwned>(
    data: Option<String>,
    what: &str,
) -> Result<T, ApiError> {
    let raw = data.ok_or_else(|| {
        ApiError::Validation(format!("missing 'data' field in {what} payload"))
    })?;
    serde_json::from_str(&raw).map_err(|_| ApiError::Validation(format!("invalid {what} data format")))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Probe {
        title: String,
    }

    #[test]
    fn parse_data_rejects_missing_part() {
        let result: Result<Probe, _> = parse_data(None, "event");
        let Err(err) = result else {
            panic!("expected validation error");
        };
        assert!(err.to_string().contains("missing 'data' field"));
    }

    #[test]
    fn parse_data_rejects_malformed_json() {
        let result: Result<Probe, _> = parse_data(Some("{not json".to_string()), "event");
        let Err(err) = result else {
            panic!("expected validation error");
        };
        assert!(err.to_string().contains("invalid event data format"));
    }

    #[test]
    fn parse_data_accepts_valid_json() {
        let result: Result<Probe, _> =
            parse_data(Some(r#"{"title":"Meetup"}"#.to_string()), "event");
        let Ok(probe) = result else {
            panic!("expected parse success");
        };
        assert_eq!(probe.title, "Meetup");
    }
}
