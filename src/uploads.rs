use bytes::Bytes;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::storage::StorageClient;

/// Hard cap for a single uploaded image.
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// One JPEG per request, at most 2 MB. Checked against the actual bytes,
/// not the client-declared content type.
pub fn validate_jpeg(body: &Bytes) -> Result<(), ApiError> {
    if body.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::validation("image exceeds the 2 MB limit"));
    }
    if body.len() < JPEG_MAGIC.len() || body[..JPEG_MAGIC.len()] != JPEG_MAGIC {
        return Err(ApiError::validation("only JPEG images are accepted"));
    }
    Ok(())
}

/// Date-partitioned object key: `scope/YYYY/MM/DD/<uuid>.jpg`.
pub fn date_partitioned_key(scope: &str, now: OffsetDateTime) -> String {
    format!(
        "{}/{:04}/{:02}/{:02}/{}.jpg",
        scope,
        now.year(),
        u8::from(now.month()),
        now.day(),
        Uuid::new_v4().simple()
    )
}

/// Validate and persist one JPEG, returning the server-relative path it was
/// stored under.
pub async fn store_jpeg(
    storage: &dyn StorageClient,
    scope: &str,
    body: Bytes,
) -> Result<String, ApiError> {
    validate_jpeg(&body)?;
    let key = date_partitioned_key(scope, OffsetDateTime::now_utc());
    storage
        .store(&key, body, "image/jpeg")
        .await
        .map_err(ApiError::internal)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn jpeg_of_len(len: usize) -> Bytes {
        let mut buf = vec![0u8; len];
        buf[..3].copy_from_slice(&JPEG_MAGIC);
        Bytes::from(buf)
    }

    #[test]
    fn accepts_a_jpeg_at_the_size_limit() {
        assert!(validate_jpeg(&jpeg_of_len(MAX_UPLOAD_BYTES)).is_ok());
    }

    #[test]
    fn rejects_oversized_upload() {
        let err = validate_jpeg(&jpeg_of_len(MAX_UPLOAD_BYTES + 1)).unwrap_err();
        assert!(err.to_string().contains("2 MB"));
    }

    #[test]
    fn rejects_non_jpeg_bytes() {
        let png = Bytes::from_static(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]);
        assert!(validate_jpeg(&png).is_err());
        assert!(validate_jpeg(&Bytes::new()).is_err());
    }

    #[test]
    fn key_is_date_partitioned_with_zero_padding() {
        let key = date_partitioned_key("users", datetime!(2026-08-05 10:00 UTC));
        assert!(key.starts_with("users/2026/08/05/"));
        assert!(key.ends_with(".jpg"));
    }

    #[test]
    fn keys_are_unique_per_call() {
        let now = datetime!(2026-01-01 00:00 UTC);
        assert_ne!(
            date_partitioned_key("events", now),
            date_partitioned_key("events", now)
        );
    }
}
