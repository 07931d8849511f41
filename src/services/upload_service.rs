//! Product image uploads stored on disk and served under `/uploads`.

use std::{
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use tokio::fs;
use tracing::{debug, warn};

use crate::error::ServiceError;

/// URL prefix under which the upload directory is served.
pub const UPLOAD_URL_PREFIX: &str = "/uploads";
const FALLBACK_FILE_NAME: &str = "image";

/// Image part extracted from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Client-supplied file name.
    pub file_name: String,
    /// Raw file content; never inspected.
    pub bytes: Vec<u8>,
}

/// Write `upload` into `dir` as `<unix-millis>-<sanitized name>` and return its public URL.
pub async fn store_image(dir: &Path, upload: &ImageUpload) -> Result<String, ServiceError> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let file_name = format!("{millis}-{}", sanitize_file_name(&upload.file_name));

    fs::create_dir_all(dir).await.map_err(|err| {
        ServiceError::Internal(format!("cannot create upload directory: {err}"))
    })?;
    fs::write(dir.join(&file_name), &upload.bytes)
        .await
        .map_err(|err| ServiceError::Internal(format!("cannot store upload: {err}")))?;

    debug!(file = %file_name, size = upload.bytes.len(), "stored product image");
    Ok(format!("{UPLOAD_URL_PREFIX}/{file_name}"))
}

/// Best-effort removal of an image written by [`store_image`]. URLs outside
/// the upload directory are left alone.
pub async fn discard_image(dir: &Path, url: &str) {
    let Some(file_name) = url.strip_prefix(&format!("{UPLOAD_URL_PREFIX}/")) else {
        return;
    };
    if file_name.is_empty() || file_name.contains(['/', '\\']) {
        return;
    }
    if let Err(err) = fs::remove_file(dir.join(file_name)).await {
        warn!(file = %file_name, error = %err, "failed to remove upload");
    }
}

/// Keep the last path component and replace anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_owned()
    } else {
        cleaned.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\golden mug.png"), "golden_mug.png");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "image");
        assert_eq!(sanitize_file_name("..."), "image");
    }

    #[tokio::test]
    async fn stored_image_is_written_and_referenced() {
        let dir = tempfile::tempdir().unwrap();
        let upload = ImageUpload {
            file_name: "mug.png".into(),
            bytes: vec![1, 2, 3],
        };

        let url = store_image(dir.path(), &upload).await.unwrap();
        let file_name = url.strip_prefix("/uploads/").unwrap();
        assert!(file_name.ends_with("-mug.png"));
        assert_eq!(std::fs::read(dir.path().join(file_name)).unwrap(), vec![1, 2, 3]);

        discard_image(dir.path(), &url).await;
        assert!(!dir.path().join(file_name).exists());
    }

    #[tokio::test]
    async fn discard_ignores_urls_outside_the_upload_dir() {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        std::fs::create_dir(&uploads).unwrap();
        std::fs::write(root.path().join("keep.txt"), b"x").unwrap();

        discard_image(&uploads, "/uploads/../keep.txt").await;
        discard_image(&uploads, "/elsewhere/keep.txt").await;
        assert!(root.path().join("keep.txt").exists());
    }
}
