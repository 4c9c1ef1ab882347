/// Saving the processed image to disk
use chrono::Utc;
use rfd::FileDialog;
use std::path::PathBuf;
use tracing::info;

/// Errors raised while writing the download
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DownloadError {
    #[error("Failed to save {path}: {reason}")]
    Io { path: String, reason: String },
}

/// Download name for a result produced at `unix_ms`
pub fn file_name(unix_ms: i64) -> String {
    format!("removed-watermark-{}.png", unix_ms)
}

/// Download name stamped with the current time
pub fn default_file_name() -> String {
    file_name(Utc::now().timestamp_millis())
}

/// Show the native save dialog
pub fn choose_destination() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Save processed image")
        .set_file_name(default_file_name())
        .add_filter("PNG image", &["png"])
        .save_file()
}

/// Write the decoded image bytes to `path`
pub async fn save(bytes: Vec<u8>, path: PathBuf) -> Result<PathBuf, DownloadError> {
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| DownloadError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    info!("⬇️  Saved {:.1}KB to {}", bytes.len() as f64 / 1024.0, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_format() {
        assert_eq!(file_name(1_700_000_000_123), "removed-watermark-1700000000123.png");
    }

    #[test]
    fn test_default_file_name_uses_milliseconds() {
        let name = default_file_name();
        let stamp = name
            .strip_prefix("removed-watermark-")
            .and_then(|rest| rest.strip_suffix(".png"))
            .unwrap();
        assert!(stamp.parse::<i64>().unwrap() > 1_600_000_000_000);
    }

    #[tokio::test]
    async fn test_save_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(file_name(1));
        let saved = save(vec![1, 2, 3], path.clone()).await.unwrap();
        assert_eq!(saved, path);
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let err = save(vec![1], PathBuf::from("/nonexistent/dir/out.png"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dir/out.png"));
    }
}
