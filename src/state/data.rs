/// Shared data structures for the application state
///
/// These structs represent the images that flow between the picker, the
/// remote client and the UI layer.
use base64::Engine as _;
use iced::widget::image::Handle;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::RemovalError;

/// Prefix of every processed result handed to the UI.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// The image the user picked.
///
/// Holds the bytes read when the file was accepted, so the original renders
/// without reading the file again. There is exactly one per session; dropping it releases
/// the handle.
#[derive(Debug)]
pub struct SourceImage {
    path: PathBuf,
    /// Filename only (e.g., "holiday.jpg")
    pub file_name: String,
    /// Declared media type, always starting with `image/`
    pub mime_type: String,
    /// Pixel dimensions probed from the file header
    pub width: u32,
    pub height: u32,
    /// Render handle for the original, keyed per pick rather than by path
    pub handle: Handle,
}

impl SourceImage {
    pub fn new(
        path: PathBuf,
        mime_type: String,
        (width, height): (u32, u32),
        bytes: Vec<u8>,
    ) -> Self {
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let handle = Handle::from_bytes(bytes);

        debug!("📎 Acquired local image {} ({}x{})", file_name, width, height);

        Self {
            path,
            file_name,
            mime_type,
            width,
            height,
            handle,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SourceImage {
    fn drop(&mut self) {
        debug!("🗑️  Released local image {}", self.file_name);
    }
}

/// A fully formed result returned by the remote client.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// `data:image/png;base64,...` as received
    pub data_url: String,
    /// Decoded image bytes, written out on download
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Render handle for the result
    pub handle: Handle,
}

impl ProcessedImage {
    /// Decode a PNG data URL into a displayable image.
    pub fn from_data_url(data_url: String) -> Result<Self, RemovalError> {
        let payload = data_url
            .strip_prefix(PNG_DATA_URL_PREFIX)
            .ok_or_else(|| RemovalError::Decode("not a PNG data URL".to_string()))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| RemovalError::Decode(e.to_string()))?;

        let (width, height) = image::ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| RemovalError::Decode(e.to_string()))?
            .into_dimensions()
            .map_err(|e| RemovalError::Decode(e.to_string()))?;

        let handle = Handle::from_bytes(bytes.clone());

        Ok(Self {
            data_url,
            bytes,
            width,
            height,
            handle,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encode a small PNG for fixtures
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    pub(crate) fn png_data_url(width: u32, height: u32) -> String {
        format!(
            "{}{}",
            PNG_DATA_URL_PREFIX,
            base64::engine::general_purpose::STANDARD.encode(png_bytes(width, height))
        )
    }

    #[test]
    fn test_processed_image_from_data_url() {
        let processed = ProcessedImage::from_data_url(png_data_url(8, 5)).unwrap();
        assert_eq!((processed.width, processed.height), (8, 5));
        assert!(processed.data_url.starts_with(PNG_DATA_URL_PREFIX));
        assert_eq!(&processed.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_processed_image_rejects_bad_payload() {
        let err = ProcessedImage::from_data_url("data:image/png;base64,@@@".into()).unwrap_err();
        assert!(matches!(err, RemovalError::Decode(_)));

        let err = ProcessedImage::from_data_url("https://example.com/a.png".into()).unwrap_err();
        assert!(matches!(err, RemovalError::Decode(_)));
    }

    #[test]
    fn test_source_image_file_name() {
        let source = SourceImage::new(
            PathBuf::from("/tmp/photos/holiday.jpg"),
            "image/jpeg".into(),
            (640, 480),
            Vec::new(),
        );
        assert_eq!(source.file_name, "holiday.jpg");
        assert_eq!(source.path(), Path::new("/tmp/photos/holiday.jpg"));
    }

    #[test]
    fn test_repicked_path_gets_fresh_handle() {
        let path = PathBuf::from("/tmp/photos/edited.png");
        let before = SourceImage::new(path.clone(), "image/png".into(), (2, 2), png_bytes(2, 2));
        let after = SourceImage::new(path, "image/png".into(), (3, 3), png_bytes(3, 3));

        assert_ne!(before.handle.id(), after.handle.id());
    }
}
