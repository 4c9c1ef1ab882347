/// Image picker: native file dialog and drag-and-drop validation
///
/// A file is accepted only when its declared media type starts with
/// `image/`. Desktop files carry no declared type, so it is inferred from
/// the extension, the way a browser fills in `File.type`.
use image::ImageFormat;
use rfd::FileDialog;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::state::data::SourceImage;

/// Extensions offered by the file dialog
pub const DIALOG_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

/// Why a file was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Please choose an image file (JPG, PNG, WEBP). \"{file_name}\" is not one.")]
    NotAnImage { file_name: String },

    #[error("Could not open \"{file_name}\": {reason}")]
    Unreadable { file_name: String, reason: String },
}

/// A validated pick, ready to become the session's source image
#[derive(Debug, Clone, PartialEq)]
pub struct PickedFile {
    pub path: PathBuf,
    pub mime_type: String,
    pub dimensions: (u32, u32),
    /// File contents as read at accept time
    pub bytes: Vec<u8>,
}

impl PickedFile {
    pub fn into_source(self) -> SourceImage {
        SourceImage::new(self.path, self.mime_type, self.dimensions, self.bytes)
    }
}

/// Media type declared by the file name, if the extension is known.
pub fn declared_mime(path: &Path) -> Option<&'static str> {
    ImageFormat::from_path(path).ok().map(|format| format.to_mime_type())
}

/// Validate one offered file.
pub fn accept(path: &Path) -> Result<PickedFile, Rejection> {
    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let mime_type = match declared_mime(path) {
        Some(mime) if mime.starts_with("image/") => mime,
        other => {
            debug!("Rejected {} (declared type {:?})", file_name, other);
            return Err(Rejection::NotAnImage { file_name });
        }
    };

    let unreadable = |reason: String| Rejection::Unreadable {
        file_name: file_name.clone(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|e| unreadable(e.to_string()))?;

    // Header-only probe, the pixels are never decoded here
    let dimensions = image::ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .map_err(|e| unreadable(e.to_string()))?
        .into_dimensions()
        .map_err(|e| unreadable(e.to_string()))?;

    info!("📂 Accepted {} as {} ({}x{})", file_name, mime_type, dimensions.0, dimensions.1);

    Ok(PickedFile {
        path: path.to_path_buf(),
        mime_type: mime_type.to_string(),
        dimensions,
        bytes,
    })
}

/// Show the native open dialog. Returns at most one file.
pub fn pick_with_dialog() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Choose an image")
        .add_filter("Images", &DIALOG_EXTENSIONS)
        .pick_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::tests::png_bytes;

    #[test]
    fn test_declared_mime() {
        assert_eq!(declared_mime(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(declared_mime(Path::new("b.jpeg")), Some("image/jpeg"));
        assert_eq!(declared_mime(Path::new("c.webp")), Some("image/webp"));
        assert_eq!(declared_mime(Path::new("notes.txt")), None);
        assert_eq!(declared_mime(Path::new("no_extension")), None);
    }

    #[test]
    fn test_accepts_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, png_bytes(12, 7)).unwrap();

        let picked = accept(&path).unwrap();
        assert_eq!(picked.mime_type, "image/png");
        assert_eq!(picked.dimensions, (12, 7));
        assert_eq!(picked.bytes, png_bytes(12, 7));

        let source = picked.into_source();
        assert_eq!(source.file_name, "photo.png");
        assert_eq!((source.width, source.height), (12, 7));
    }

    #[test]
    fn test_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let err = accept(&path).unwrap_err();
        assert_eq!(
            err,
            Rejection::NotAnImage {
                file_name: "report.pdf".into()
            }
        );
        assert!(err.to_string().contains("Please choose an image file"));
    }

    #[test]
    fn test_rejects_corrupt_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        assert!(matches!(accept(&path), Err(Rejection::Unreadable { .. })));
    }

    #[test]
    fn test_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.jpg");

        assert!(matches!(accept(&path), Err(Rejection::Unreadable { .. })));
    }
}
