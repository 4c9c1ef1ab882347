/// Error types shared by the processing pipeline and the state machine.
///
/// Every failure that can end a watermark removal attempt is a
/// `RemovalError`. The session stores its `Display` text as the message
/// shown next to the retry button.

/// Errors that can end a watermark removal attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemovalError {
    /// Neither a saved credential nor an environment fallback is available.
    /// Raised before any network activity.
    #[error("No API key configured. Open Settings and add your Google Gemini API key.")]
    MissingCredential,

    /// The API rejected the credential (authorization failure or a
    /// key-related error message).
    #[error("The API key is invalid or has expired. Please check Settings.")]
    InvalidCredential,

    /// The API answered but no candidate carried an inline image.
    #[error("No image data received from Gemini.")]
    NoImageReturned,

    /// The picked file could not be read back for upload.
    #[error("Failed to read the image file: {0}")]
    FileRead(String),

    /// Any other failure reported by the API or the HTTP layer.
    #[error("{message}")]
    Api {
        /// HTTP status, when the failure came with one.
        status: Option<u16>,
        /// Underlying message, passed through unchanged.
        message: String,
    },

    /// The returned payload was not valid base64 image data.
    #[error("Failed to decode the returned image: {0}")]
    Decode(String),
}

impl RemovalError {
    /// Whether this failure should bring up the settings dialog.
    pub fn is_credential_related(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::InvalidCredential)
    }
}

/// A specialized `Result` type for removal attempts.
pub type Result<T> = std::result::Result<T, RemovalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_related_variants() {
        assert!(RemovalError::MissingCredential.is_credential_related());
        assert!(RemovalError::InvalidCredential.is_credential_related());
        assert!(!RemovalError::NoImageReturned.is_credential_related());
        assert!(!RemovalError::FileRead("gone".into()).is_credential_related());
    }

    #[test]
    fn test_api_error_passes_message_through() {
        let err = RemovalError::Api {
            status: Some(500),
            message: "Internal error encountered.".into(),
        };
        assert_eq!(err.to_string(), "Internal error encountered.");

        let read = RemovalError::FileRead("permission denied".into());
        assert!(read.to_string().contains("permission denied"));
    }
}
