/// Remote processing client
///
/// One watermark removal request is one round trip to Gemini:
/// 1. Refuse early when no credential is available
/// 2. Read the picked file and base64-encode it
/// 3. Send the image and the prompt in a single `generateContent` call
/// 4. Return the first inline image as a PNG data URL
///
/// There is no retry, timeout or streaming here; retrying is a user action.

pub mod gemini;
pub mod prompt;

use base64::Engine as _;
use tracing::{debug, error, info};

use crate::error::{RemovalError, Result};
use crate::state::data::{ProcessedImage, PNG_DATA_URL_PREFIX};
use crate::state::session::Job;
use crate::state::settings::Credential;
use gemini::{GenerateContentRequest, GenerateContentResponse, Transport, TransportFailure};

/// Run one removal request.
///
/// `connect` builds the transport for the job's credential. It is only
/// called once the credential is known to be present.
pub async fn remove_watermark<T, F>(job: Job, connect: F) -> Result<ProcessedImage>
where
    T: Transport,
    F: FnOnce(Credential) -> T,
{
    let credential = job.credential.ok_or(RemovalError::MissingCredential)?;

    let bytes = tokio::fs::read(&job.path).await.map_err(|e| {
        error!("Failed to read {}: {}", job.path.display(), e);
        RemovalError::FileRead(e.to_string())
    })?;
    let payload = base64::engine::general_purpose::STANDARD.encode(&bytes);

    let request = GenerateContentRequest::image_edit(
        &job.mime_type,
        payload,
        prompt::build(Some(job.instruction.as_str())),
    );

    info!(
        "📤 Sending {:.1}KB {} to Gemini",
        bytes.len() as f64 / 1024.0,
        job.mime_type
    );

    let client = connect(credential);
    let response = client.generate(request).await.map_err(|failure| {
        error!("Gemini API error: {:?}", failure);
        normalize(failure)
    })?;

    let data_url = to_data_url(&response)?;
    ProcessedImage::from_data_url(data_url)
}

/// Wrap the first inline image of `response` as a PNG data URL.
pub fn to_data_url(response: &GenerateContentResponse) -> Result<String> {
    match response.first_inline_image() {
        Some(data) => Ok(format!("{}{}", PNG_DATA_URL_PREFIX, data)),
        None => {
            debug!("Response carried no image, text was: {:?}", response.text());
            Err(RemovalError::NoImageReturned)
        }
    }
}

/// Map a transport failure onto the error taxonomy.
///
/// Authorization statuses and any message mentioning the API key become
/// `InvalidCredential`, whatever the exact wording.
pub fn normalize(failure: TransportFailure) -> RemovalError {
    let mentions_key = failure.message.to_lowercase().contains("api key");
    let denied = matches!(failure.status, Some(401) | Some(403));

    if mentions_key || denied {
        return RemovalError::InvalidCredential;
    }

    let message = if failure.message.trim().is_empty() {
        "Failed to process image.".to_string()
    } else {
        failure.message
    };

    RemovalError::Api {
        status: failure.status,
        message,
    }
}
