/// Gemini `generateContent` wire types and the reqwest transport
///
/// Only the fields this app reads or writes are modelled. Unknown fields
/// in responses are ignored.
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;

use crate::state::settings::Credential;

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Request body
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// One user turn: the inline image first, then the prompt.
    pub fn image_edit(mime_type: &str, base64_data: String, prompt: String) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: mime_type.to_string(),
                            data: base64_data,
                        }),
                        ..Part::default()
                    },
                    Part {
                        text: Some(prompt),
                        ..Part::default()
                    },
                ],
            }],
        }
    }

    /// The prompt text of the request, if any.
    pub fn prompt(&self) -> Option<&str> {
        self.contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .find_map(|p| p.text.as_deref())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One content part: text, inline data, or neither (thought signatures etc.)
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "inline_data")]
    pub inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default, alias = "mime_type")]
    pub mime_type: String,
    /// Base64 payload
    #[serde(default)]
    pub data: String,
}

/// Response body
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Base64 payload of the first inline image in the first candidate.
    pub fn first_inline_image(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .map(|d| d.data.as_str())
            .find(|data| !data.is_empty())
    }

    /// Text the model returned instead of (or next to) an image.
    pub fn text(&self) -> String {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Error body returned with non-2xx statuses
#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// A failed round trip, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub status: Option<u16>,
    pub message: String,
}

/// The seam between the removal pipeline and the network.
pub trait Transport {
    /// Issue one `generateContent` call.
    fn generate(
        &self,
        request: GenerateContentRequest,
    ) -> impl Future<Output = Result<GenerateContentResponse, TransportFailure>> + Send;
}

/// HTTP client for one credential.
///
/// The key is bound at construction; build a new client whenever the
/// credential may have changed.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    credential: Credential,
}

impl GeminiClient {
    pub fn new(api_base: &str, model: &str, credential: Credential) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint(api_base, model),
            credential,
        }
    }
}

/// `generateContent` URL for `model`
pub fn endpoint(api_base: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        api_base.trim_end_matches('/'),
        model
    )
}

impl Transport for GeminiClient {
    fn generate(
        &self,
        request: GenerateContentRequest,
    ) -> impl Future<Output = Result<GenerateContentResponse, TransportFailure>> + Send {
        let http = self.http.clone();
        let endpoint = self.endpoint.clone();
        let credential = self.credential.clone();
        let prompt_len = request.prompt().map_or(0, str::len);

        async move {
            debug!("POST {} ({} prompt chars)", endpoint, prompt_len);

            let response = http
                .post(&endpoint)
                .header(API_KEY_HEADER, credential.expose())
                .json(&request)
                .send()
                .await
                .map_err(|e| TransportFailure {
                    status: e.status().map(|s| s.as_u16()),
                    message: e.to_string(),
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(TransportFailure {
                    status: Some(status.as_u16()),
                    message: error_message(status.as_u16(), &body),
                });
            }

            response
                .json::<GenerateContentResponse>()
                .await
                .map_err(|e| TransportFailure {
                    status: None,
                    message: format!("Malformed Gemini response: {}", e),
                })
        }
    }
}

/// Pull the human-readable message out of an error body.
fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
        _ if body.trim().is_empty() => format!("HTTP {}", status),
        _ => format!("HTTP {}: {}", status, body.trim()),
    }
}
