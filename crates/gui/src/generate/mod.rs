//! Client for the external text-to-CAD generation service.
//!
//! The service takes either a natural-language prompt or a serialized
//! document and answers with base64-encoded STL bytes plus the document
//! it generated. All requests are form-encoded POSTs; see
//! [`GenerationClient`].

pub mod enhance;
pub mod preprocess;

use base64::Engine as _;
use serde::Deserialize;
use shared::CadDocument;

pub use preprocess::{preprocess, validate_prompt, MAX_PROMPT_LEN};

/// Hard cap on the decoded mesh payload. A broken or hostile backend
/// must not be able to allocate unbounded memory on the client.
pub const MAX_MESH_BYTES: usize = 50 * 1024 * 1024;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Local rejection before any request is sent.
    #[error("invalid input: {0}")]
    Validation(String),
    /// Transport-level failure; the service was never reached or the
    /// connection dropped mid-flight.
    #[error("network error: {0}")]
    Network(String),
    /// The service answered but reported failure (non-2xx or
    /// `success: false`).
    #[error("generation service error: {0}")]
    Service(String),
    /// The response arrived but its payload could not be decoded.
    #[error("response decode error: {0}")]
    Decode(String),
}

impl GenerateError {
    /// Short remediation hint for toasts and inline chat errors.
    pub fn remediation(&self) -> &'static str {
        match self {
            GenerateError::Validation(_) => "Adjust the input and try again.",
            GenerateError::Network(_) => "Check the connection to the generation service.",
            GenerateError::Service(_) | GenerateError::Decode(_) => "Try again.",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServiceResponse {
    success: bool,
    #[serde(default)]
    stl_data: Option<String>,
    #[serde(default)]
    model_response: Option<CadDocument>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// A successful generation: raw STL bytes plus, for prompt-based
/// requests, the document the service produced.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub stl_bytes: Vec<u8>,
    pub document: Option<CadDocument>,
}

#[derive(Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: String,
}

impl GenerationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Endpoint from `PROMPTCAD_ENDPOINT`, falling back to the local
    /// default.
    pub fn from_env() -> Self {
        let base_url = std::env::var("PROMPTCAD_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validate, preprocess, and submit a free-text prompt.
    pub async fn submit_prompt(&self, prompt: &str) -> Result<GenerationOutput, GenerateError> {
        validate_prompt(prompt)?;
        let processed = preprocess(prompt);
        tracing::info!(chars = processed.len(), "submitting prompt");
        self.post_form("/api/generate-stl", &[("text_input", processed.as_str())])
            .await
    }

    /// Submit a serialized document for regeneration.
    pub async fn submit_document(
        &self,
        document: &CadDocument,
    ) -> Result<GenerationOutput, GenerateError> {
        let json = serde_json::to_string(document)
            .map_err(|e| GenerateError::Validation(format!("unserializable document: {e}")))?;
        tracing::info!(bytes = json.len(), "submitting document");
        self.post_form("/api/generate-stl-from-json", &[("json_input", json.as_str())])
            .await
    }

    /// Stream a rewritten version of the prompt. The service answers
    /// with plain-text chunks; each is forwarded as it arrives, and a
    /// transport error is forwarded as the terminal item.
    pub async fn enhance_prompt(
        &self,
        prompt: &str,
        chunks: tokio::sync::mpsc::Sender<Result<String, GenerateError>>,
    ) {
        let url = format!("{}/api/enhance-prompt", self.base_url);
        let response = self
            .http
            .post(&url)
            .form(&[("text_input", prompt)])
            .send()
            .await;

        let mut response = match response {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                let _ = chunks
                    .send(Err(GenerateError::Service(format!(
                        "enhancement service returned {}",
                        response.status()
                    ))))
                    .await;
                return;
            }
            Err(e) => {
                let _ = chunks
                    .send(Err(GenerateError::Network(e.to_string())))
                    .await;
                return;
            }
        };

        loop {
            match response.chunk().await {
                Ok(Some(bytes)) => {
                    let text = String::from_utf8_lossy(&bytes).into_owned();
                    if chunks.send(Ok(text)).await.is_err() {
                        return;
                    }
                }
                Ok(None) => return,
                Err(e) => {
                    let _ = chunks
                        .send(Err(GenerateError::Network(e.to_string())))
                        .await;
                    return;
                }
            }
        }
    }

    /// Passive connectivity probe. Failures degrade a status indicator
    /// only and are never fatal.
    pub async fn health(&self) -> Result<HealthResponse, GenerateError> {
        let url = format!("{}/api/health", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(GenerateError::Service(format!(
                "health check returned {}",
                response.status()
            )));
        }
        response
            .json::<HealthResponse>()
            .await
            .map_err(|e| GenerateError::Decode(e.to_string()))
    }

    async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<GenerationOutput, GenerateError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerateError::Service(format!(
                "service returned {status}"
            )));
        }

        let body: ServiceResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Decode(e.to_string()))?;
        parse_service_response(body)
    }
}

fn parse_service_response(body: ServiceResponse) -> Result<GenerationOutput, GenerateError> {
    if !body.success {
        let message = body
            .error
            .unwrap_or_else(|| "service reported failure".to_string());
        return Err(GenerateError::Service(message));
    }
    let encoded = body
        .stl_data
        .ok_or_else(|| GenerateError::Decode("success response without stl_data".to_string()))?;
    let stl_bytes = decode_stl_payload(&encoded)?;
    Ok(GenerationOutput {
        stl_bytes,
        document: body.model_response,
    })
}

/// Decode the base64 mesh payload, enforcing the size cap before the
/// bytes reach ingestion.
pub fn decode_stl_payload(encoded: &str) -> Result<Vec<u8>, GenerateError> {
    // 4 base64 chars encode 3 bytes; reject oversize without decoding.
    if encoded.len() / 4 * 3 > MAX_MESH_BYTES {
        return Err(GenerateError::Decode(format!(
            "mesh payload exceeds {} byte limit",
            MAX_MESH_BYTES
        )));
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| GenerateError::Decode(format!("invalid base64 mesh data: {e}")))?;
    if bytes.len() > MAX_MESH_BYTES {
        return Err(GenerateError::Decode(format!(
            "mesh payload exceeds {} byte limit",
            MAX_MESH_BYTES
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_decode_valid_payload() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"hello stl");
        assert_eq!(decode_stl_payload(&encoded).unwrap(), b"hello stl");
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert!(matches!(
            decode_stl_payload("not!!valid@@base64"),
            Err(GenerateError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_oversize_without_decoding() {
        // Length check alone must trip; no 67MB allocation happens.
        let oversized = "A".repeat((MAX_MESH_BYTES / 3 + 1) * 4);
        assert!(matches!(
            decode_stl_payload(&oversized),
            Err(GenerateError::Decode(_))
        ));
    }

    #[test]
    fn test_success_response_parses_document_and_mesh() {
        let document = CadDocument::template();
        let stl = fixtures::box_stl(1.0, 1.0, 1.0);
        let json = fixtures::service_success_json(&document, &stl);
        let body: ServiceResponse = serde_json::from_str(&json).unwrap();
        let output = parse_service_response(body).unwrap();
        assert_eq!(output.stl_bytes, stl);
        assert!(output.document.is_some());
    }

    #[test]
    fn test_failure_response_is_service_error() {
        let json = fixtures::service_failure_json("model unavailable");
        let body: ServiceResponse = serde_json::from_str(&json).unwrap();
        match parse_service_response(body) {
            Err(GenerateError::Service(msg)) => assert_eq!(msg, "model unavailable"),
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[test]
    fn test_success_without_payload_is_decode_error() {
        let body: ServiceResponse =
            serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(matches!(
            parse_service_response(body),
            Err(GenerateError::Decode(_))
        ));
    }

    #[test]
    fn test_remediation_copy_distinguishes_network() {
        let network = GenerateError::Network("refused".into());
        let service = GenerateError::Service("500".into());
        assert_ne!(network.remediation(), service.remediation());
    }
}
