//! Google Gemini `generateContent` client.

use cityscout_shared::{ProviderError, Result, TextGenerationConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::http::{build_client, classify_status, classify_transport, endpoint};

/// Text generation over the Gemini REST API. One client serves every model;
/// the model id is chosen per call so a fallback chain can iterate over models.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    base_url: String,
    http: Client,
}

impl GeminiClient {
    pub fn new(config: &TextGenerationConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            http: build_client(config.timeout())?,
        })
    }

    /// Send a single-turn `prompt` to `model` and return the reply text, trimmed.
    #[instrument(skip_all, fields(model = %model))]
    pub async fn generate(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
    ) -> std::result::Result<String, ProviderError> {
        let model = model.trim().strip_prefix("models/").unwrap_or(model.trim());
        let url = endpoint(&self.base_url, &format!("v1beta/models/{model}:generateContent"))
            .map_err(|e| ProviderError::malformed(e.to_string()))?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let response = self
            .http
            .post(url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| classify_transport(&e))?;
        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::malformed(format!("generateContent body: {e}")))?;
        let text = parsed.text();
        if text.is_empty() {
            return Err(ProviderError::empty(format!("{model} returned no text")));
        }

        debug!(chars = text.len(), "generated text");
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityscout_shared::FailureKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> GeminiClient {
        let config = TextGenerationConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        GeminiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn generate_returns_trimmed_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "  Hello "}, {"text": "there.\n"}]},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let text = client
            .generate("test-key", "gemini-1.5-flash", "hi")
            .await
            .unwrap();
        assert_eq!(text, "Hello there.");
    }

    #[tokio::test]
    async fn models_prefix_is_stripped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let text = client
            .generate("k", "models/gemini-1.5-pro", "prompt")
            .await
            .unwrap();
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn quota_error_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.generate("k", "gemini-3-flash-preview", "p").await.unwrap_err();
        assert_eq!(err.kind, FailureKind::QuotaExceeded);
    }

    #[tokio::test]
    async fn unknown_model_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": 404, "message": "models/nope is not found", "status": "NOT_FOUND"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.generate("k", "nope", "p").await.unwrap_err();
        assert_eq!(err.kind, FailureKind::ModelNotFound);
    }

    #[tokio::test]
    async fn empty_candidates_are_an_empty_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.generate("k", "gemini-1.5-flash", "p").await.unwrap_err();
        assert_eq!(err.kind, FailureKind::Empty);
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.generate("k", "gemini-1.5-flash", "p").await.unwrap_err();
        assert_eq!(err.kind, FailureKind::Malformed);
    }
}
