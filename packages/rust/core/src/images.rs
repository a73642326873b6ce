//! City imagery: landmark-aware photo search with placeholder fallback.

use std::sync::Arc;

use cityscout_providers::{
    ChainOutcome, CredentialProvider, GeminiClient, PhotoClient, Service, first_success,
};
use cityscout_shared::{Failure, ProviderError, Source, Sourced};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Number of images every query returns.
pub const IMAGE_COUNT: usize = 4;

const PHOTO_PROVIDER: &str = "pexels";

/// Search terms used when landmark names are unavailable.
pub fn default_search_terms(city: &str) -> Vec<String> {
    ["landmark", "cityscape", "architecture", "street"]
        .iter()
        .map(|suffix| format!("{city} {suffix}"))
        .collect()
}

pub fn landmark_prompt(city: &str) -> String {
    format!(
        "List {IMAGE_COUNT} famous landmarks or iconic places in {city}, separated by commas. Just the names."
    )
}

/// Take the first four comma-separated names of a landmark reply.
///
/// Fewer than four, or any blank name among them, is a malformed reply.
pub fn parse_landmarks(reply: &str) -> Result<Vec<String>, ProviderError> {
    let names: Vec<String> = reply
        .split(',')
        .take(IMAGE_COUNT)
        .map(|name| name.trim().to_string())
        .collect();

    if names.len() < IMAGE_COUNT || names.iter().any(String::is_empty) {
        return Err(ProviderError::malformed(format!(
            "expected {IMAGE_COUNT} landmark names, got {:?}",
            reply.trim()
        )));
    }
    Ok(names)
}

/// Four placeholder image URLs with distinct random ids.
pub fn placeholder_images() -> Vec<String> {
    (0..IMAGE_COUNT)
        .map(|_| {
            format!(
                "https://picsum.photos/800/600?random={}",
                Uuid::new_v4().simple()
            )
        })
        .collect()
}

pub struct ImageAdapter {
    text: GeminiClient,
    landmark_models: Vec<String>,
    photos: PhotoClient,
    credentials: Arc<dyn CredentialProvider>,
}

impl ImageAdapter {
    pub fn new(
        text: GeminiClient,
        landmark_models: Vec<String>,
        photos: PhotoClient,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            text,
            landmark_models,
            photos,
            credentials,
        }
    }

    /// Exactly [`IMAGE_COUNT`] image URLs for `city`. Never fails.
    #[instrument(skip_all, fields(city = %city))]
    pub async fn images(&self, city: &str) -> Sourced<Vec<String>> {
        let Some(photo_key) = self.credentials.get(Service::PhotoSearch) else {
            let key_name = self.credentials.describe(Service::PhotoSearch);
            warn!(key = %key_name, "photo search key missing, using placeholder images");
            let failure = Failure::new(key_name.clone(), ProviderError::missing_credential(&key_name));
            return ChainOutcome::skipped(failure).or_synthetic(|_| placeholder_images());
        };

        let (terms, mut failures) = self.search_terms(city).await;

        let mut urls = Vec::with_capacity(IMAGE_COUNT);
        for term in &terms {
            match self.photos.best_landscape(&photo_key, term).await {
                Ok(url) => urls.push(url),
                Err(error) => {
                    debug!(term = %term, %error, "no photo for term");
                    failures.push(Failure::new(term.clone(), error));
                }
            }
        }

        if urls.len() >= IMAGE_COUNT {
            urls.truncate(IMAGE_COUNT);
            info!(count = urls.len(), "photos found");
            return Sourced::new(urls, Source::live(PHOTO_PROVIDER));
        }

        warn!(found = urls.len(), "not enough photos, using placeholder images");
        Sourced::new(placeholder_images(), Source::Synthetic { failures })
    }

    /// Landmark-based terms when the text service cooperates, else the defaults.
    /// Also returns the failed landmark attempts.
    async fn search_terms(&self, city: &str) -> (Vec<String>, Vec<Failure>) {
        let Some(text_key) = self.credentials.get(Service::TextGeneration) else {
            return (default_search_terms(city), Vec::new());
        };

        let prompt = landmark_prompt(city);
        let outcome = first_success(self.landmark_models.as_slice(), |model| {
            let text = &self.text;
            let text_key = text_key.as_str();
            let prompt = prompt.as_str();
            async move {
                let reply = text.generate(text_key, &model, prompt).await?;
                parse_landmarks(&reply)
            }
        })
        .await;

        match outcome {
            ChainOutcome::Success {
                candidate,
                value,
                failures,
            } => {
                debug!(model = %candidate, landmarks = ?value, "landmark search terms");
                let terms = value
                    .into_iter()
                    .map(|landmark| format!("{city} {landmark}"))
                    .collect();
                (terms, failures)
            }
            ChainOutcome::Exhausted { failures } => (default_search_terms(city), failures),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use cityscout_providers::StaticCredentials;
    use cityscout_shared::{FailureKind, PhotosConfig, TextGenerationConfig};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer, credentials: StaticCredentials) -> ImageAdapter {
        let text = TextGenerationConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        let photos = PhotosConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        ImageAdapter::new(
            GeminiClient::new(&text).unwrap(),
            text.landmark_models.clone(),
            PhotoClient::new(&photos).unwrap(),
            Arc::new(credentials),
        )
    }

    fn photo(url: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"photos": [{"src": {"large": url}}]}))
    }

    #[test]
    fn default_terms() {
        assert_eq!(
            default_search_terms("Oslo"),
            ["Oslo landmark", "Oslo cityscape", "Oslo architecture", "Oslo street"]
        );
    }

    #[test]
    fn landmark_reply_parsing() {
        let names = parse_landmarks(" Eiffel Tower, Louvre ,Notre-Dame, Arc de Triomphe, Sacré-Cœur")
            .unwrap();
        assert_eq!(names, ["Eiffel Tower", "Louvre", "Notre-Dame", "Arc de Triomphe"]);

        let err = parse_landmarks("Eiffel Tower, Louvre").unwrap_err();
        assert_eq!(err.kind, FailureKind::Malformed);
        assert!(parse_landmarks("a, , c, d").is_err());
    }

    #[test]
    fn placeholders_are_distinct() {
        let urls = placeholder_images();
        assert_eq!(urls.len(), IMAGE_COUNT);
        assert!(urls.iter().all(|u| u.starts_with("https://picsum.photos/800/600?random=")));
        assert_eq!(urls.iter().collect::<HashSet<_>>().len(), IMAGE_COUNT);
    }

    #[tokio::test]
    async fn missing_photo_key_gives_placeholders() {
        let server = MockServer::start().await;
        let result = adapter(&server, StaticCredentials::none()).images("Paris").await;
        assert_eq!(result.value.len(), IMAGE_COUNT);
        assert_eq!(
            result.source.failures()[0].kind(),
            FailureKind::MissingCredential
        );
    }

    #[tokio::test]
    async fn default_terms_without_text_key() {
        let server = MockServer::start().await;
        for (i, suffix) in ["landmark", "cityscape", "architecture", "street"].iter().enumerate() {
            Mock::given(method("GET"))
                .and(path("/v1/search"))
                .and(query_param("query", format!("Oslo {suffix}")))
                .respond_with(photo(&format!("https://images.example/{i}.jpg")))
                .expect(1)
                .mount(&server)
                .await;
        }

        let creds = StaticCredentials::none().with(Service::PhotoSearch, "p");
        let result = adapter(&server, creds).images("Oslo").await;
        assert_eq!(
            result.value,
            (0..4)
                .map(|i| format!("https://images.example/{i}.jpg"))
                .collect::<Vec<_>>()
        );
        assert_eq!(result.source, Source::live(PHOTO_PROVIDER));
    }

    #[tokio::test]
    async fn short_landmark_reply_moves_to_next_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-3-flash-preview:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Eiffel Tower"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Eiffel Tower, Louvre, Notre-Dame, Montmartre"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("query", "Paris Louvre"))
            .respond_with(photo("https://images.example/louvre.jpg"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(photo("https://images.example/other.jpg"))
            .mount(&server)
            .await;

        let creds = StaticCredentials::none()
            .with(Service::PhotoSearch, "p")
            .with(Service::TextGeneration, "t");
        let result = adapter(&server, creds).images("Paris").await;
        assert_eq!(result.value.len(), IMAGE_COUNT);
        assert_eq!(result.value[1], "https://images.example/louvre.jpg");
        assert_eq!(result.source, Source::live(PHOTO_PROVIDER));
    }

    #[tokio::test]
    async fn partial_photo_results_give_placeholders() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("query", "Oslo street"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"photos": []})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(photo("https://images.example/x.jpg"))
            .mount(&server)
            .await;

        let creds = StaticCredentials::none().with(Service::PhotoSearch, "p");
        let result = adapter(&server, creds).images("Oslo").await;
        assert_eq!(result.value.len(), IMAGE_COUNT);
        assert!(result.value[0].starts_with("https://picsum.photos/"));
        let failures = result.source.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].attempt, "Oslo street");
        assert_eq!(failures[0].kind(), FailureKind::Empty);
    }
}
