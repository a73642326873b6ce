//! Pexels photo search client.

use cityscout_shared::{PhotosConfig, ProviderError, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::http::{build_client, classify_status, classify_transport, endpoint};

#[derive(Debug, Clone)]
pub struct PhotoClient {
    base_url: String,
    http: Client,
}

impl PhotoClient {
    pub fn new(config: &PhotosConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            http: build_client(config.timeout())?,
        })
    }

    /// URL of the top landscape photo for `query` (the `large` rendition).
    ///
    /// Only a `200 OK` counts; a search with no photos is an `Empty` failure.
    #[instrument(skip(self, api_key))]
    pub async fn best_landscape(
        &self,
        api_key: &str,
        query: &str,
    ) -> std::result::Result<String, ProviderError> {
        let url = endpoint(&self.base_url, "v1/search")
            .map_err(|e| ProviderError::malformed(e.to_string()))?;

        let response = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, api_key)
            .query(&[
                ("query", query),
                ("per_page", "1"),
                ("orientation", "landscape"),
            ])
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| classify_transport(&e))?;
        if status != StatusCode::OK {
            return Err(classify_status(status, &body));
        }

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::malformed(format!("photo search body: {e}")))?;

        let url = parsed
            .photos
            .into_iter()
            .next()
            .map(|photo| photo.src.large)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ProviderError::empty(format!("no photos for '{query}'")))?;

        debug!(%url, "photo found");
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    large: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityscout_shared::FailureKind;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> PhotoClient {
        let config = PhotosConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        PhotoClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn returns_large_source_of_first_photo() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(header("Authorization", "photo-key"))
            .and(query_param("query", "Tokyo landmark"))
            .and(query_param("per_page", "1"))
            .and(query_param("orientation", "landscape"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_results": 8000,
                "page": 1,
                "per_page": 1,
                "photos": [{
                    "id": 3408744,
                    "src": {
                        "original": "https://images.pexels.com/photos/3408744/a.jpeg",
                        "large": "https://images.pexels.com/photos/3408744/a.jpeg?h=650&w=940"
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = client_for(&server)
            .best_landscape("photo-key", "Tokyo landmark")
            .await
            .unwrap();
        assert_eq!(url, "https://images.pexels.com/photos/3408744/a.jpeg?h=650&w=940");
    }

    #[tokio::test]
    async fn no_photos_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"photos": []})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .best_landscape("k", "Nowhereville street")
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::Empty);
    }

    #[tokio::test]
    async fn non_ok_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .best_landscape("k", "Paris street")
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::HttpStatus(204));
    }

    #[tokio::test]
    async fn rate_limit_is_quota() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .best_landscape("k", "Paris street")
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::QuotaExceeded);
    }
}
