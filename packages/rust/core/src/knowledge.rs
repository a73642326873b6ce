//! Knowledge source adapters: the local lookup table and remote text generation.

use std::sync::Arc;

use cityscout_providers::{
    ChainOutcome, CredentialProvider, GeminiClient, Service, first_success,
};
use cityscout_shared::{Failure, LookupEntry, ProviderError, Source, Sourced};
use tracing::{info, instrument, warn};

/// Prompt sent to the text model for a city summary.
pub fn summary_prompt(city: &str) -> String {
    format!(
        "Provide a comprehensive 3-4 sentence summary about {city} as a travel destination. \
         Include information about famous landmarks, culture, cuisine, and what makes it special. \
         Be informative and engaging."
    )
}

/// Summary used when no text-generation key is configured.
pub fn missing_key_summary(city: &str, key_name: &str) -> String {
    format!(
        "{city} is a fascinating destination. To get detailed AI-generated summaries, \
         please add your {key_name} to the .env file."
    )
}

/// Summary used when every model in the chain failed.
pub fn generic_summary(city: &str) -> String {
    format!(
        "{city} is a vibrant city with rich culture, fascinating history, and world-class \
         attractions. It offers visitors unique experiences through its landmarks, cuisine, \
         and local traditions that make it a must-visit destination."
    )
}

/// The stored summary, verbatim.
pub fn local_summary(entry: &LookupEntry) -> Sourced<String> {
    Sourced::new(entry.summary.clone(), Source::KnowledgeBase)
}

/// Remote summary generation over an ordered model list.
pub struct RemoteSummarizer {
    client: GeminiClient,
    models: Vec<String>,
    credentials: Arc<dyn CredentialProvider>,
}

impl RemoteSummarizer {
    pub fn new(
        client: GeminiClient,
        models: Vec<String>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            client,
            models,
            credentials,
        }
    }

    /// Summarize `city`. Always returns a non-empty string mentioning the city.
    #[instrument(skip_all, fields(city = %city))]
    pub async fn summarize(&self, city: &str) -> Sourced<String> {
        let Some(api_key) = self.credentials.get(Service::TextGeneration) else {
            let key_name = self.credentials.describe(Service::TextGeneration);
            warn!(key = %key_name, "text generation key missing, using placeholder summary");
            let failure = Failure::new(key_name.clone(), ProviderError::missing_credential(&key_name));
            return ChainOutcome::skipped(failure)
                .or_synthetic(|_| missing_key_summary(city, &key_name));
        };

        let prompt = summary_prompt(city);
        let outcome = first_success(self.models.as_slice(), |model| {
            let client = &self.client;
            let api_key = api_key.as_str();
            let prompt = prompt.as_str();
            async move { client.generate(api_key, &model, prompt).await }
        })
        .await;

        if let Some(failure) = outcome.failures().last() {
            info!(failed = outcome.failures().len(), last = %failure, "summary chain had failures");
        }
        outcome.or_synthetic(|_| {
            warn!("all text models failed, using generic summary");
            generic_summary(city)
        })
    }
}
