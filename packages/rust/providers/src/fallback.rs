//! Ordered fallback chains.
//!
//! A chain tries candidates (model ids, services) in order with the same
//! `attempt` contract and stops at the first success. If every candidate
//! fails, the caller supplies the terminal synthetic value.

use std::future::Future;

use cityscout_shared::{Failure, ProviderError, Source, Sourced};
use tracing::{debug, warn};

/// Result of running a chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainOutcome<T> {
    /// `candidate` produced `value`; `failures` lists the candidates tried before it.
    Success {
        candidate: String,
        value: T,
        failures: Vec<Failure>,
    },
    /// Every candidate failed (or there were none).
    Exhausted { failures: Vec<Failure> },
}

impl<T> ChainOutcome<T> {
    /// An exhausted outcome without trying anything, e.g. when a credential is missing.
    pub fn skipped(failure: Failure) -> Self {
        Self::Exhausted {
            failures: vec![failure],
        }
    }

    pub fn failures(&self) -> &[Failure] {
        match self {
            Self::Success { failures, .. } | Self::Exhausted { failures } => failures,
        }
    }

    /// Collapse into a value with provenance, applying `synthetic` on exhaustion.
    pub fn or_synthetic(self, synthetic: impl FnOnce(&[Failure]) -> T) -> Sourced<T> {
        match self {
            Self::Success {
                candidate, value, ..
            } => Sourced::new(value, Source::live(candidate)),
            Self::Exhausted { failures } => {
                let value = synthetic(&failures);
                Sourced::new(value, Source::Synthetic { failures })
            }
        }
    }
}

/// Try `candidates` in order until `attempt` succeeds.
///
/// Every failure advances to the next candidate; quota and missing-model
/// failures are logged at debug level since they are the expected reason to
/// move on, anything else is a warning.
pub async fn first_success<C, T, F, Fut>(candidates: &[C], mut attempt: F) -> ChainOutcome<T>
where
    C: AsRef<str>,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut failures = Vec::new();

    for candidate in candidates {
        let candidate = candidate.as_ref().to_string();
        match attempt(candidate.clone()).await {
            Ok(value) => {
                debug!(candidate = %candidate, tried = failures.len() + 1, "fallback chain succeeded");
                return ChainOutcome::Success {
                    candidate,
                    value,
                    failures,
                };
            }
            Err(error) => {
                if error.kind.is_exhaustion() {
                    debug!(candidate = %candidate, %error, "candidate exhausted, trying next");
                } else {
                    warn!(candidate = %candidate, %error, "candidate failed, trying next");
                }
                failures.push(Failure::new(candidate, error));
            }
        }
    }

    ChainOutcome::Exhausted { failures }
}
