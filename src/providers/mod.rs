pub mod ollama;

pub use ollama::OllamaClient;

use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Seam between the orchestrator and whatever produces model text.
/// Production uses [`OllamaClient`]; tests substitute counting fakes.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// One bounded, non-streaming generation call. Exactly one attempt;
    /// the caller never retries.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, TransportError>;
}

/// Build the HTTP client used for inference calls. The request timeout is
/// the pipeline's `timeout_secs`; the connect timeout stays short so an
/// absent server fails fast instead of eating the whole budget.
pub fn build_inference_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| Client::new())
}
