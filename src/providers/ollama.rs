use crate::error::TransportError;
use crate::providers::{InferenceProvider, build_inference_client};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

// Generation parameters are part of the pipeline contract: reproducibility
// over creativity. Identical prompt + model must produce identical output.
const TEMPERATURE: f64 = 0.0;
const TOP_P: f64 = 1.0;
const REPEAT_PENALTY: f64 = 1.1;
const NUM_PREDICT: u32 = 400;

pub struct OllamaClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Options {
    temperature: f64,
    top_p: f64,
    repeat_penalty: f64,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateEnvelope {
    response: Option<String>,
}

impl OllamaClient {
    pub fn new(base_url: Option<&str>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url
                .unwrap_or(crate::config::DEFAULT_OLLAMA_URL)
                .trim_end_matches('/')
                .to_string(),
            client: build_inference_client(timeout_secs),
        }
    }

    fn build_request(model: &str, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            stream: false,
            options: Options {
                temperature: TEMPERATURE,
                top_p: TOP_P,
                repeat_penalty: REPEAT_PENALTY,
                num_predict: NUM_PREDICT,
            },
        }
    }
}

#[async_trait]
impl InferenceProvider for OllamaClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, TransportError> {
        let request = Self::build_request(model, prompt);
        let url = format!("{}/api/generate", self.base_url);

        tracing::debug!(model, prompt_chars = prompt.len(), "calling inference endpoint");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let envelope: GenerateEnvelope =
            serde_json::from_str(&body).map_err(|_| TransportError::InvalidPayload)?;

        envelope.response.ok_or(TransportError::MissingReply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn default_url() {
        let client = OllamaClient::new(None, 60);
        assert_eq!(client.base_url, "http://127.0.0.1:11434");
    }

    #[test]
    fn custom_url_trailing_slash() {
        let client = OllamaClient::new(Some("http://myserver:11434/"), 60);
        assert_eq!(client.base_url, "http://myserver:11434");
    }

    #[test]
    fn request_carries_deterministic_options() {
        let req = OllamaClient::build_request("mistral", "hello");
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"stream\":false"));
        assert!(json.contains("\"temperature\":0.0"));
        assert!(json.contains("\"top_p\":1.0"));
        assert!(json.contains("\"repeat_penalty\":1.1"));
        assert!(json.contains("\"num_predict\":400"));
    }

    #[tokio::test]
    async fn extracts_reply_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "mistral",
                "stream": false,
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "response": "{\"summary\":\"ok\"}",
                    "done": true,
                })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(Some(&server.uri()), 5);
        let reply = client.generate("mistral", "hello").await.unwrap();
        assert_eq!(reply, "{\"summary\":\"ok\"}");
    }

    #[tokio::test]
    async fn non_json_body_is_invalid_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>borked</html>"))
            .mount(&server)
            .await;

        let client = OllamaClient::new(Some(&server.uri()), 5);
        let err = client.generate("mistral", "hello").await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidPayload));
        assert_eq!(err.to_string(), "invalid payload from inference server");
    }

    #[tokio::test]
    async fn envelope_without_reply_is_missing_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "done": true })),
            )
            .mount(&server)
            .await;

        let client = OllamaClient::new(Some(&server.uri()), 5);
        let err = client.generate("mistral", "hello").await.unwrap_err();
        assert!(matches!(err, TransportError::MissingReply));
    }

    #[tokio::test]
    async fn http_error_status_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model blew up"))
            .mount(&server)
            .await;

        let client = OllamaClient::new(Some(&server.uri()), 5);
        let err = client.generate("mistral", "hello").await.unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn timeout_is_a_connection_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "response": "late" }))
                    .set_delay(std::time::Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = OllamaClient::new(Some(&server.uri()), 1);
        let err = client.generate("mistral", "hello").await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
        assert!(err.to_string().starts_with("Ollama connection failed:"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_connection_failure() {
        // Port 9 (discard) is never running an HTTP server.
        let client = OllamaClient::new(Some("http://127.0.0.1:9"), 1);
        let err = client.generate("mistral", "hello").await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
    }
}
