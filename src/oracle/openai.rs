use crate::config::OracleConfig;
use crate::error::OracleError;
use crate::oracle::DecisionOracle;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Decision oracle backed by an OpenAI-compatible chat completions endpoint
pub struct OpenAiOracle {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiOracle {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        request_timeout_secs: u64,
    ) -> Result<Self, OracleError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: None,
        })
    }

    /// Builds the client from configuration, reading the API key from the configured variable
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| OracleError::MissingApiKey(config.api_key_env.clone()))?;

        let oracle = Self::new(
            &config.base_url,
            api_key,
            &config.model,
            config.request_timeout_secs,
        )?;
        Ok(oracle.with_temperature(config.temperature))
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn headers(&self) -> Result<HeaderMap, OracleError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| OracleError::Network(format!("invalid API key header: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl DecisionOracle for OpenAiOracle {
    async fn decide(&self, instruction: &str, content: &str) -> Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: instruction,
                },
                ChatMessage {
                    role: "user",
                    content,
                },
            ],
            temperature: self.temperature,
        };

        ::log::debug!(
            "Oracle request to {} ({} characters of content)",
            self.model,
            content.len()
        );

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(OracleError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn oracle(server: &MockServer) -> OpenAiOracle {
        OpenAiOracle::new(&format!("{}/v1/", server.uri()), "test-key", "gpt-4.1-mini", 5).unwrap()
    }

    #[tokio::test]
    async fn test_decide_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4.1-mini",
                "messages": [
                    {"role": "system", "content": "instruction"},
                    {"role": "user", "content": "https://x.fi/rekry"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "{\"action\": \"CAREERS_PAGE_FOUND\", \"next_link\": null}"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = oracle(&server)
            .decide("instruction", "https://x.fi/rekry")
            .await
            .unwrap();
        assert_eq!(answer, r#"{"action": "CAREERS_PAGE_FOUND", "next_link": null}"#);
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = oracle(&server).decide("i", "c").await.unwrap_err();
        match err {
            OracleError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let err = oracle(&server).decide("i", "c").await.unwrap_err();
        assert!(matches!(err, OracleError::EmptyResponse));
    }

    #[test]
    fn test_missing_api_key() {
        let config = OracleConfig {
            api_key_env: "CAREER_FINDER_TEST_UNSET_KEY".to_string(),
            ..OracleConfig::default()
        };

        match OpenAiOracle::from_config(&config) {
            Err(OracleError::MissingApiKey(name)) => {
                assert_eq!(name, "CAREER_FINDER_TEST_UNSET_KEY")
            }
            _ => panic!("expected a missing API key error"),
        }
    }
}
