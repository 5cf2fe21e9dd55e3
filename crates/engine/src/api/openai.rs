//! OpenAI-compatible chat completions client
//!
//! Any endpoint speaking `POST {base}/chat/completions` works (OpenAI,
//! Azure-style proxies, local gateways); the base URL is configurable.

use super::{CompletionClient, CompletionError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 300;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.7,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// api_key stays out of logs
impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn into_text(self) -> Result<String, CompletionError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }
}

// ---------------------------------------------------------------------------
// Client implementation
// ---------------------------------------------------------------------------

pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, CompletionError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    /// POST /chat/completions, first choice's text
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = self.endpoint();
        debug!(url = %url, model = %self.config.model, "Requesting completion");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CompletionError::Api { status, body });
        }

        let parsed: ChatCompletionResponse = resp.json().await?;
        let text = parsed.into_text()?;
        debug!(chars = text.len(), "Completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let body_len = text[..end]
                    .lines()
                    .find_map(|l| l.to_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// One-shot completion endpoint; `None` accepts the request and never answers
    async fn fake_endpoint(response: Option<String>) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            match response {
                Some(response) => {
                    socket.write_all(response.as_bytes()).await.unwrap();
                    socket.shutdown().await.ok();
                }
                None => tokio::time::sleep(Duration::from_secs(10)).await,
            }
            request
        });
        (format!("http://{}/v1", addr), handle)
    }

    fn local_client(base_url: &str) -> OpenAiClient {
        let mut config = OpenAiConfig::new("sk-test");
        config.base_url = base_url.to_string();
        config.timeout = Duration::from_secs(1);
        OpenAiClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_complete_posts_prompt() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "Size down."}}]}"#;
        let (base, handle) = fake_endpoint(Some(http_response("200 OK", body))).await;

        let text = local_client(&base).complete("How am I doing?").await.unwrap();
        assert_eq!(text, "Size down.");

        let request = handle.await.unwrap();
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(request.contains("Bearer sk-test"));
        assert!(request.contains("How am I doing?"));
    }

    #[tokio::test]
    async fn test_complete_error_status() {
        let (base, _handle) = fake_endpoint(Some(http_response(
            "500 Internal Server Error",
            r#"{"error": "boom"}"#,
        )))
        .await;

        match local_client(&base).complete("hi").await {
            Err(CompletionError::Api { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("boom"));
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_malformed_body() {
        let (base, _handle) = fake_endpoint(Some(http_response("200 OK", r#"{"choices": [{"#))).await;

        match local_client(&base).complete("hi").await {
            Err(CompletionError::Http(e)) => assert!(e.is_decode()),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_times_out() {
        let (base, _handle) = fake_endpoint(None).await;

        match local_client(&base).complete("hi").await {
            Err(CompletionError::Http(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    fn client(base_url: &str) -> OpenAiClient {
        let mut config = OpenAiConfig::new("sk-test");
        config.base_url = base_url.to_string();
        OpenAiClient::new(config).unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        assert_eq!(
            client("https://api.openai.com/v1/").endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let c = client(DEFAULT_BASE_URL);
        let body = serde_json::to_value(c.request_body("How am I doing?")).unwrap();
        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["max_tokens"], DEFAULT_MAX_TOKENS);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "How am I doing?");
    }

    #[test]
    fn test_response_first_choice() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Cut your losers sooner."}},
                {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
            ]
        }"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_text().unwrap(), "Cut your losers sooner.");
    }

    #[test]
    fn test_response_without_text_is_error() {
        let no_choices: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(no_choices.into_text(), Err(CompletionError::EmptyResponse)));

        let null_content: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert!(matches!(null_content.into_text(), Err(CompletionError::EmptyResponse)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let printed = format!("{:?}", OpenAiConfig::new("sk-secret"));
        assert!(!printed.contains("sk-secret"));
    }
}
