//! Study assistant backed by an OpenAI-compatible chat completion endpoint.
//!
//! The completion call is the only suspending operation in the library. A
//! session records the user's message, the request runs without touching the
//! session, and the reply (or the failure text) is fed back afterwards.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AssistantError, ValidationError};
use crate::session::StudyState;
use crate::storage::{AssistantConfig, KvStore};

/// Shown when the endpoint answers with no choices.
pub const EMPTY_REPLY: &str = "I'm sorry, I couldn't generate a response.";

const API_KEY_ENV: &str = "STUDYQUEST_API_KEY";
const API_KEY_ENTRY: &str = "assistant_api_key";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub is_user: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            is_user: true,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            is_user: false,
        }
    }

    /// Chat line recorded when a completion fails.
    pub fn failure(err: &AssistantError) -> Self {
        Self::assistant(format!(
            "Sorry, I couldn't process your request. Error: {err}"
        ))
    }
}

/// Anything that can turn a prompt into a reply.
pub trait TextCompletion {
    fn complete(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, AssistantError>> + Send;
}

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// HTTP client for the completion endpoint.
pub struct CompletionClient {
    http: reqwest::Client,
    config: AssistantConfig,
    api_key: String,
}

impl CompletionClient {
    pub fn new(config: AssistantConfig, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            api_key: api_key.into(),
        }
    }

    /// Build a client with the key from the environment or the keyring.
    pub fn from_config(config: AssistantConfig) -> Result<Self, AssistantError> {
        let api_key = credentials::api_key()?;
        Ok(Self::new(config, api_key))
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }
}

impl TextCompletion for CompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, AssistantError> {
        let body = CompletionRequest {
            model: &self.config.model,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::debug!(endpoint = %self.config.endpoint, model = %self.config.model, "requesting completion");
        let resp = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(AssistantError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&text).map_err(|e| AssistantError::Decode(e.to_string()))?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_else(|| EMPTY_REPLY.to_string()))
    }
}

/// Send `prompt` and record both sides of the exchange in the session.
///
/// Transport failures do not propagate: they become a chat line. Only an
/// empty prompt is rejected.
pub async fn ask<C, S>(
    client: &C,
    state: &mut StudyState<S>,
    prompt: &str,
) -> Result<ChatMessage, ValidationError>
where
    C: TextCompletion,
    S: KvStore,
{
    state.begin_ask(prompt)?;
    let result = client.complete(prompt).await;
    Ok(state.finish_ask(result).clone())
}

/// API key lookup: environment first, then the OS keyring.
pub mod credentials {
    use super::{API_KEY_ENTRY, API_KEY_ENV};
    use crate::error::AssistantError;

    const SERVICE: &str = "studyquest";

    pub fn api_key() -> Result<String, AssistantError> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }
        get(API_KEY_ENTRY)?.ok_or(AssistantError::MissingApiKey)
    }

    pub fn set_api_key(value: &str) -> Result<(), AssistantError> {
        set(API_KEY_ENTRY, value)
    }

    pub fn clear_api_key() -> Result<(), AssistantError> {
        delete(API_KEY_ENTRY)
    }

    fn get(key: &str) -> Result<Option<String>, AssistantError> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(key: &str, value: &str) -> Result<(), AssistantError> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    fn delete(key: &str) -> Result<(), AssistantError> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Config, MemoryStore};

    fn client_for(server: &mockito::Server) -> CompletionClient {
        let config = AssistantConfig {
            endpoint: format!("{}/openai/v1/chat/completions", server.url()),
            ..Config::default().assistant
        };
        CompletionClient::new(config, "test-key")
    }

    struct Canned(Result<&'static str, u16>);

    impl TextCompletion for Canned {
        async fn complete(&self, _prompt: &str) -> Result<String, AssistantError> {
            match self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(AssistantError::Status {
                    status,
                    body: "unavailable".into(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn complete_posts_chat_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/openai/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "mixtral-8x7b-32768",
                "messages": [{"role": "user", "content": "What is osmosis?"}],
                "max_tokens": 1024
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Water moving across a membrane."}}]}"#)
            .create_async()
            .await;

        let reply = client_for(&server).complete("What is osmosis?").await.unwrap();
        assert_eq!(reply, "Water moving across a membrane.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_choices_use_fallback_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/openai/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let reply = client_for(&server).complete("hi").await.unwrap();
        assert_eq!(reply, EMPTY_REPLY);
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/openai/v1/chat/completions")
            .with_status(401)
            .with_body("invalid api key")
            .create_async()
            .await;

        let err = client_for(&server).complete("hi").await.unwrap_err();
        assert!(matches!(err, AssistantError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/openai/v1/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client_for(&server).complete("hi").await.unwrap_err();
        assert!(matches!(err, AssistantError::Decode(_)));
    }

    #[tokio::test]
    async fn ask_records_reply_and_awards_points() {
        let store = MemoryStore::new();
        let mut state = StudyState::load(&store, &Config::default());

        let reply = ask(&Canned(Ok("Mitochondria.")), &mut state, "Powerhouse of the cell?")
            .await
            .unwrap();
        assert_eq!(reply.content, "Mitochondria.");
        assert!(!reply.is_user);

        let history = state.chat_history();
        assert_eq!(history.len(), 2);
        assert!(history[0].is_user);
        assert_eq!(history[0].content, "Powerhouse of the cell?");
        assert_eq!(state.reward().points(), 5);
    }

    #[tokio::test]
    async fn ask_failure_becomes_chat_line_without_points() {
        let store = MemoryStore::new();
        let mut state = StudyState::load(&store, &Config::default());

        let reply = ask(&Canned(Err(503)), &mut state, "hello").await.unwrap();
        assert!(reply
            .content
            .starts_with("Sorry, I couldn't process your request. Error: "));
        assert_eq!(state.chat_history().len(), 2);
        assert_eq!(state.reward().points(), 0);
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected() {
        let store = MemoryStore::new();
        let mut state = StudyState::load(&store, &Config::default());
        let err = ask(&Canned(Ok("unused")), &mut state, "   ").await.unwrap_err();
        assert!(matches!(err, ValidationError::EmptyText { .. }));
        assert!(state.chat_history().is_empty());
    }
}
