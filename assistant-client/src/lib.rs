//! # Assistant API client
//!
//! Thin wrapper around [async-openai] for the Assistants API: one thread per
//! conversation, user messages posted into the thread, runs polled until a reply
//! is available. Provides token masking for safe logging.
//!
//! The [`AssistantService`] trait is the seam for tests and callers; [`AssistantClient`]
//! is the production implementation.

use async_openai::{
    config::OpenAIConfig,
    types::{
        CreateMessageRequestArgs, CreateRunRequestArgs, CreateThreadRequestArgs, MessageContent,
        MessageRole, RunStatus,
    },
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
/// Exposed for tests and for callers who need to log API keys safely.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 {
        "***".to_string()
    } else {
        let head_len = 7.min(len);
        let tail_len = 4.min(len.saturating_sub(head_len));
        let head = &token[..head_len];
        let tail = if tail_len > 0 {
            &token[len - tail_len..]
        } else {
            ""
        };
        format!("{}***{}", head, tail)
    }
}

/// Client-side view of a run's lifecycle. `Failed` covers every terminal state the
/// bot cannot recover from, including `requires_action` (no tools are registered,
/// so such a run can never complete).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Completed,
    Failed(String),
}

/// Assistant API interface: thread creation, user messages, runs, and reply lookup.
/// Object-safe so handlers can hold `Arc<dyn AssistantService>` and tests can
/// substitute a mock.
#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Creates a new conversation thread and returns its id.
    async fn create_thread(&self) -> anyhow::Result<String>;

    /// Posts a user-role message into the thread.
    async fn post_user_message(&self, thread_id: &str, text: &str) -> anyhow::Result<()>;

    /// Starts an assistant run over the thread and returns the run id.
    async fn start_run(&self, thread_id: &str) -> anyhow::Result<String>;

    /// Returns the current state of the run.
    async fn run_state(&self, thread_id: &str, run_id: &str) -> anyhow::Result<RunState>;

    /// Returns the newest assistant-role message text in the thread, if any.
    async fn latest_assistant_reply(&self, thread_id: &str) -> anyhow::Result<Option<String>>;
}

/// Assistants API client. Wraps an async-openai client and the assistant id to run;
/// optionally holds the API key for masked logging.
#[derive(Clone)]
pub struct AssistantClient {
    /// Shared async-openai client used for all API calls.
    client: Arc<Client<OpenAIConfig>>,
    /// The assistant that runs are created for.
    assistant_id: String,
    /// API key stored only for logging (masked). None when created via `with_client()`.
    api_key_for_logging: Option<String>,
}

impl AssistantClient {
    /// Builds a client using the given API key and default API base URL.
    pub fn new(api_key: String, assistant_id: String) -> Self {
        let api_key_for_logging = Some(api_key.clone());
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Arc::new(Client::with_config(config)),
            assistant_id,
            api_key_for_logging,
        }
    }

    /// Builds a client with a custom base URL (e.g. for proxies or compatible endpoints).
    pub fn with_base_url(api_key: String, assistant_id: String, base_url: String) -> Self {
        let api_key_for_logging = Some(api_key.clone());
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(base_url);
        Self {
            client: Arc::new(Client::with_config(config)),
            assistant_id,
            api_key_for_logging,
        }
    }

    /// Builds a client from an existing async-openai client (no API key stored for logging).
    pub fn with_client(client: Client<OpenAIConfig>, assistant_id: String) -> Self {
        Self {
            client: Arc::new(client),
            assistant_id,
            api_key_for_logging: None,
        }
    }

    fn masked_key(&self) -> String {
        self.api_key_for_logging
            .as_deref()
            .map(mask_token)
            .unwrap_or_else(|| "***".to_string())
    }
}

/// Concatenates the text parts of an assistant message's content in order.
/// Non-text parts (images, refusals) contribute nothing.
pub fn extract_text(content: &[MessageContent]) -> String {
    let mut out = String::new();
    for part in content {
        if let MessageContent::Text(text_part) = part {
            out.push_str(&text_part.text.value);
        }
    }
    out
}

#[async_trait]
impl AssistantService for AssistantClient {
    async fn create_thread(&self) -> anyhow::Result<String> {
        let request = CreateThreadRequestArgs::default().build()?;
        let thread = self.client.threads().create(request).await?;
        tracing::info!(
            thread_id = %thread.id,
            api_key = %self.masked_key(),
            "Created assistant thread"
        );
        Ok(thread.id)
    }

    async fn post_user_message(&self, thread_id: &str, text: &str) -> anyhow::Result<()> {
        let request = CreateMessageRequestArgs::default()
            .role(MessageRole::User)
            .content(text)
            .build()?;
        self.client
            .threads()
            .messages(thread_id)
            .create(request)
            .await?;
        tracing::info!(
            thread_id = %thread_id,
            text_len = text.len(),
            "Posted user message to thread"
        );
        Ok(())
    }

    async fn start_run(&self, thread_id: &str) -> anyhow::Result<String> {
        let request = CreateRunRequestArgs::default()
            .assistant_id(&self.assistant_id)
            .build()?;

        if let Ok(json) = serde_json::to_string(&request) {
            tracing::debug!(thread_id = %thread_id, request_json = %json, "Assistant run request");
        }

        let run = self.client.threads().runs(thread_id).create(request).await?;
        tracing::info!(
            thread_id = %thread_id,
            run_id = %run.id,
            assistant_id = %self.assistant_id,
            "Started assistant run"
        );
        Ok(run.id)
    }

    async fn run_state(&self, thread_id: &str, run_id: &str) -> anyhow::Result<RunState> {
        let run = self
            .client
            .threads()
            .runs(thread_id)
            .retrieve(run_id)
            .await?;

        let state = match run.status {
            RunStatus::Completed => RunState::Completed,
            RunStatus::Queued | RunStatus::InProgress => RunState::Pending,
            other => RunState::Failed(format!("{:?}", other)),
        };
        tracing::debug!(
            thread_id = %thread_id,
            run_id = %run_id,
            state = ?state,
            "Retrieved run state"
        );
        Ok(state)
    }

    async fn latest_assistant_reply(&self, thread_id: &str) -> anyhow::Result<Option<String>> {
        // The API lists messages newest first; the first assistant-role entry is the reply.
        let page = self
            .client
            .threads()
            .messages(thread_id)
            .list(&[("limit", "20")])
            .await?;

        for message in &page.data {
            if matches!(message.role, MessageRole::Assistant) {
                let text = extract_text(&message.content);
                if text.trim().is_empty() {
                    return Ok(None);
                }
                tracing::info!(
                    thread_id = %thread_id,
                    message_id = %message.id,
                    reply_len = text.len(),
                    "Fetched assistant reply"
                );
                return Ok(Some(text));
            }
        }

        Ok(None)
    }
}
