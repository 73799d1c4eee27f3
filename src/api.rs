//! Text-generation API interaction.
//!
//! This module talks to an OpenAI-compatible `/chat/completions` endpoint.
//! Each classification is a single non-streaming request carrying one
//! user-role message; the response's first choice is the analysis text.
//!
//! # Architecture
//!
//! Generation sits behind a trait so the pipeline can be driven by a stub:
//! - [`Generate`]: Core trait defining async text generation
//! - [`ChatClient`]: The HTTP implementation bound to one endpoint and model
//!
//! Requests carry a bounded timeout and are never retried automatically; a
//! failed call surfaces as an error and the caller degrades that one
//! classification rather than aborting the run.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};
use crate::utils::truncate_for_log;

/// Trait for async text generation.
///
/// Implementors send a prompt to a language model and return the completion
/// text. This abstraction keeps the classifier testable with deterministic
/// doubles.
pub trait Generate {
    /// Send a prompt and receive the completion text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// HTTP client for an OpenAI-compatible chat completions endpoint.
///
/// Holds the endpoint base URL, the credential, and the model identifier;
/// everything else about a request is fixed (one user message, one choice,
/// no streaming).
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// Build a client with a bounded per-request timeout.
    pub fn new(
        base_url: &str,
        api_key: String,
        model: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        })
    }
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl Generate for ChatClient {
    #[instrument(level = "info", skip_all)]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let t0 = Instant::now();
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        let dt = t0.elapsed();

        if !status.is_success() {
            warn!(
                %status,
                elapsed_ms = dt.as_millis(),
                body = %truncate_for_log(&body, 300),
                "Generation request rejected"
            );
            return Err(Error::Generation(format!(
                "HTTP {status}: {}",
                truncate_for_log(&body, 300)
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Generation(format!(
                "unparseable response ({e}): {}",
                truncate_for_log(&body, 300)
            ))
        })?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Generation("response contained no choices".to_string()))?;

        debug!(
            elapsed_ms = dt.as_millis(),
            bytes = content.len(),
            "Generation succeeded"
        );
        Ok(content)
    }
}
