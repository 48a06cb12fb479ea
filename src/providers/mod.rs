//! Model provider seam.
//!
//! [`LlmProvider`] is the single boundary between ArchMaster and a
//! generative model. The gateway builds [`GenerationRequest`]s; providers
//! turn them into wire calls and hand back the reply text.

pub mod gemini;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ArchError, Result};

pub use gemini::GeminiProvider;

/// A one-shot generation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    /// System instruction seeding the conversation.
    pub system_instruction: Option<String>,
    /// The single user turn.
    pub prompt: String,
    /// When set, the reply must be JSON conforming to this schema.
    pub response_schema: Option<Value>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// A generative model reachable over the network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the request and return the reply text.
    ///
    /// `Ok(None)` means the model answered but produced no text.
    async fn generate(&self, request: GenerationRequest) -> Result<Option<String>>;

    /// Model used for every request.
    fn model(&self) -> &str;

    fn name(&self) -> &'static str;
}

/// Map an upstream error status and message into an [`ArchError`].
pub(crate) fn provider_error(status: u16, message: &str) -> ArchError {
    let prefix = match status {
        400 => "bad request",
        401 | 403 => "authentication failed",
        404 => "model not found",
        429 => "rate limited",
        500..=599 => "upstream unavailable",
        _ => "unexpected status",
    };
    ArchError::Provider {
        status: Some(status),
        message: format!("{prefix} ({status}): {message}"),
    }
}
