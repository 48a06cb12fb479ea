//! Generation gateway: prompt construction and schema-constrained decode.
//!
//! The gateway owns the two fixed prompts (topic blueprint and mentor chat)
//! and is the only place the topic schema is enforced.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ArchError, Result};
use crate::providers::{GenerationRequest, LlmProvider};
use crate::topic::TopicDocument;

/// Context label used when a chat request names no topic.
pub const DEFAULT_CONTEXT_TITLE: &str = "System Design";

/// Prompt asking the model for a full system design of `topic_id`.
pub fn topic_prompt(topic_id: &str) -> String {
    format!(
        r#"Act as a Distinguished Software Architect. Generate an exhaustive system design for: "{topic_id}".

YOU MUST RETURN VALID JSON. STICK TO THE SCHEMA.

1. REQUIREMENTS: Provide 5 Functional (fr) and 5 Non-Functional (nfr) requirements.
2. DESIGN PATTERNS: Identify 3-4 key Architectural or Design Patterns used (e.g., CQRS, Publisher-Subscriber, Circuit Breaker).
   - For each: Name, WHY it was chosen, and the BENEFIT it provides to the system.
3. HLD Rationale: Provide 5 structured phases (fullExplanation).
4. Simulation: Define 6-8 component nodes with (x,y) coordinates and 3 traffic scenarios (useCases).
5. LLD Implementations: Provide 3 high-quality implementations (TypeScript, Go, and Java). Focus on Clean Architecture.
6. DIAGRAMS: Provide valid Mermaid.js strings for HLD and Sequence diagrams."#
    )
}

/// System instruction for the mentor chat.
///
/// An empty title falls back to the default; any other title is used as given.
pub fn mentor_instruction(context_title: Option<&str>) -> String {
    let title = context_title
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_CONTEXT_TITLE);
    format!(
        "You are ArchMaster Mentor for {title}. \
         Help the user understand HLD/LLD trade-offs. \
         Always mention design patterns where relevant."
    )
}

/// Stateless front for the model provider.
pub struct Gateway {
    provider: Arc<dyn LlmProvider>,
    topic_schema: Value,
}

impl Gateway {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            topic_schema: TopicDocument::response_schema(),
        }
    }

    /// Model identifier of the backing provider.
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Generate and decode the topic document for `topic_id`.
    pub async fn generate_topic(&self, topic_id: &str) -> Result<TopicDocument> {
        let request = GenerationRequest::new(topic_prompt(topic_id))
            .with_response_schema(self.topic_schema.clone());

        info!(topic_id, "Generating topic document");
        let text = self
            .provider
            .generate(request)
            .await?
            .filter(|t| !t.trim().is_empty())
            .ok_or(ArchError::EmptyResponse)?;

        let document: TopicDocument = serde_json::from_str(&text).map_err(ArchError::Decode)?;
        debug!(topic_id, nodes = document.nodes.len(), "Decoded topic document");
        Ok(document)
    }

    /// One-shot mentor chat. Returns an empty string when the model says nothing.
    pub async fn chat(&self, message: &str, context_title: Option<&str>) -> Result<String> {
        let request = GenerationRequest::new(message)
            .with_system_instruction(mentor_instruction(context_title));
        Ok(self.provider.generate(request).await?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockLlmProvider;
    use crate::topic::tests::sample_document_json;

    fn gateway_with(mock: MockLlmProvider) -> Gateway {
        Gateway::new(Arc::new(mock))
    }

    #[test]
    fn test_topic_prompt_substitutes_topic() {
        let prompt = topic_prompt("rate-limiter");
        assert!(prompt.contains(r#"system design for: "rate-limiter"."#));
        assert!(prompt.contains("YOU MUST RETURN VALID JSON"));
        assert!(prompt.contains("6. DIAGRAMS"));
    }

    #[test]
    fn test_mentor_instruction_uses_title_or_default() {
        let named = mentor_instruction(Some("Uber"));
        assert!(named.starts_with("You are ArchMaster Mentor for Uber."));
        assert!(mentor_instruction(None).contains("Mentor for System Design."));
        assert!(mentor_instruction(Some("")).contains("Mentor for System Design."));
    }

    #[test]
    fn test_mentor_instruction_keeps_padded_title_verbatim() {
        let instruction = mentor_instruction(Some(" Uber "));
        assert!(instruction.starts_with("You are ArchMaster Mentor for  Uber . "), "{instruction}");
        assert!(mentor_instruction(Some("  ")).contains("Mentor for   ."));
    }

    #[tokio::test]
    async fn test_generate_topic_sends_schema_and_decodes() {
        let text = sample_document_json("url-shortener").to_string();
        let mut mock = MockLlmProvider::new();
        mock.expect_generate()
            .withf(|req| {
                req.prompt.contains("url-shortener")
                    && req.system_instruction.is_none()
                    && req
                        .response_schema
                        .as_ref()
                        .is_some_and(|s| s["type"] == "OBJECT")
            })
            .times(1)
            .returning(move |_| Ok(Some(text.clone())));

        let doc = gateway_with(mock)
            .generate_topic("url-shortener")
            .await
            .unwrap();
        assert_eq!(doc.id, "url-shortener");
        assert_eq!(doc.llds[0].language, "Go");
    }

    #[tokio::test]
    async fn test_generate_topic_empty_text_is_empty_response() {
        for reply in [None, Some(String::new()), Some("   ".to_string())] {
            let mut mock = MockLlmProvider::new();
            mock.expect_generate()
                .times(1)
                .returning(move |_| Ok(reply.clone()));
            let err = gateway_with(mock).generate_topic("x").await.unwrap_err();
            assert!(matches!(err, ArchError::EmptyResponse));
        }
    }

    #[tokio::test]
    async fn test_generate_topic_bad_json_is_decode_error() {
        let mut mock = MockLlmProvider::new();
        mock.expect_generate()
            .returning(|_| Ok(Some(r#"{"id": "x", "title": "missing the rest"}"#.to_string())));
        let err = gateway_with(mock).generate_topic("x").await.unwrap_err();
        assert!(matches!(err, ArchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_generate_topic_propagates_provider_error() {
        let mut mock = MockLlmProvider::new();
        mock.expect_generate()
            .returning(|_| Err(ArchError::transport("down")));
        let err = gateway_with(mock).generate_topic("x").await.unwrap_err();
        assert!(matches!(err, ArchError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_chat_includes_context_title() {
        let mut mock = MockLlmProvider::new();
        mock.expect_generate()
            .withf(|req| {
                req.prompt == "What about sharding?"
                    && req
                        .system_instruction
                        .as_deref()
                        .is_some_and(|s| s.contains("Checkout Microservices"))
                    && req.response_schema.is_none()
            })
            .times(1)
            .returning(|_| Ok(Some("Shard by user id.".to_string())));

        let reply = gateway_with(mock)
            .chat("What about sharding?", Some("Checkout Microservices"))
            .await
            .unwrap();
        assert_eq!(reply, "Shard by user id.");
    }

    #[tokio::test]
    async fn test_chat_without_text_returns_empty_string() {
        let mut mock = MockLlmProvider::new();
        mock.expect_generate()
            .withf(|req| {
                req.system_instruction
                    .as_deref()
                    .is_some_and(|s| s.contains(DEFAULT_CONTEXT_TITLE))
            })
            .returning(|_| Ok(None));
        let reply = gateway_with(mock).chat("hello", None).await.unwrap();
        assert_eq!(reply, "");
    }
}
