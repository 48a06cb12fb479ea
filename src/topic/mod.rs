//! Topic document model.
//!
//! [`TopicDocument`] is the structured system-design artifact generated for a
//! topic. Field names on the wire are camelCase, matching what the frontend
//! consumes. The same type drives the Gemini `responseSchema` (see
//! [`schema`]) and the decode of the model's reply, so the schema and the
//! decoder cannot drift apart.

pub mod schema;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Full system-design document for a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicDocument {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub short_description: String,
    /// Functional requirements.
    pub fr: Vec<String>,
    /// Non-functional requirements.
    pub nfr: Vec<String>,
    pub design_patterns: Vec<DesignPattern>,
    /// Ordered explanation phases of the high-level design.
    pub full_explanation: Vec<HldStep>,
    pub nodes: Vec<ComponentNode>,
    pub use_cases: Vec<UseCase>,
    /// Low-level design samples.
    pub llds: Vec<Lld>,
    /// Mermaid flowchart of the high-level design. Not validated.
    #[serde(rename = "mermaidHLD")]
    pub mermaid_hld: String,
    /// Mermaid sequence diagram. Not validated.
    pub mermaid_sequence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DesignPattern {
    pub name: String,
    /// Why the pattern was chosen.
    pub why: String,
    pub benefit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HldStep {
    pub step_title: String,
    pub description: String,
    pub real_time_example: String,
    pub trade_off: String,
}

/// A component placed on the simulation canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComponentNode {
    pub id: String,
    pub name: String,
    /// Component kind, e.g. `client`, `loadbalancer`, `database`.
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UseCase {
    pub id: String,
    pub title: String,
    pub description: String,
    pub sunny_steps: Vec<DataFlow>,
    pub rainy_steps: Vec<DataFlow>,
}

/// One hop of traffic between two component nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DataFlow {
    #[serde(rename = "from")]
    pub from_node: String,
    pub to: String,
    pub label: String,
    /// `success`, `failure` or `pending`.
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Lld {
    pub language: String,
    pub code: String,
    pub explanation: String,
}
