//! Gemini `responseSchema` generation.
//!
//! Gemini accepts an OpenAPI-subset `Schema` object: upper-case `type`
//! names, no `$ref`, and a short list of keywords. The schema is derived from
//! the Rust types with `schemars` (subschemas inlined) and then reduced to
//! that subset.

use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde_json::{json, Map, Value};

use super::TopicDocument;

/// Keywords copied through unchanged when present.
const PASSTHROUGH_KEYS: &[&str] = &["description", "nullable", "enum", "required"];

/// Build the Gemini response schema for any `JsonSchema` type.
pub fn response_schema_for<T: JsonSchema>() -> Value {
    let settings = SchemaSettings::openapi3().with(|s| {
        s.inline_subschemas = true;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();
    let value = serde_json::to_value(&root).unwrap_or_else(|_| json!({}));
    to_gemini_schema(&value)
}

impl TopicDocument {
    /// Response schema constraining generation to a [`TopicDocument`].
    pub fn response_schema() -> Value {
        response_schema_for::<TopicDocument>()
    }
}

/// Reduce a JSON Schema node to Gemini's schema subset.
pub fn to_gemini_schema(node: &Value) -> Value {
    let Some(obj) = node.as_object() else {
        return json!({});
    };

    // A single-element allOf is how schemars attaches metadata to a subschema.
    if let Some(Value::Array(all_of)) = obj.get("allOf") {
        if let [inner] = all_of.as_slice() {
            let mut merged = to_gemini_schema(inner);
            if let (Some(out), Some(desc)) = (merged.as_object_mut(), obj.get("description")) {
                out.insert("description".into(), desc.clone());
            }
            return merged;
        }
    }

    let mut out = Map::new();
    match obj.get("type") {
        Some(Value::String(t)) => {
            out.insert("type".into(), json!(t.to_uppercase()));
        }
        Some(Value::Array(types)) => {
            let mut nullable = false;
            for t in types.iter().filter_map(Value::as_str) {
                if t == "null" {
                    nullable = true;
                } else if !out.contains_key("type") {
                    out.insert("type".into(), json!(t.to_uppercase()));
                }
            }
            if nullable {
                out.insert("nullable".into(), json!(true));
            }
        }
        _ => {}
    }

    for key in PASSTHROUGH_KEYS {
        if let Some(v) = obj.get(*key) {
            out.insert((*key).into(), v.clone());
        }
    }

    if let Some(Value::Object(props)) = obj.get("properties") {
        let converted: Map<String, Value> = props
            .iter()
            .map(|(name, schema)| (name.clone(), to_gemini_schema(schema)))
            .collect();
        out.insert("properties".into(), Value::Object(converted));
    }

    if let Some(items) = obj.get("items") {
        out.insert("items".into(), to_gemini_schema(items));
    }

    Value::Object(out)
}
