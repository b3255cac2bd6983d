//! In-memory representation of a schema document.
//!
//! A schema document is JSON with a top-level `features` array of field
//! descriptors carrying at least `name` and `allowed_values`. The document is
//! held as a raw `serde_json::Value` so that rewriting it touches nothing but
//! the `allowed_values` entries: unknown keys, key order, and feature order
//! all survive a load/save round trip (`preserve_order` is enabled on
//! serde_json for exactly this reason).

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;

pub const FEATURES_KEY: &str = "features";
pub const NAME_KEY: &str = "name";
pub const ALLOWED_VALUES_KEY: &str = "allowed_values";

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDoc {
    root: JsonValue,
}

impl SchemaDoc {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Reading schema file {path:?}"))?;
        Self::parse(&text).with_context(|| format!("Parsing schema file {path:?}"))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let root: JsonValue = serde_json::from_str(text).context("Parsing schema JSON")?;
        if !root.get(FEATURES_KEY).is_some_and(JsonValue::is_array) {
            bail!("Schema document has no top-level '{FEATURES_KEY}' array");
        }
        Ok(Self { root })
    }

    pub fn features(&self) -> &[JsonValue] {
        match self.root.get(FEATURES_KEY).and_then(JsonValue::as_array) {
            Some(features) => features,
            None => &[],
        }
    }

    pub(crate) fn features_mut(&mut self) -> &mut Vec<JsonValue> {
        // Presence of the array is validated in parse().
        self.root
            .get_mut(FEATURES_KEY)
            .and_then(JsonValue::as_array_mut)
            .expect("features array validated at parse time")
    }

    pub fn allowed_values(&self, field: &str) -> Option<&JsonValue> {
        self.features()
            .iter()
            .find(|feature| feature.get(NAME_KEY).and_then(JsonValue::as_str) == Some(field))
            .and_then(|feature| feature.get(ALLOWED_VALUES_KEY))
    }

    /// Serializes with stable 2-space indentation and a trailing newline.
    pub fn to_pretty_string(&self) -> Result<String> {
        let mut text =
            serde_json::to_string_pretty(&self.root).context("Serializing schema JSON")?;
        text.push('\n');
        Ok(text)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = self.to_pretty_string()?;
        fs::write(path, text).with_context(|| format!("Writing schema file {path:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
  "dataset": "encounters",
  "features": [
    { "name": "admission_type_id", "dtype": "int", "allowed_values": [] },
    { "name": "race", "allowed_values": ["?"] }
  ]
}"#;

    #[test]
    fn parse_requires_a_features_array() {
        let err = SchemaDoc::parse(r#"{"columns": []}"#).unwrap_err();
        assert!(err.to_string().contains("features"));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(SchemaDoc::parse("{not json").is_err());
    }

    #[test]
    fn allowed_values_looks_up_by_field_name() {
        let schema = SchemaDoc::parse(SAMPLE).expect("parse sample");
        assert_eq!(
            schema.allowed_values("race"),
            Some(&serde_json::json!(["?"]))
        );
        assert_eq!(schema.allowed_values("weight"), None);
    }

    #[test]
    fn pretty_output_keeps_key_order_and_ends_with_newline() {
        let schema = SchemaDoc::parse(SAMPLE).expect("parse sample");
        let text = schema.to_pretty_string().expect("serialize");
        assert!(text.ends_with('\n'));
        assert!(!text.ends_with("\n\n"));
        // "dataset" precedes "features" exactly as in the input.
        let dataset_at = text.find("\"dataset\"").expect("dataset key");
        let features_at = text.find("\"features\"").expect("features key");
        assert!(dataset_at < features_at);
        // "name" precedes "dtype" inside the first feature.
        let name_at = text.find("\"name\"").expect("name key");
        let dtype_at = text.find("\"dtype\"").expect("dtype key");
        assert!(name_at < dtype_at);
    }
}
