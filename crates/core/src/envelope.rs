//! Tool-facing JSON envelopes
//!
//! Every tool returns a string: either a projection of the remote entity or an
//! error object carrying an `error` field plus the inputs needed to correlate
//! the failure with its call. Both are rendered with 2-space indentation.

use serde::Serialize;
use serde_json::{Map, Value};

/// Ordered JSON object under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an error envelope.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new().with("error", message.into())
    }

    /// Start a success envelope with a `message` field.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new().with("message", message.into())
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Insert any serializable value. Values that fail to serialize become `null`.
    pub fn with_serialized<T: Serialize>(self, key: &str, value: &T) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.with(key, value)
    }

    pub fn is_error(&self) -> bool {
        self.0.contains_key("error")
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn render(self) -> String {
        render(&self.into_value())
    }
}

/// Render any serializable value as pretty JSON.
pub fn render<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        let fallback = Envelope::error(format!("Failed to serialize response: {e}")).into_value();
        fallback.to_string()
    })
}

/// True when a rendered envelope is an error object.
pub fn is_error_envelope(rendered: &str) -> bool {
    serde_json::from_str::<Value>(rendered)
        .ok()
        .and_then(|value| value.as_object().map(|map| map.contains_key("error")))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_envelope_keeps_insertion_order() {
        let rendered = Envelope::error("Failed to get issue ABC-1: boom")
            .with("issue_key", "ABC-1")
            .render();

        assert_eq!(
            rendered,
            "{\n  \"error\": \"Failed to get issue ABC-1: boom\",\n  \"issue_key\": \"ABC-1\"\n}"
        );
    }

    #[test]
    fn test_success_envelope_with_payload() {
        let envelope = Envelope::message("Issue created successfully")
            .with("issue", json!({ "key": "ABC-2" }));

        assert!(!envelope.is_error());
        assert_eq!(
            envelope.into_value(),
            json!({ "message": "Issue created successfully", "issue": { "key": "ABC-2" } })
        );
    }

    #[test]
    fn test_render_uses_two_space_indentation() {
        let rendered = render(&json!({ "key": "ABC-1", "fields": { "summary": "x" } }));

        assert_eq!(
            rendered,
            "{\n  \"key\": \"ABC-1\",\n  \"fields\": {\n    \"summary\": \"x\"\n  }\n}"
        );
    }

    #[test]
    fn test_render_keeps_non_ascii() {
        assert_eq!(render(&json!("résumé")), "\"résumé\"");
    }

    #[test]
    fn test_is_error_envelope() {
        assert!(is_error_envelope(&Envelope::error("nope").render()));
        assert!(!is_error_envelope("[]"));
        assert!(!is_error_envelope("{\"success\": true}"));
        assert!(!is_error_envelope("not json"));
    }
}
