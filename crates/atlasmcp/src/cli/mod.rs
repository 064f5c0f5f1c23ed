//! Command line access to the same operations the MCP server exposes.

pub mod confluence;
pub mod jira;

use crate::prelude::{println, *};
use atlasmcp_core::envelope::is_error_envelope;
use serde_json::Value;

/// Fail on an error envelope, otherwise decode it.
///
/// The returned error carries the envelope text so the exit report shows
/// exactly what a tool caller would have received.
fn expect_success(text: &str) -> Result<Value> {
    if is_error_envelope(text) {
        return Err(eyre!("{text}"));
    }

    serde_json::from_str(text).wrap_err("Failed to decode tool output")
}

/// Print an envelope as-is, still failing on error envelopes.
fn print_envelope(text: &str) -> Result<()> {
    expect_success(text)?;
    println!("{text}");
    Ok(())
}

fn text_of(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Parse a `--fields` style argument that must be a JSON object.
fn parse_json_object(raw: &str, flag: &str) -> Result<Value> {
    let value: Value =
        serde_json::from_str(raw).wrap_err_with(|| f!("{flag} must be valid JSON"))?;

    if !value.is_object() {
        return Err(eyre!("{flag} must be a JSON object"));
    }

    Ok(value)
}
