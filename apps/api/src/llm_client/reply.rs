//! Reply parsing: turns free model text into typed payloads.
//!
//! The service is asked for one JSON object but may wrap it in prose or code
//! fences. The first balanced `{...}` span is taken as the payload; anything
//! else is a `MalformedResponse`, which callers absorb with placeholder values.

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MalformedResponse {
    #[error("reply contains no JSON object")]
    NoJsonObject,

    #[error("reply JSON did not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Parses the first JSON object found in `text` as `T`.
pub fn parse_reply<T: DeserializeOwned>(text: &str) -> Result<T, MalformedResponse> {
    let span = extract_json_object(text).ok_or(MalformedResponse::NoJsonObject)?;
    Ok(serde_json::from_str(span)?)
}

/// Returns the first balanced `{...}` span in `text`, ignoring braces inside
/// JSON string literals.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let text = strip_json_fences(text);
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
