//! Extraction of JSON payloads embedded in free-form model output.
//!
//! The structured prompts ask the model to answer with a JSON object, but
//! nothing on the provider side enforces that shape; replies routinely wrap
//! the object in prose. Extraction takes the first balanced `{...}` block
//! and parses it.

use crate::error::GenerationError;
use serde::de::DeserializeOwned;

/// Returns the first balanced `{...}` block in `text`, if any.
///
/// Brace counting tracks string literals and escapes, so braces inside
/// quoted values do not unbalance the block.
pub fn first_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
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

/// Parses the first embedded JSON object in `text` into `T`.
///
/// `context` names the expected payload ("question", "solution") for the
/// error message. Parse failures are terminal; the retry loop never sees
/// them.
pub fn parse_embedded<T: DeserializeOwned>(
    text: &str,
    context: &str,
) -> Result<T, GenerationError> {
    let block = first_json_block(text)
        .ok_or_else(|| GenerationError::parse(format!("Failed to parse {} format", context)))?;

    serde_json::from_str(block).map_err(|err| {
        tracing::error!("Malformed {} JSON from model: {}", context, err);
        GenerationError::parse(format!("Failed to parse {} format", context))
    })
}
