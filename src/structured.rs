//! Extraction of typed values from free-form model replies.
//!
//! Models are asked to answer with a fenced YAML or JSON block; replies in
//! the wild also arrive with anonymous fences, bare YAML, or a JSON object
//! buried in prose. The extractor tries those shapes in order and
//! deserializes the first payload it finds. Failures here are
//! [`ExtractError`]s, a separate type from transport-level
//! [`LlmError`](crate::llm::LlmError) so callers can retry the two cases
//! differently.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Why a reply could not be turned into the requested type.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The reply contains nothing that looks like a structured payload.
    #[error("no structured payload found in response")]
    MissingPayload,

    /// A YAML payload was found but did not match the expected shape.
    #[error("yaml payload did not match the expected shape: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON payload was found but did not match the expected shape.
    #[error("json payload did not match the expected shape: {0}")]
    Json(#[from] serde_json::Error),
}

/// The body of the first ```` ```<lang> ```` fence, if present.
pub fn fenced_block<'a>(response: &'a str, lang: &str) -> Option<&'a str> {
    let marker = format!("```{lang}");
    let start = response.find(&marker)? + marker.len();
    let rest = &response[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// The body of the first fence regardless of language tag.
///
/// The opening line (which may carry a language tag) is skipped.
pub fn anonymous_block(response: &str) -> Option<&str> {
    let start = response.find("```")? + 3;
    let rest = &response[start..];
    let body_start = rest.find('\n')? + 1;
    let body = &rest[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// The first brace-balanced JSON object in the reply, if any.
pub fn balanced_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let mut depth = 0usize;
    for (offset, ch) in response[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&response[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse the structured payload of a model reply into `T`.
///
/// Candidate payloads are tried in order: a `yaml`-tagged fence, any
/// anonymous fence (parsed as YAML, which also accepts JSON), a
/// `json`-tagged fence or embedded JSON object, and finally the bare reply
/// when it looks like YAML. The first candidate that deserializes wins; if
/// candidates existed but none matched, the last shape error is returned.
pub fn extract_structured<T: DeserializeOwned>(response: &str) -> Result<T, ExtractError> {
    let mut last_err: Option<ExtractError> = None;

    if let Some(block) = fenced_block(response, "yaml").or_else(|| anonymous_block(response)) {
        match serde_yaml::from_str(block) {
            Ok(value) => return Ok(value),
            Err(error) => last_err = Some(error.into()),
        }
    }

    if let Some(block) = fenced_block(response, "json").or_else(|| balanced_json_object(response))
    {
        match serde_json::from_str(block) {
            Ok(value) => return Ok(value),
            Err(error) => last_err = Some(error.into()),
        }
    }

    let bare = response.trim();
    if !bare.is_empty() && bare.contains(':') && !bare.starts_with("```") {
        match serde_yaml::from_str(bare) {
            Ok(value) => return Ok(value),
            Err(error) => {
                if last_err.is_none() {
                    last_err = Some(error.into());
                }
            }
        }
    }

    Err(last_err.unwrap_or(ExtractError::MissingPayload))
}
