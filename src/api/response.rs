use crate::api::gateway::Completion;
use crate::api::models::CompletionResponse;
use crate::error::GatewayError;

/// Parse a non-streaming chat-completion body.
///
/// A body that is not a completion document is an error. A well-formed
/// document without usable text in its first choice is `NoAnswer`.
pub fn parse_completion(body: &str) -> Result<Completion, GatewayError> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::Malformed(e.to_string()))?;

    Ok(match extract_content(&response) {
        Some(text) => Completion::Reply(text.to_string()),
        None => Completion::NoAnswer,
    })
}

/// Trimmed content of the first choice, if it has any.
pub fn extract_content(response: &CompletionResponse) -> Option<&str> {
    response
        .choices
        .as_ref()?
        .first()?
        .message
        .as_ref()?
        .content
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
}
