use finsight_models::{FailureKind, ReplyError};
use tracing::debug;

/// Remove every markdown JSON fence marker (```` ```json ```` and ```` ``` ````)
/// wherever it occurs, then trim surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Decode a model reply into JSON.
///
/// Any failure (prose, the unavailability sentinel, truncated output) becomes
/// a [`ReplyError`] carrying `failure_message`. No partial recovery.
pub fn interpret(raw: &str, failure_message: &str) -> Result<serde_json::Value, ReplyError> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(&cleaned).map_err(|e| {
        debug!(error = %e, reply_len = raw.len(), "Reply is not valid JSON");
        ReplyError::new(FailureKind::Decode, failure_message)
    })
}
