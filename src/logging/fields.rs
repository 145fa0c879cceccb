//! Field helpers for structured log events

use uuid::Uuid;

/// Maximum characters of prompt text written to a log event
pub const PROMPT_PREVIEW_CHARS: usize = 100;

/// Prompt preview for content logging
///
/// Returns `None` unless content logging is enabled, so prompts never reach
/// the logs by accident. Previews are cut at [`PROMPT_PREVIEW_CHARS`] characters.
///
/// # Examples
///
/// ```
/// use postforge::logging::truncate_prompt;
///
/// assert_eq!(truncate_prompt("Write about tea", false), None);
/// assert_eq!(truncate_prompt("Write about tea", true).as_deref(), Some("Write about tea"));
/// ```
pub fn truncate_prompt(prompt: &str, enable_content_logging: bool) -> Option<String> {
    if !enable_content_logging {
        return None;
    }

    let prompt = prompt.trim();
    if prompt.is_empty() {
        return None;
    }

    Some(truncate_string(prompt, PROMPT_PREVIEW_CHARS))
}

/// Generate a correlation ID for one pipeline run (UUID v4)
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}

// Counts characters, not bytes, so multi-byte text never splits mid-codepoint.
fn truncate_string(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_prompt_disabled() {
        assert!(truncate_prompt("secret", false).is_none());
    }

    #[test]
    fn test_truncate_prompt_empty() {
        assert!(truncate_prompt("   ", true).is_none());
    }

    #[test]
    fn test_truncate_prompt_long() {
        let prompt = "a".repeat(150);
        let preview = truncate_prompt(&prompt, true).unwrap();
        assert_eq!(preview.len(), 103);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_truncate_prompt_multibyte() {
        let prompt = "é".repeat(120);
        let preview = truncate_prompt(&prompt, true).unwrap();
        assert_eq!(preview.chars().count(), 103);
    }

    #[test]
    fn test_generate_run_id_format() {
        let id = generate_run_id();
        // UUID v4 format: xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx
        assert_eq!(id.len(), 36);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_generate_run_id_uniqueness() {
        assert_ne!(generate_run_id(), generate_run_id());
    }
}
