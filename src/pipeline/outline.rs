//! Outline parsing and the fixed fallback outline.

/// Remove a surrounding Markdown code fence (```json ... ```), if any.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", ...) on the opening line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a model response into section titles.
///
/// Accepts a JSON array of strings, optionally fenced. When the strict parse
/// fails, the first `[`..`]` span is tried instead, so an array wrapped in a
/// sentence of prose still parses; that span must be a valid JSON string array.
/// Returns `None` when nothing usable is found; blank titles are dropped.
pub fn parse_outline(response: &str) -> Option<Vec<String>> {
    let body = strip_code_fences(response);

    let titles: Vec<String> = match serde_json::from_str::<Vec<String>>(body) {
        Ok(titles) => titles,
        Err(_) => {
            let start = body.find('[')?;
            let end = body.rfind(']')?;
            if end <= start {
                return None;
            }
            serde_json::from_str::<Vec<String>>(&body[start..=end]).ok()?
        }
    };

    let titles: Vec<String> = titles
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    (!titles.is_empty()).then_some(titles)
}

/// Eight-entry outline used when the model never returns a parseable one.
pub fn default_outline(topic: &str) -> Vec<String> {
    let topic = topic.trim();
    vec![
        "Introduction".to_string(),
        format!("What Is {}?", topic),
        format!("Why {} Matters", topic),
        format!("Key Benefits of {}", topic),
        format!("How to Get Started with {}", topic),
        "Common Mistakes to Avoid".to_string(),
        "Expert Tips and Best Practices".to_string(),
        "Conclusion".to_string(),
    ]
}
