//! Locating a JSON object inside a model reply.
//!
//! Models asked for JSON sometimes wrap it in a fenced block or add a
//! sentence before it.

/// Returns the JSON object text in `reply`, if one can be found.
///
/// Checks a fenced code block first, then the first balanced `{...}`.
pub fn extract_json_object(reply: &str) -> Option<&str> {
    let trimmed = reply.trim();

    if let Some(block) = from_code_block(trimmed) {
        return Some(block);
    }

    let start = trimmed.find('{')?;
    balanced_object(trimmed, start)
}

fn from_code_block(s: &str) -> Option<&str> {
    for fence in ["```json", "```"] {
        if let Some(start) = s.find(fence) {
            let body_start = start + fence.len();
            if let Some(len) = s[body_start..].find("```") {
                let body = s[body_start..body_start + len].trim();
                if body.starts_with('{') {
                    return Some(body);
                }
            }
        }
    }
    None
}

fn balanced_object(s: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&s[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
