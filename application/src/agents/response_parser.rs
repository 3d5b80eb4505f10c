//! JSON extraction from model replies
//!
//! Models wrap JSON in code fences or surround it with prose. Replies are
//! tried as-is, then as the first fenced block, then as the span from the
//! first `{` to the last `}`.

use serde_json::Value;

/// Extract the JSON object or array from a model reply.
///
/// Returns `None` if no candidate parses.
///
/// # Example
///
/// ```
/// use roundtable_application::agents::extract_json;
///
/// let reply = "Sure:\n```json\n{\"decision\": \"approve\"}\n```";
/// let value = extract_json(reply).unwrap();
/// assert_eq!(value["decision"], "approve");
/// ```
pub fn extract_json(reply: &str) -> Option<Value> {
    let reply = reply.trim();
    if reply.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(reply) {
        return Some(value);
    }

    if let Some(block) = fenced_block(reply)
        && let Ok(value) = serde_json::from_str::<Value>(&block)
    {
        return Some(value);
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        let (Some(start), Some(end)) = (reply.find(open), reply.rfind(close)) else {
            continue;
        };
        if end <= start {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<Value>(&reply[start..=end]) {
            return Some(value);
        }
    }

    None
}

/// Contents of the first ```` ``` ```` or ```` ```json ```` block.
fn fenced_block(reply: &str) -> Option<String> {
    let mut in_block = false;
    let mut block = String::new();

    for line in reply.lines() {
        let trimmed = line.trim();
        if !in_block && (trimmed == "```" || trimmed == "```json") {
            in_block = true;
            block.clear();
        } else if in_block && trimmed == "```" {
            return Some(block);
        } else if in_block {
            block.push_str(line);
            block.push('\n');
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let value = extract_json(r#"{"findings": []}"#).unwrap();
        assert!(value["findings"].is_array());
    }

    #[test]
    fn test_fenced_json_with_preamble() {
        let reply = "Here is my analysis.\n\n```json\n{\"flags\": [\"risk\"]}\n```\nThanks.";
        let value = extract_json(reply).unwrap();
        assert_eq!(value["flags"][0], "risk");
    }

    #[test]
    fn test_embedded_object() {
        let reply = "My vote: {\"decision\": \"dissent\", \"reason\": \"weak\"} -- end";
        let value = extract_json(reply).unwrap();
        assert_eq!(value["decision"], "dissent");
    }

    #[test]
    fn test_unparseable() {
        assert!(extract_json("").is_none());
        assert!(extract_json("I approve of this plan.").is_none());
        assert!(extract_json("} backwards {").is_none());
    }
}
