use serde_json::Value;

use crate::domain::{ActionItem, UNCATEGORIZED};

/// Outcome of decoding backend text into a typed value. Both arms carry a
/// usable value; `Fallback` marks that the documented default was substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    Parsed(T),
    Fallback(T),
}

impl<T> Decoded<T> {
    pub fn into_inner(self) -> T {
        match self {
            Decoded::Parsed(value) | Decoded::Fallback(value) => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Decoded::Fallback(_))
    }
}

/// Removes one surrounding Markdown code fence, e.g. ```` ```json ... ``` ````.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening line.
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim().contains(char::is_whitespace) => body.trim(),
        _ => inner.trim(),
    }
}

fn parse_value(raw: &str) -> Option<Value> {
    serde_json::from_str(strip_code_fence(raw)).ok()
}

pub fn decode_category(raw: &str) -> Decoded<String> {
    let category = parse_value(raw).and_then(|value| match value.get("category") {
        Some(Value::String(label)) if !label.trim().is_empty() => Some(label.clone()),
        _ => None,
    });
    match category {
        Some(label) => Decoded::Parsed(label),
        None => Decoded::Fallback(UNCATEGORIZED.to_string()),
    }
}

pub fn decode_action_items(raw: &str) -> Decoded<Vec<ActionItem>> {
    let Some(Value::Array(entries)) = parse_value(raw) else {
        return Decoded::Fallback(Vec::new());
    };

    let items = entries.into_iter().map(ActionItem::from_value).collect();
    Decoded::Parsed(items)
}
