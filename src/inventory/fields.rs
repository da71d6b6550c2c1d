//! Extraction helpers for upstream field values
//!
//! Hydrated upstream records encode the same logical value in several shapes
//! (plain strings, `{label, value}` selects, `[{id, title}]` links, rich text
//! objects). These helpers flatten them into display strings.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static BR_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Plain string or number rendered as text; anything else is empty
pub fn plain_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Rich text field: a string, or an object with `preview` or `html`
pub fn rich_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(map)) => ["preview", "html"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(Value::as_str))
            .find(|text| !text.is_empty())
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

/// Select/status field label, falling back to the raw value
pub fn select_label(value: Option<&Value>) -> String {
    match value {
        Some(Value::Object(map)) => match map.get("label") {
            Some(Value::String(label)) if !label.is_empty() => label.clone(),
            _ => plain_text(map.get("value")),
        },
        other => plain_text(other),
    }
}

/// Title of the first linked record in a link field
pub fn linked_title(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_array)
        .and_then(|links| links.first())
        .map(|link| plain_text(link.get("title")))
        .unwrap_or_default()
}

/// Whole-dollar USD with thousands separators, e.g. `$125,000`
///
/// Accepts numbers and numeric strings; anything unparseable is empty.
pub fn format_price(value: Option<&Value>) -> String {
    let amount = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace(',', "").trim_start_matches('$').parse::<f64>().ok(),
        _ => None,
    };

    match amount {
        Some(amount) if amount.is_finite() => {
            let rounded = amount.round();
            let sign = if rounded < 0.0 { "-" } else { "" };
            format!("{}${}", sign, group_thousands(rounded.abs() as u64))
        }
        _ => String::new(),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

/// Strip markup, decode common entities, and cut to `max_chars` on a word boundary
pub fn strip_html_and_truncate(html: &str, max_chars: usize) -> String {
    if html.is_empty() {
        return String::new();
    }

    let text = BR_TAG.replace_all(html, " ");
    let text = ANY_TAG.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_chars).collect();
    match truncated.rfind(' ') {
        Some(last_space) if last_space > 0 => format!("{}...", &truncated[..last_space]),
        _ => format!("{}...", truncated),
    }
}
