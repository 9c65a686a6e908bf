//! Repair and validation of generated proposal JSON.
//!
//! Generated text is pushed through a fixed sequence of pure string stages.
//! After every stage the result is strictly parsed; the first stage that
//! yields valid JSON wins. Already-valid input is returned untouched.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// One string-to-string repair stage.
type Stage = fn(&str) -> String;

const STAGES: &[(&str, Stage)] = &[
    ("strip_code_fences", strip_code_fences),
    ("normalize_quotes", normalize_quotes),
    ("remove_trailing_commas", remove_trailing_commas),
    ("balance_delimiters", balance_delimiters),
    ("extract_first_array", extract_first_array),
];

fn parses(candidate: &str) -> bool {
    serde_json::from_str::<Value>(candidate).is_ok()
}

/// Repair `raw` into valid JSON text, or `None` when every stage fails.
#[must_use]
pub fn repair(raw: &str) -> Option<String> {
    if parses(raw) {
        return Some(raw.to_string());
    }
    let mut current = raw.to_string();
    for (name, stage) in STAGES {
        current = stage(&current);
        if parses(&current) {
            debug!(stage = name, "Generation output repaired");
            return Some(current);
        }
    }
    None
}

/// Remove a surrounding Markdown code fence, language tag included.
#[must_use]
pub fn strip_code_fences(input: &str) -> String {
    let Some(open) = input.find("```") else {
        return input.trim().to_string();
    };
    let after = &input[open + 3..];
    // Skip the language tag line.
    let body_start = after.find('\n').map_or(after.len(), |i| i + 1);
    let tag = after[..body_start].trim();
    let body = if tag.is_empty() || tag.chars().all(char::is_alphanumeric) {
        &after[body_start..]
    } else {
        after
    };
    let body = body.find("```").map_or(body, |close| &body[..close]);
    body.trim().to_string()
}

/// True when the next non-whitespace char after `idx` ends a JSON value.
fn closes_value(chars: &[char], idx: usize) -> bool {
    chars[idx + 1..]
        .iter()
        .find(|c| !c.is_whitespace())
        .map_or(true, |c| matches!(c, ',' | ':' | '}' | ']'))
}

/// Replace typographic quotes and turn single-quoted strings into
/// double-quoted ones. Prose before the first `[` or `{` is copied as is.
#[must_use]
pub fn normalize_quotes(input: &str) -> String {
    let chars: Vec<char> = input
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();

    let start = chars
        .iter()
        .position(|c| matches!(c, '[' | '{'))
        .unwrap_or(chars.len());
    let mut out: String = chars[..start].iter().collect();
    let mut i = start;
    let mut in_double = false;
    while i < chars.len() {
        let c = chars[i];
        if in_double {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 1;
            } else if c == '"' {
                in_double = false;
            }
        } else if c == '"' {
            in_double = true;
            out.push(c);
        } else if c == '\'' {
            out.push('"');
            i += 1;
            while i < chars.len() {
                let s = chars[i];
                if s == '\\' && i + 1 < chars.len() && chars[i + 1] == '\'' {
                    out.push('\'');
                    i += 1;
                } else if s == '\'' && closes_value(&chars, i) {
                    break;
                } else if s == '"' {
                    out.push_str("\\\"");
                } else {
                    out.push(s);
                }
                i += 1;
            }
            out.push('"');
        } else {
            out.push(c);
        }
        i += 1;
    }
    out
}

/// Walk `input` calling `f` for every char outside string literals.
/// `f` returns false to drop the char.
fn retain_outside_strings(input: &str, mut f: impl FnMut(usize, char, &[char]) -> bool) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut in_string = false;
    let mut escaped = false;
    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c == '"' {
            in_string = true;
            out.push(c);
        } else if f(i, c, &chars) {
            out.push(c);
        }
    }
    out
}

/// Drop commas directly before a closing brace or bracket.
#[must_use]
pub fn remove_trailing_commas(input: &str) -> String {
    retain_outside_strings(input, |i, c, chars| {
        if c != ',' {
            return true;
        }
        !chars[i + 1..]
            .iter()
            .find(|c| !c.is_whitespace())
            .is_some_and(|c| matches!(c, '}' | ']'))
    })
}

/// Close an unterminated string, drop unmatched closers and append the
/// closers still open at the end.
#[must_use]
pub fn balance_delimiters(input: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut out = retain_outside_strings(input, |_, c, _| match c {
        '{' => {
            stack.push('}');
            true
        }
        '[' => {
            stack.push(']');
            true
        }
        '}' | ']' => {
            if stack.last() == Some(&c) {
                stack.pop();
                true
            } else {
                false
            }
        }
        _ => true,
    });

    if has_open_string(&out) {
        out.push('"');
    }
    if stack.is_empty() {
        return out;
    }
    let trimmed_len = out.trim_end().trim_end_matches(',').trim_end().len();
    out.truncate(trimmed_len);
    while let Some(closer) = stack.pop() {
        out.push(closer);
    }
    out
}

fn has_open_string(input: &str) -> bool {
    let mut in_string = false;
    let mut escaped = false;
    for c in input.chars() {
        if escaped {
            escaped = false;
        } else if in_string && c == '\\' {
            escaped = true;
        } else if c == '"' {
            in_string = !in_string;
        }
    }
    in_string
}

/// Byte range of the balanced group opening at `start`.
fn balanced_group(input: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in input[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&input[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// The first balanced `[...]` substring. Falls back to the first
/// balanced object, wrapped in an array.
#[must_use]
pub fn extract_first_array(input: &str) -> String {
    let array = input
        .match_indices('[')
        .filter_map(|(i, _)| balanced_group(input, i))
        .find(|candidate| parses(candidate));
    if let Some(array) = array {
        return array.to_string();
    }
    input
        .match_indices('{')
        .filter_map(|(i, _)| balanced_group(input, i))
        .find(|candidate| parses(candidate))
        .map_or_else(|| input.to_string(), |object| format!("[{object}]"))
}

/// A generated proposal after schema validation. Every field has an
/// explicit default.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProposal {
    pub title: String,
    pub question: String,
    pub description: String,
    pub background: String,
    pub resolution_criteria: String,
    pub sources: Vec<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub probability: Option<f64>,
    pub confidence: Option<f64>,
    /// On the `[0, 1]` scale, 0.5 neutral.
    pub sentiment: Option<f64>,
    pub key_factors: Vec<String>,
}

fn text_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Numbers, numeric strings and percentages (`"65%"`, `65`) all map
/// into `[0, 1]`.
fn unit_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = match obj.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok()?,
        _ => return None,
    };
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    if value > 1.0 && value <= 100.0 {
        Some(value / 100.0)
    } else if value <= 1.0 {
        Some(value)
    } else {
        None
    }
}

fn list_field(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Object(o) => o
                    .get("url")
                    .or_else(|| o.get("name"))
                    .or_else(|| o.get("title"))
                    .and_then(Value::as_str)
                    .map(|s| s.trim().to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split([',', ';'])
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

impl RawProposal {
    /// Map one JSON element. Elements without a question are rejected.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let question = text_field(obj, "question");
        if question.is_empty() {
            return None;
        }
        let end_date = Some(text_field(obj, "end_date")).filter(|s| !s.is_empty());
        let category = Some(text_field(obj, "category")).filter(|s| !s.is_empty());
        Some(Self {
            title: text_field(obj, "title"),
            description: text_field(obj, "description"),
            background: text_field(obj, "background"),
            resolution_criteria: text_field(obj, "resolution_criteria"),
            sources: list_field(obj, "sources"),
            end_date,
            category,
            probability: unit_field(obj, "probability"),
            confidence: unit_field(obj, "confidence"),
            sentiment: unit_field(obj, "sentiment"),
            key_factors: list_field(obj, "key_factors"),
            question,
        })
    }
}

/// Repair `raw` and map it into proposals. A lone object counts as a
/// one-element array.
///
/// # Errors
/// Returns [`Error::Parse`] when no stage produces JSON, or when the JSON
/// is neither an array nor an object.
pub fn parse_proposals(raw: &str) -> Result<Vec<RawProposal>> {
    let repaired = repair(raw).ok_or_else(|| Error::Parse("unrepairable generation output".into()))?;
    let value: Value = serde_json::from_str(&repaired)?;
    let elements = match value {
        Value::Array(items) => items,
        object @ Value::Object(_) => vec![object],
        other => {
            return Err(Error::Parse(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            )))
        }
    };
    Ok(elements.iter().filter_map(RawProposal::from_value).collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
