use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Upper bound on quote-strip/unescape rounds before giving up on JSON.
pub const MAX_UNESCAPE_PASSES: usize = 3;

pub const FALLBACK_SUGGESTIONS: &str =
    "The AI response could not be parsed; suggestions are unavailable.";
pub const NO_INSIGHTS: &str = "No insights found.";
pub const NO_SUGGESTIONS: &str = "No suggestions found.";
pub const NO_SUMMARY: &str = "No summary available.";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub insights: String,
    pub suggestions: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub success: bool,
    pub summary: String,
}

/// Result of running the extraction stages over a piece of AI text.
#[derive(Clone, Debug, PartialEq)]
pub enum Extraction {
    Object(Map<String, Value>),
    Text(String),
}

#[derive(Debug)]
enum Stage {
    FenceStripped(String),
    Unescaped { text: String, pass: usize },
    Balanced(String),
    Parsed(Map<String, Value>),
    Fallback,
}

/// Runs the stages fence-stripped → unescaped(n) → balanced → parsed | fallback
/// over raw AI text.
pub fn extract(text: &str) -> Extraction {
    let cleaned = strip_fence(text).to_string();
    let mut stage = Stage::FenceStripped(cleaned.clone());
    loop {
        stage = match stage {
            Stage::FenceStripped(text) => Stage::Unescaped { text, pass: 0 },
            Stage::Unescaped { text, pass } => match parse_lenient(&text) {
                Some(Value::Object(map)) => Stage::Parsed(map),
                // double-encoded: the JSON was itself a string holding JSON
                Some(Value::String(inner)) if pass < MAX_UNESCAPE_PASSES => Stage::Unescaped {
                    text: strip_fence(&inner).to_string(),
                    pass: pass + 1,
                },
                _ if pass < MAX_UNESCAPE_PASSES => {
                    let next = unescape_once(&text);
                    if next == text {
                        Stage::Balanced(text)
                    } else {
                        Stage::Unescaped {
                            text: next,
                            pass: pass + 1,
                        }
                    }
                }
                _ => Stage::Balanced(text),
            },
            Stage::Balanced(text) => {
                match first_balanced_object(&text).or_else(|| first_balanced_object(&cleaned)) {
                    Some(map) => Stage::Parsed(map),
                    None => Stage::Fallback,
                }
            }
            Stage::Parsed(map) => return Extraction::Object(map),
            Stage::Fallback => return Extraction::Text(cleaned),
        };
    }
}

pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    match extract(text) {
        Extraction::Object(map) => Some(map),
        Extraction::Text(_) => None,
    }
}

/// Turns whatever the analyze endpoint answered into displayable text.
pub fn normalize_analysis(payload: &Value) -> Analysis {
    let analysis = match payload {
        Value::Object(map) => from_map(map),
        Value::String(text) => match extract(text) {
            Extraction::Object(map) => from_map(&map),
            Extraction::Text(cleaned) => fallback(cleaned),
        },
        Value::Null => Analysis::default(),
        Value::Array(_) => Analysis {
            insights: extract_text(payload),
            suggestions: String::new(),
        },
        other => fallback(other.to_string()),
    };
    finish(analysis)
}

pub fn normalize_summary(payload: &Value) -> Summary {
    let mut summary = match payload {
        Value::Object(map) => summary_from_map(map),
        Value::String(text) => match extract(text) {
            Extraction::Object(map) => summary_from_map(&map),
            Extraction::Text(cleaned) => Summary {
                success: !cleaned.trim().is_empty(),
                summary: cleaned,
            },
        },
        Value::Null => Summary::default(),
        other => Summary {
            success: true,
            summary: extract_text(other),
        },
    };
    if summary.summary.trim().is_empty() {
        summary.summary = NO_SUMMARY.to_string();
    }
    summary.summary = unescape_newlines(summary.summary.trim());
    summary
}

pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\r\\n", "\n").replace("\\n", "\n")
}

/// Reduces any JSON value to text: arrays become one line per item, objects
/// their own text field or pretty JSON.
pub fn extract_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(extract_text)
            .filter(|item| !item.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) => {
            for key in ["insights", "suggestions", "summary", "text", "content"] {
                if let Some(text) = map.get(key).and_then(|v| v.as_str()) {
                    return text.to_string();
                }
            }
            serde_json::to_string_pretty(value).unwrap_or_default()
        }
        other => other.to_string(),
    }
}

fn from_map(map: &Map<String, Value>) -> Analysis {
    Analysis {
        insights: map.get("insights").map(extract_text).unwrap_or_default(),
        suggestions: map.get("suggestions").map(extract_text).unwrap_or_default(),
    }
}

fn summary_from_map(map: &Map<String, Value>) -> Summary {
    let summary = ["summary", "text", "content"]
        .iter()
        .find_map(|key| map.get(*key))
        .map(extract_text)
        .unwrap_or_default();
    Summary {
        success: map
            .get("success")
            .and_then(|v| v.as_bool())
            .unwrap_or(!summary.trim().is_empty()),
        summary,
    }
}

fn fallback(cleaned: String) -> Analysis {
    if cleaned.trim().is_empty() {
        return Analysis::default();
    }
    warn!(len = cleaned.len(), "ai response not structured, showing raw text");
    Analysis {
        insights: cleaned,
        suggestions: FALLBACK_SUGGESTIONS.to_string(),
    }
}

fn finish(mut analysis: Analysis) -> Analysis {
    if analysis.insights.trim().is_empty() && analysis.suggestions.trim().is_empty() {
        debug!("ai response had neither insights nor suggestions");
        analysis.insights = NO_INSIGHTS.to_string();
        analysis.suggestions = NO_SUGGESTIONS.to_string();
    }
    Analysis {
        insights: unescape_newlines(analysis.insights.trim()),
        suggestions: unescape_newlines(analysis.suggestions.trim()),
    }
}

fn strip_fence(text: &str) -> &str {
    let start = match text.find("```") {
        Some(idx) => idx,
        None => return text.trim(),
    };
    let mut body = &text[start + 3..];
    if body.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) {
        body = &body[4..];
    }
    if let Some(nl) = body.find('\n') {
        if body[..nl].trim().chars().all(|c| c.is_ascii_alphanumeric()) {
            body = &body[nl + 1..];
        }
    }
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

fn unescape_once(text: &str) -> String {
    let trimmed = text.trim();
    let inner = ['"', '\'']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('n') => {
                out.push('\n');
                chars.next();
            }
            Some('"') => {
                out.push('"');
                chars.next();
            }
            Some('\\') => {
                out.push('\\');
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

fn parse_lenient(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }
    let repaired = escape_controls_in_strings(text);
    if repaired == text {
        return None;
    }
    serde_json::from_str::<Value>(&repaired).ok()
}

fn escape_controls_in_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            } else if c == '\n' {
                out.push_str("\\n");
                continue;
            } else if c == '\r' {
                out.push_str("\\r");
                continue;
            } else if c == '\t' {
                out.push_str("\\t");
                continue;
            }
        } else if c == '"' {
            in_string = true;
        }
        out.push(c);
    }
    out
}

fn first_balanced_object(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
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
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &text[start..start + offset + 1];
                    return match parse_lenient(candidate) {
                        Some(Value::Object(map)) => Some(map),
                        _ => None,
                    };
                }
            }
            _ => {}
        }
    }
    None
}
