//! Pure text stages that run before structured parsing.
//!
//! Both stages are independent of any network code so their heuristics can
//! be unit-tested against adversarial inputs.

/// The bracket shape a reply is expected to carry: a JSON object for the
/// playlist analysis, a JSON array for recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Object,
    Array,
}

impl JsonShape {
    fn open(self) -> char {
        match self {
            JsonShape::Object => '{',
            JsonShape::Array => '[',
        }
    }

    fn close(self) -> char {
        match self {
            JsonShape::Object => '}',
            JsonShape::Array => ']',
        }
    }
}

/// Locates the JSON payload inside a raw model reply.
///
/// Tried in order:
/// 1. the trimmed text already begins and ends with the expected bracket
///    pair - used as-is;
/// 2. a fenced code block (```` ```json ```` or a bare fence) - inner
///    content is used;
/// 3. both an opening and a closing bracket of the expected kind occur
///    somewhere - the slice from the first opening to the last closing
///    bracket is used.
///
/// Returns `None` when none of these apply; the caller treats that as a
/// malformed reply and retries the whole round trip.
pub fn extract_payload(raw: &str, shape: JsonShape) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with(shape.open()) && trimmed.ends_with(shape.close()) {
        return Some(trimmed.to_string());
    }

    if let Some(inner) = fenced_block(trimmed) {
        return Some(inner.to_string());
    }

    let start = trimmed.find(shape.open())?;
    let end = trimmed.rfind(shape.close())?;
    if end > start {
        return Some(trimmed[start..=end].to_string());
    }

    None
}

/// Inner content of the first fenced code block, preferring a `json` tag.
fn fenced_block(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```json") {
        let after = &text[start + 7..];
        if let Some(end) = after.find("```") {
            return Some(after[..end].trim());
        }
    }

    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        if let Some(end) = after.find("```") {
            return Some(after[..end].trim());
        }
    }

    None
}

/// Best-effort textual repair applied before parsing.
///
/// Two fixes, both accepted as lossy heuristics:
/// - single quotes become double quotes (risking apostrophes inside prose
///   fields, which the defaulting stage tolerates);
/// - a missing comma between adjacent object literals (`}{`, with optional
///   whitespace between) is inserted.
pub fn repair_json(text: &str) -> String {
    let quoted = text.replace('\'', "\"");

    let mut repaired = String::with_capacity(quoted.len());
    let chars: Vec<char> = quoted.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        repaired.push(chars[i]);
        if chars[i] == '}' {
            // peek past whitespace for an adjacent object literal
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && chars[j] == '{' {
                repaired.push(',');
            }
        }
        i += 1;
    }
    repaired
}
