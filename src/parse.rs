use serde_json::Value;

/// Result of reading the model's text as a JSON object
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(Value),
    Unparseable,
}

/// Parse model output that should be a JSON object.
///
/// Tries, in order: the whole text, the span from the first `{` to the last
/// `}` (prose or code fences around the object), and the first
/// brace-balanced span (trailing prose that itself contains braces).
pub fn parse_model_text(text: &str) -> ParseOutcome {
    let candidates = [
        Some(text.trim()),
        extract_json_fragment(text, '{', '}'),
        balanced_object(text),
    ];

    candidates
        .into_iter()
        .flatten()
        .find_map(parse_object)
        .map(ParseOutcome::Parsed)
        .unwrap_or(ParseOutcome::Unparseable)
}

fn parse_object(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(value) if value.is_object() => Some(value),
        _ => None,
    }
}

/// Extract a JSON fragment between matching delimiters
fn extract_json_fragment(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if start <= end {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// The first `{...}` span whose braces balance, ignoring braces inside strings
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}
