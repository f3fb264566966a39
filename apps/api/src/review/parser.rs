//! Response parser — pulls a JSON payload out of a raw model reply.
//!
//! Models are told to answer with bare JSON but regularly wrap it in code
//! fences or surround it with prose. Fence stripping is the only repair done
//! here; callers decide what to do with a `ParseError`.

use serde_json::{Deserializer, Value};
use thiserror::Error;

const FENCE: &str = "```";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("reply contained no JSON payload")]
    Empty,

    #[error("reply is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Extracts and strictly decodes the JSON payload of a model reply.
///
/// Preference order: the first ```` ```json ```` block, then the first fenced
/// block of any kind, then the whole trimmed text.
pub fn parse_response(raw: &str) -> Result<Value, ParseError> {
    let payload = extract_payload(raw);
    if payload.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(serde_json::from_str(payload)?)
}

/// Returns the slice of `raw` that should hold the JSON document.
fn extract_payload(raw: &str) -> &str {
    if let Some(start) = find_json_fence(raw) {
        return block_interior(&raw[start..]);
    }
    if let Some(start) = raw.find(FENCE) {
        let after = &raw[start + FENCE.len()..];
        return block_interior(skip_info_string(after));
    }
    raw.trim()
}

/// Byte offset just past a ```` ```json ```` opener (tag matched case-insensitively).
///
/// The tag must end the info string, so ```` ```jsonc ```` and friends are
/// left to the generic fence path.
fn find_json_fence(raw: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(pos) = raw[offset..].find(FENCE) {
        let tag_start = offset + pos + FENCE.len();
        let tag_end = tag_start + 4;
        let is_json = raw
            .get(tag_start..tag_end)
            .is_some_and(|t| t.eq_ignore_ascii_case("json"));
        if is_json && raw[tag_end..].chars().next().map_or(true, char::is_whitespace) {
            return Some(tag_end);
        }
        offset = tag_start;
    }
    None
}

/// Skips a bare language tag (e.g. `python`, `text`) on the opening fence line.
fn skip_info_string(after_fence: &str) -> &str {
    let line_end = after_fence.find('\n').unwrap_or(after_fence.len());
    let info = after_fence[..line_end].trim();
    let is_tag = info
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if is_tag {
        &after_fence[line_end..]
    } else {
        after_fence
    }
}

/// Text up to the closing fence, or the rest of the input if the fence is unclosed.
///
/// A JSON value that runs up to a closing fence wins over a plain scan, so
/// backtick runs inside strings do not end the block early.
fn block_interior(body: &str) -> &str {
    let mut values = Deserializer::from_str(body).into_iter::<Value>();
    if let Some(Ok(_)) = values.next() {
        let end = values.byte_offset();
        let rest = body[end..].trim_start();
        if rest.is_empty() || rest.starts_with(FENCE) {
            return body[..end].trim();
        }
    }
    match body.find(FENCE) {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}
