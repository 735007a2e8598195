use serde_json::Value;

const OPENING_FENCE: &str = "```json";
const CLOSING_FENCE: &str = "```";
const LINE_CLOSING_FENCE: &str = "\n```";

/// Failure to recover a JSON payload from a model reply.
#[derive(Debug, thiserror::Error)]
pub enum ReportParseError {
    #[error("malformed AI response: no ```json block found")]
    MalformedResponse,
    #[error("invalid JSON in AI response: {0}")]
    InvalidJson(#[source] serde_json::Error),
}

/// Contents of the first ```json fenced block, without the fences.
///
/// The opening fence must be followed by a line break and the closing fence must
/// start its own line.
pub fn extract_json_block(reply: &str) -> Result<&str, ReportParseError> {
    let mut search_from = 0;

    while let Some(found) = reply[search_from..].find(OPENING_FENCE) {
        let fence_end = search_from + found + OPENING_FENCE.len();
        search_from = fence_end;

        let rest = &reply[fence_end..];
        let body_start = if rest.starts_with("\r\n") {
            2
        } else if rest.starts_with('\n') {
            1
        } else {
            continue;
        };

        let body = &rest[body_start..];
        if let Some(close) = find_closing_fence(body) {
            return Ok(body[..close].trim_end_matches(['\r', '\n']));
        }
    }

    Err(ReportParseError::MalformedResponse)
}

fn find_closing_fence(body: &str) -> Option<usize> {
    if body.starts_with(CLOSING_FENCE) {
        return Some(0);
    }
    body.find(LINE_CLOSING_FENCE)
}

/// Extract and decode the fenced JSON payload of a model reply.
pub fn parse_reply(reply: &str) -> Result<Value, ReportParseError> {
    let block = extract_json_block(reply)?;
    serde_json::from_str(block).map_err(ReportParseError::InvalidJson)
}
