//! Cleanup of model output before structured parsing.

const FENCE: &str = "```";

/// Strip a fenced-code wrapper (optionally tagged, e.g. `json`) from `raw`.
///
/// Text without a leading fence is returned trimmed and otherwise untouched.
pub fn strip_wrapper(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };

    // Drop the info string on the opening line (`json`, `JSON`, ...).
    let body = match rest.find('\n') {
        Some(newline) if rest[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[newline + 1..]
        }
        Some(_) => rest,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    body.trim_end()
        .strip_suffix(FENCE)
        .unwrap_or(body)
        .trim()
}
