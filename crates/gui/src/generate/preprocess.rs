//! Prompt validation and deterministic text preprocessing.
//!
//! The generation service expects lightly normalized text. The
//! transformation here must stay byte-stable: collapse decoration runs,
//! collapse whitespace, round decimal-shaped substrings to four places.
//! Anything that does not look like a decimal number is left alone.

use super::GenerateError;

pub const MAX_PROMPT_LEN: usize = 2000;

/// Substrings rejected before any request leaves the machine. The
/// prompt is eventually interpolated into a downstream template, so
/// markup and template escapes are refused outright.
const BLOCKED_SUBSTRINGS: &[&str] = &["<script", "javascript:", "${", "{{", "onerror="];

/// Check a prompt before submission. Failures here are local and never
/// produce a network request.
pub fn validate_prompt(prompt: &str) -> Result<(), GenerateError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(GenerateError::Validation(
            "prompt is empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_PROMPT_LEN {
        return Err(GenerateError::Validation(format!(
            "prompt exceeds {MAX_PROMPT_LEN} characters"
        )));
    }
    let lowered = trimmed.to_lowercase();
    for blocked in BLOCKED_SUBSTRINGS {
        if lowered.contains(blocked) {
            return Err(GenerateError::Validation(format!(
                "prompt contains disallowed sequence {blocked:?}"
            )));
        }
    }
    Ok(())
}

/// Normalize prompt text before sending.
pub fn preprocess(prompt: &str) -> String {
    let stripped = strip_decoration_runs(prompt);
    let rounded = round_decimals(&stripped);
    collapse_whitespace(&rounded)
}

/// Remove runs of three or more '-', '=' or '#' characters.
fn strip_decoration_runs(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if matches!(c, '-' | '=' | '#') {
            let mut j = i;
            while j < chars.len() && chars[j] == c {
                j += 1;
            }
            if j - i < 3 {
                out.extend(&chars[i..j]);
            }
            i = j;
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

/// Collapse whitespace and newlines to single spaces and trim the ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Round every decimal-shaped substring (digits, a dot, digits) to four
/// decimal places. Integers and malformed numbers do not match the
/// shape and pass through unchanged.
fn round_decimals(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            // A decimal needs a dot followed by at least one digit.
            if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
                i += 1;
                let frac_start = i;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                let matched = &text[start..i];
                if i - frac_start > 4 {
                    match matched.parse::<f64>() {
                        Ok(value) => out.push_str(&format!("{value:.4}")),
                        Err(_) => out.push_str(matched),
                    }
                } else {
                    out.push_str(matched);
                }
            } else {
                out.push_str(&text[start..i]);
            }
        } else {
            let c = text[i..].chars().next().unwrap();
            out.push(c);
            i += c.len_utf8();
        }
    }
    out
}
