//! Control-token cleanup for harmony-style model output.
//!
//! Some local models (gpt-oss in particular) leak channel markup such as
//! `<|channel|>analysis<|message|>...<|end|>` into `content`. Only the
//! `final` channel is meant for the user.

use regex::Regex;
use std::sync::LazyLock;

static FINAL_CHANNEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<\|channel\|>final<\|message\|>(.*?)(?:<\|end\|>|$)").expect("valid pattern")
});
static CONTROL_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\|[^|]+\|>").expect("valid pattern"));

/// Make model output safe to show to the user.
///
/// If a final-channel marker is present, only the text after it (up to
/// `<|end|>` or the end of the text) is kept. Every remaining `<|...|>`
/// token is then removed and the result trimmed.
pub fn sanitize_content(raw: &str) -> String {
    let body = FINAL_CHANNEL
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or(raw, |m| m.as_str().trim());
    strip_control_tokens(body).trim().to_string()
}

/// Remove every `<|name|>` token, where `name` is non-empty and has no `|`.
pub fn strip_control_tokens(text: &str) -> String {
    CONTROL_TOKEN.replace_all(text, "").into_owned()
}
