//! Reply formatting helpers.

use regex::Regex;
use std::sync::LazyLock;

/// Assistant replies sometimes contain HTML line breaks, which Telegram's HTML parse
/// mode rejects. Matches `<br>`, `<br/>`, `<br />` in any case.
static BREAK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("break-tag regex is valid"));

/// Replaces every `<br>` variant with a newline. Other tags are left untouched.
pub fn strip_break_tags(text: &str) -> String {
    BREAK_TAG.replace_all(text, "\n").into_owned()
}
