//! Cleanup of raw model answers

use once_cell::sync::Lazy;
use regex::Regex;

static ARTIFACTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<think>.*?</think>\s*|Texto corregido:\n").expect("valid regex")
});

const ECHOED_PREFIX: &str = "Texto corregido:";

/// Strip reasoning spans and echoed prompt artifacts from a model answer
///
/// Removes every `<think>…</think>` block (plus the whitespace after it) and
/// the `Texto corregido:` echo, then trims. Applied until nothing changes, so
/// `sanitize(sanitize(x)) == sanitize(x)`.
///
/// ```
/// use rubro_pipeline::sanitize::sanitize;
///
/// assert_eq!(sanitize("<think>x</think>keep"), "keep");
/// ```
pub fn sanitize(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let mut next = ARTIFACTS_RE.replace_all(&current, "").trim().to_string();
        if let Some(rest) = next.strip_prefix(ECHOED_PREFIX) {
            next = rest.trim().to_string();
        }
        if next == current {
            return next;
        }
        current = next;
    }
}
