//! Validation and cleaning of user-supplied task text.
//!
//! # Responsibility
//! - Normalize titles and descriptions before they enter the store.
//! - Detect markup/script injection attempts for warning purposes.
//!
//! # Invariants
//! - Functions here are pure except `log_security_warning`.
//! - `validate_description` never rejects input.
//! - `contains_malicious_markup` does not influence stored values.

use crate::logging::sanitize_message;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

const MAX_WARNING_PREVIEW_CHARS: usize = 80;

static SCRIPT_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<\s*script\b[^>]*>.*?<\s*/\s*script\s*>").expect("valid script block regex")
});
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)</?[a-zA-Z!][^>]*>").expect("valid tag regex"));
static DANGEROUS_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<\s*/?\s*(script|iframe|object|embed|svg|img|style|link|meta|form|base)\b")
        .expect("valid dangerous tag regex")
});
/// `on*=` attribute inside an opened tag.
static TAG_EVENT_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?[a-z!][^>]*\son[a-z]+\s*=").expect("valid event attribute regex")
});
/// `javascript:` scheme inside an opened tag.
static TAG_JS_SCHEME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?[a-z!][^>]*javascript\s*:").expect("valid scheme regex")
});

/// Cleans a title; returns `None` when nothing usable remains.
///
/// Markup is stripped before trimming, so `"<script>x</script>  "` is rejected.
pub fn validate_title(raw: &str) -> Option<String> {
    let cleaned = strip_markup(raw);
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

/// Cleans a description. Absent input becomes an empty string.
pub fn validate_description(raw: Option<&str>) -> String {
    match raw {
        Some(value) => strip_markup(value).trim().to_string(),
        None => String::new(),
    }
}

/// Returns whether `text` contains script-ish tags, or tags carrying a
/// `javascript:` scheme or inline event-handler attribute.
///
/// Prose such as `one = two` or `javascript: closures` is not markup.
pub fn contains_malicious_markup(text: &str) -> bool {
    DANGEROUS_TAG_RE.is_match(text)
        || TAG_EVENT_ATTR_RE.is_match(text)
        || TAG_JS_SCHEME_RE.is_match(text)
}

/// Records a diagnostic for detected injection content.
///
/// Only a truncated, single-line preview is logged.
pub fn log_security_warning(text: &str, context: &str) {
    warn!(
        "event=security_warning module=sanitize status=detected context={} chars={} preview={}",
        context,
        text.chars().count(),
        sanitize_message(text, MAX_WARNING_PREVIEW_CHARS)
    );
}

/// Drops script blocks, then every remaining tag with its attributes.
///
/// Text outside tags is kept as written.
fn strip_markup(value: &str) -> String {
    let without_scripts = SCRIPT_BLOCK_RE.replace_all(value, "");
    TAG_RE.replace_all(&without_scripts, "").into_owned()
}
