//! Scrubbing of key material before anything reaches stderr or an error
//! message. Covers both structured log metadata and free-form response text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const MASK: &str = "[REDACTED]";
const INLINE_MASK: &str = "***";

/// Field names that always hold key material in this client.
const CREDENTIAL_FIELDS: &[&str] = &[
    "api_key",
    "access_key",
    "access_token",
    "refresh_token",
    "authorization",
    "proxy-authorization",
    "signature",
    "cookie",
];

static INLINE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    let rules: [(&str, &'static str); 4] = [
        // JWTs, the usual shape of commons access tokens.
        (
            r"\beyJ[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}",
            INLINE_MASK,
        ),
        (r"\b(Bearer)\s+[A-Za-z0-9._~+/=-]{8,}", "$1 ***"),
        (r"\b(Signature)=[0-9a-fA-F]{16,}", "$1=***"),
        (
            r#"\b(api_key|access_key|access_token|refresh_token)("?\s*[:=]\s*"?)[^\s"',}]+"#,
            "$1$2***",
        ),
    ];
    rules
        .into_iter()
        .filter_map(|(pattern, replacement)| {
            Regex::new(pattern).ok().map(|re| (re, replacement))
        })
        .collect()
});

pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.trim().to_lowercase();
    !key.is_empty()
        && (CREDENTIAL_FIELDS.contains(&key.as_str())
            || key.contains("secret")
            || key.ends_with("token"))
}

/// Longest prefix of `value` that fits in `max_bytes` without splitting a
/// UTF-8 sequence.
pub fn truncate_utf8_prefix(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let mut end = max_bytes;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Masks inline credentials, then truncates to `max_bytes` (appending `...`).
/// `extra` holds literal secrets known to the caller; values shorter than six
/// bytes are ignored so short common words are not mangled.
pub fn redact_text(value: &str, max_bytes: usize, extra: Option<&[String]>) -> String {
    let mut out = value.to_string();
    for (re, replacement) in INLINE_PATTERNS.iter() {
        out = re.replace_all(&out, *replacement).into_owned();
    }
    for secret in extra.unwrap_or_default() {
        let secret = secret.trim();
        if secret.len() >= 6 {
            out = out.replace(secret, INLINE_MASK);
        }
    }
    if out.len() > max_bytes {
        out = format!("{}...", truncate_utf8_prefix(&out, max_bytes));
    }
    out
}

/// Walks a JSON value, replacing credential-named fields wholesale and
/// scrubbing every string leaf.
pub fn redact_object(value: &Value, max_bytes: usize, extra: Option<&[String]>) -> Value {
    match value {
        Value::String(text) => Value::String(redact_text(text, max_bytes, extra)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| redact_object(item, max_bytes, extra))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, entry)| {
                    let entry = if is_sensitive_key(key) {
                        Value::String(MASK.to_string())
                    } else {
                        redact_object(entry, max_bytes, extra)
                    };
                    (key.clone(), entry)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}
