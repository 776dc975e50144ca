//! Input validators. All of them answer `false` for input they cannot interpret.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1[3-9]\d{9}$").expect("valid phone regex"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?([\da-z.-]+)\.([a-z.]{2,6})([/\w .-]*)*/?$").expect("valid url regex")
});
static ID_CARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-9]\d{5}(18|19|20)\d{2}(0[1-9]|1[0-2])(0[1-9]|[12]\d|3[01])\d{3}[\dXx]$")
        .expect("valid id card regex")
});

/// Mainland China mobile number: 11 digits starting with 13-19.
pub fn is_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

pub fn is_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Absolute URLs must use http or https; text that does not parse as an
/// absolute URL is checked against a host-and-path pattern instead.
pub fn is_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => URL_RE.is_match(url.trim()),
    }
}

/// 18-character resident identity number (format check only, no checksum).
pub fn is_id_card(id_card: &str) -> bool {
    ID_CARD_RE.is_match(id_card.trim())
}

/// Finite or infinite decimal number, surrounding whitespace allowed; NaN is not numeric.
pub fn is_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok_and(|n| !n.is_nan())
}

/// Missing, null, empty string, empty array or empty object.
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(_) => false,
    }
}

/// Missing and null become `""`; anything else is returned unchanged.
pub fn to_empty_string(value: Option<Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::String(String::new()),
        Some(v) => v,
    }
}
