use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use url::Url;

pub const CSRF_STATE_LENGTH: usize = 16;

/// Random alphanumeric value round-tripped through the authorization
/// redirect as `state`.
pub fn generate_csrf_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CSRF_STATE_LENGTH)
        .map(char::from)
        .collect()
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// `Basic` credential for the token endpoint: base64 of `id:secret`.
pub fn basic_credential(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{client_id}:{client_secret}"))
    )
}

/// Parameters the provider appends to the redirect URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Removes `code` and `state` from `location` and returns them.
///
/// Other query parameters are kept in their original order. When nothing is
/// left the query string is dropped entirely.
pub fn take_callback_params(location: &mut Url) -> CallbackParams {
    let mut params = CallbackParams::default();
    let mut rest: Vec<(String, String)> = Vec::new();

    for (key, value) in location.query_pairs() {
        match key.as_ref() {
            "code" => params.code = Some(value.into_owned()),
            "state" => params.state = Some(value.into_owned()),
            _ => rest.push((key.into_owned(), value.into_owned())),
        }
    }

    if params.code.is_none() && params.state.is_none() {
        return params;
    }

    if rest.is_empty() {
        location.set_query(None);
    } else {
        location.query_pairs_mut().clear().extend_pairs(rest);
    }
    params
}

/// Constant-time comparison for short secrets.
pub fn secrets_match(expected: &str, given: &str) -> bool {
    let (a, b) = (expected.as_bytes(), given.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Shortens a message for a single table cell.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
