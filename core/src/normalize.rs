//! Collapses a raw response into one success-or-error outcome.
//!
//! Order matters: a nonzero `error_code` in a JSON body is reported even on
//! a 200, and only then is the status line checked.

use serde_json::Value;

use crate::error::{Result, WeiboError};
use crate::http::HttpResponse;

/// Business error carried by `body`, if any. Bodies that are not JSON
/// objects never carry one.
///
/// `error_code` is read independently of `error`. A null message becomes
/// empty and a non-string one is kept as raw JSON text.
pub fn business_error(body: &[u8]) -> Option<WeiboError> {
    let parsed: Value = serde_json::from_slice(body).ok()?;
    let code = parsed.get("error_code")?.as_i64()?;
    if code == 0 {
        return None;
    }
    let message = match parsed.get("error") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    Some(WeiboError::Business { code, message })
}

/// Interpret a response. On success the body is returned verbatim as text.
pub fn parse_response(response: &HttpResponse) -> Result<String> {
    if let Some(err) = business_error(&response.body) {
        return Err(err);
    }
    if response.status != 200 {
        return Err(WeiboError::HttpStatus(response.status));
    }
    Ok(String::from_utf8_lossy(&response.body).into_owned())
}
