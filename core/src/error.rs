//! Error types for the Weibo adapter.
//!
//! # Design
//! Three independent failure signals collapse into one enum: the transport
//! (network or local I/O), the `error_code` embedded in a JSON body, and the
//! HTTP status line. `Business` always wins over `HttpStatus`; see
//! `normalize::parse_response`.

use thiserror::Error;

/// Errors returned by every `WeiboSender` operation.
#[derive(Debug, Error)]
pub enum WeiboError {
    /// The downstream API or the attachment source could not be reached or read.
    #[error("transport: {0}")]
    Transport(String),

    /// The request could not be assembled (bad URL, multipart write failure).
    #[error("encoding: {0}")]
    Encoding(String),

    /// The body carried a nonzero `error_code`.
    #[error("{code}: {message}")]
    Business { code: i64, message: String },

    /// Non-200 status with no business error in the body.
    #[error("Http Status Code: {0}")]
    HttpStatus(u16),
}

impl WeiboError {
    /// The downstream business error code, if this is a business error.
    pub fn business_code(&self) -> Option<i64> {
        match self {
            WeiboError::Business { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<ureq::Error> for WeiboError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::BadUri(uri) => WeiboError::Encoding(format!("bad uri: {uri}")),
            other => WeiboError::Transport(other.to_string()),
        }
    }
}

impl From<std::io::Error> for WeiboError {
    fn from(err: std::io::Error) -> Self {
        WeiboError::Transport(err.to_string())
    }
}

impl From<url::ParseError> for WeiboError {
    fn from(err: url::ParseError) -> Self {
        WeiboError::Encoding(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WeiboError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_error_displays_code_and_message() {
        let err = WeiboError::Business {
            code: 20020,
            message: "expire".to_string(),
        };
        assert_eq!(err.to_string(), "20020: expire");
        assert_eq!(err.business_code(), Some(20020));
    }

    #[test]
    fn http_status_display() {
        assert_eq!(WeiboError::HttpStatus(502).to_string(), "Http Status Code: 502");
        assert_eq!(WeiboError::HttpStatus(502).business_code(), None);
    }

    #[test]
    fn io_error_is_transport() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        assert!(matches!(WeiboError::from(io), WeiboError::Transport(_)));
    }

    #[test]
    fn url_parse_error_is_encoding() {
        let err = url::Url::parse("not a url").unwrap_err();
        assert!(matches!(WeiboError::from(err), WeiboError::Encoding(_)));
    }
}
