//! HTTP transport types shared by the builder, dispatcher and normalizer.
//!
//! # Design
//! Requests and responses are plain data. `WeiboClient` builds an
//! `HttpRequest` without touching the network, a `Dispatcher` turns it into
//! an `HttpResponse`, and `normalize::parse_response` interprets the result.
//! Bodies are bytes because the multipart upload carries binary image data.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Content type sent with form-encoded POST bodies. The downstream API
/// expects the literal `param=value` suffix.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; param=value";

/// An HTTP request described as plain data.
///
/// `url` already carries the encoded query string for GET requests.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Value of the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The body as UTF-8 text, for form bodies and test assertions.
    pub fn body_text(&self) -> Option<&str> {
        self.body.as_deref().and_then(|b| std::str::from_utf8(b).ok())
    }
}

/// A captured HTTP response. Never mutated after the dispatcher returns it.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}
