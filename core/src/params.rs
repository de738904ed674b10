//! Parameter encoding for query strings, form bodies and multipart fields.
//!
//! # Design
//! `Params` keeps insertion order, so the same logical input always encodes
//! to the same bytes. Each builder inserts its parameters in a fixed order.
//!
//! Free text (status captions, comment bodies) is encoded exactly once on
//! the wire. In a query string or form body that single pass is the
//! `application/x-www-form-urlencoded` serializer. Multipart fields are not
//! encoded by the transport, so free text is pre-encoded there instead and
//! every other multipart field goes out raw.

use std::fmt;

use indexmap::IndexMap;
use url::form_urlencoded;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    /// User-authored text; pre-encoded when written into a multipart field.
    FreeText(String),
    Int(i64),
    /// Rendered with the shortest representation that round-trips.
    Float(f64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) | ParamValue::FreeText(s) => f.write_str(s),
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::Float(x) => write!(f, "{x}"),
        }
    }
}

impl ParamValue {
    /// Value as written into a multipart form field.
    pub fn multipart_value(&self) -> String {
        match self {
            ParamValue::FreeText(s) => encode_text(s),
            other => other.to_string(),
        }
    }
}

/// Ordered parameter set for one downstream call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: IndexMap<&'static str, ParamValue>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.entries.insert(name, ParamValue::Text(value.into()));
        self
    }

    pub fn free_text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.entries.insert(name, ParamValue::FreeText(value.into()));
        self
    }

    pub fn int(mut self, name: &'static str, value: impl Into<i64>) -> Self {
        self.entries.insert(name, ParamValue::Int(value.into()));
        self
    }

    pub fn float(mut self, name: &'static str, value: f64) -> Self {
        self.entries.insert(name, ParamValue::Float(value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Encode as `name=value&...` suitable for a query string or form body.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.entries {
            serializer.append_pair(name, &value.to_string());
        }
        serializer.finish()
    }
}

/// Percent-encode a single piece of text with form-urlencoded rules.
pub fn encode_text(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_keeps_insertion_order() {
        let params = Params::new()
            .text("access_token", "tok")
            .int("uid", 42)
            .text("b", "x");
        assert_eq!(params.encode(), "access_token=tok&uid=42&b=x");
    }

    #[test]
    fn encode_is_deterministic() {
        let build = || {
            Params::new()
                .text("access_token", "a b")
                .free_text("status", "hello, 世界 & more")
                .float("lat", 39.9042)
        };
        assert_eq!(build().encode(), build().encode());
    }

    #[test]
    fn free_text_is_encoded_once_in_forms() {
        let params = Params::new().free_text("status", "50% off & free");
        assert_eq!(params.encode(), "status=50%25+off+%26+free");
    }

    #[test]
    fn free_text_is_pre_encoded_in_multipart() {
        let text = ParamValue::FreeText("a b&c".to_string());
        assert_eq!(text.multipart_value(), "a+b%26c");
        let plain = ParamValue::Text("a b&c".to_string());
        assert_eq!(plain.multipart_value(), "a b&c");
    }

    #[test]
    fn floats_keep_full_precision() {
        assert_eq!(ParamValue::Float(39.904214123456).to_string(), "39.904214123456");
        assert_eq!(ParamValue::Float(116.4).to_string(), "116.4");
        assert_eq!(ParamValue::Float(0.0).to_string(), "0");
        assert_eq!(ParamValue::Float(-12.5).to_string(), "-12.5");
    }

    #[test]
    fn non_ascii_is_percent_encoded() {
        assert_eq!(encode_text("微博"), "%E5%BE%AE%E5%8D%9A");
    }

    #[test]
    fn reinserting_a_name_replaces_in_place() {
        let params = Params::new().text("a", "1").text("b", "2").text("a", "3");
        assert_eq!(params.encode(), "a=3&b=2");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn empty_params_encode_to_empty_string() {
        assert!(Params::new().is_empty());
        assert_eq!(Params::new().encode(), "");
    }
}
