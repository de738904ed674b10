//! Minimal `multipart/form-data` writer (RFC 7578).
//!
//! Boundaries are `weibo-` followed by a random v4 UUID in simple form.

use std::io::{self, Read, Write};

use uuid::Uuid;

pub struct MultipartWriter {
    boundary: String,
    buf: Vec<u8>,
}

impl MultipartWriter {
    pub fn new() -> Self {
        Self::with_boundary(format!("weibo-{}", Uuid::new_v4().simple()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            buf: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The `Content-Type` header value for the body being written.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn write_field(&mut self, name: &str, value: &str) -> io::Result<()> {
        write!(
            self.buf,
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
            self.boundary,
            escape_quotes(name)
        )?;
        self.buf.write_all(value.as_bytes())?;
        self.buf.write_all(b"\r\n")
    }

    /// Copy `reader` to the end into a file part. Returns the bytes copied.
    pub fn write_file<R: Read + ?Sized>(
        &mut self,
        name: &str,
        file_name: &str,
        reader: &mut R,
    ) -> io::Result<u64> {
        write!(
            self.buf,
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            self.boundary,
            escape_quotes(name),
            escape_quotes(file_name)
        )?;
        let copied = io::copy(reader, &mut self.buf)?;
        self.buf.write_all(b"\r\n")?;
        Ok(copied)
    }

    /// Write the closing boundary and return the finished body.
    pub fn finish(mut self) -> Vec<u8> {
        self.buf.extend_from_slice(b"--");
        self.buf.extend_from_slice(self.boundary.as_bytes());
        self.buf.extend_from_slice(b"--\r\n");
        self.buf
    }
}

impl Default for MultipartWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_fields_and_file_parts() {
        let mut writer = MultipartWriter::with_boundary("XYZ");
        writer.write_field("status", "hi").unwrap();
        let mut data: &[u8] = &[0x89, b'P', b'N', b'G'];
        let copied = writer.write_file("pic", "a.png", &mut data).unwrap();
        assert_eq!(copied, 4);
        let body = writer.finish();

        let mut expected = b"--XYZ\r\nContent-Disposition: form-data; name=\"status\"\r\n\r\nhi\r\n".to_vec();
        expected.extend_from_slice(
            b"--XYZ\r\nContent-Disposition: form-data; name=\"pic\"; filename=\"a.png\"\r\nContent-Type: application/octet-stream\r\n\r\n",
        );
        expected.extend_from_slice(&[0x89, b'P', b'N', b'G']);
        expected.extend_from_slice(b"\r\n--XYZ--\r\n");
        assert_eq!(body, expected);
    }

    #[test]
    fn content_type_carries_boundary() {
        let writer = MultipartWriter::with_boundary("abc");
        assert_eq!(writer.content_type(), "multipart/form-data; boundary=abc");
    }

    #[test]
    fn generated_boundaries_differ() {
        assert_ne!(MultipartWriter::new().boundary(), MultipartWriter::new().boundary());
    }

    #[test]
    fn quotes_in_file_names_are_escaped() {
        let mut writer = MultipartWriter::with_boundary("b");
        let mut empty: &[u8] = &[];
        writer.write_file("pic", "we\"ird.png", &mut empty).unwrap();
        let body = String::from_utf8(writer.finish()).unwrap();
        assert!(body.contains("filename=\"we\\\"ird.png\""));
    }
}
