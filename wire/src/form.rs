//! Form-encoded request and response framing.
//!
//! The game client speaks `key=value` pairs joined by `&` in both
//! directions. Requests are looked up by key; responses preserve insertion
//! order because the client reads some fields positionally.

use std::collections::HashMap;

use crate::error::{WireError, WireResult};

/// A parsed request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    fields: HashMap<String, String>,
}

impl Request {
    /// Parses a request body.
    ///
    /// Each `&`-separated fragment must contain at least one `=`; the value
    /// keeps any further `=` characters verbatim.
    pub fn from_body(body: &str) -> WireResult<Self> {
        let mut fields = HashMap::new();
        for fragment in body.split('&') {
            let (key, value) = fragment.split_once('=').ok_or_else(|| {
                WireError::MalformedField {
                    field: fragment.to_owned(),
                }
            })?;
            fields.insert(key.to_owned(), value.to_owned());
        }
        Ok(Self { fields })
    }

    /// Returns a field value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the request carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// An ordered response under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    fields: Vec<(String, String)>,
}

impl Response {
    /// Creates an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    /// Returns a field value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the fields in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Renders the response body.
    #[must_use]
    pub fn body(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Decodes `%XX` escapes in a form value.
///
/// Invalid or truncated escapes pass through unchanged, matching the
/// lenient decoder the original service relied on. `+` is not treated as a
/// space; the client never sends it.
#[must_use]
pub fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3);
            if let Some(decoded) = hex.and_then(|h| {
                let high = (h[0] as char).to_digit(16)?;
                let low = (h[1] as char).to_digit(16)?;
                Some((high * 16 + low) as u8)
            }) {
                out.push(decoded);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_parses_fields() {
        let request = Request::from_body("Action=saveStory&Email=red@pallet.town").unwrap();
        assert_eq!(request.get("Action"), Some("saveStory"));
        assert_eq!(request.get("Email"), Some("red@pallet.town"));
        assert_eq!(request.get("Missing"), None);
        assert_eq!(request.len(), 2);
    }

    #[test]
    fn request_keeps_extra_equals_in_value() {
        let request = Request::from_body("extra=Save=true").unwrap();
        assert_eq!(request.get("extra"), Some("Save=true"));
    }

    #[test]
    fn request_rejects_bare_fragment() {
        let err = Request::from_body("Action=load&garbage").unwrap_err();
        assert_eq!(
            err,
            WireError::MalformedField {
                field: "garbage".to_owned()
            }
        );
    }

    #[test]
    fn response_preserves_order() {
        let mut response = Response::new();
        response.push("Result", "Success");
        response.push("extra", "ywcqa");
        response.push("CS", "ywcqa");
        assert_eq!(response.body(), "Result=Success&extra=ywcqa&CS=ywcqa");
    }

    #[test]
    fn response_get_by_key() {
        let mut response = Response::new();
        response.push("Result", "Success");
        assert_eq!(response.get("Result"), Some("Success"));
        assert_eq!(response.get("Reason"), None);
    }

    #[test]
    fn percent_decode_escapes() {
        assert_eq!(percent_decode("Save%3Dtrue%26M%3D10"), "Save=true&M=10");
    }

    #[test]
    fn percent_decode_passthrough() {
        assert_eq!(percent_decode("plain"), "plain");
        assert_eq!(percent_decode("50%"), "50%");
        assert_eq!(percent_decode("%zz"), "%zz");
    }
}
