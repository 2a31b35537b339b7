//! Response classification and body decoding.

use bytes::{Bytes, BytesMut};
use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{HeaderMap, CONTENT_TYPE};

use crate::error::{Error, Result};

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Parsed body for `application/json` media types.
    Json(serde_json::Value),
    /// Body decoded as text for every other media type.
    Text(String),
}

impl Body {
    /// Parsed JSON value, when the body was classified as JSON.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    /// Text content, when the body was classified as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Json(_) => None,
            Body::Text(text) => Some(text),
        }
    }
}

/// A successful, fully decoded response.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code, always in the 2xx range.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Decoded body.
    pub body: Body,
}

impl Response {
    /// Header value as a string, when present and valid ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Parsed JSON body, when the response carried one.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        self.body.as_json()
    }

    /// Text body, when the response carried one.
    pub fn as_text(&self) -> Option<&str> {
        self.body.as_text()
    }
}

/// Classify a raw response by status, then buffer and decode its body.
///
/// A status outside the 2xx range fails with [`Error::Status`] after the
/// remaining body is drained so the connection can be reused. A body read
/// that ends early fails with [`Error::AbnormalTermination`]. A JSON media
/// type whose body does not parse fails with [`Error::Decode`].
pub async fn classify(response: reqwest::Response) -> Result<Response> {
    let status = response.status();
    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        drain(response).await;
        return Err(Error::Status {
            status: status.as_u16(),
            reason,
        });
    }

    let headers = response.headers().clone();
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = buffer(response).await?;
    decode(status.as_u16(), headers, content_type.as_deref(), &bytes)
}

/// Read the remaining body so the connection can go back to the pool.
/// The failure has already been decided, so read errors are ignored.
async fn drain(mut response: reqwest::Response) {
    while let Ok(Some(_)) = response.chunk().await {}
}

/// Buffer the entire body. A read failure here means the connection closed
/// mid-message.
async fn buffer(mut response: reqwest::Response) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
            Ok(None) => return Ok(buf.freeze()),
            Err(source) => {
                return Err(Error::AbnormalTermination {
                    source: Some(source),
                })
            }
        }
    }
}

/// Decode buffered bytes according to the declared content type.
fn decode(
    status: u16,
    headers: HeaderMap,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<Response> {
    let (media_type, charset) = split_content_type(content_type);
    let encoding = charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);

    let body = if media_type.starts_with("application/json") {
        Body::Json(serde_json::from_str(&text).map_err(Error::Decode)?)
    } else {
        Body::Text(text.into_owned())
    };
    Ok(Response {
        status,
        headers,
        body,
    })
}

/// Split a content-type header into its media type and charset label.
///
/// The media type is everything before the first `;`, trimmed and
/// lower-cased, `text/plain` when the header is absent. The charset comes
/// from a `charset=` parameter, unquoted when present.
fn split_content_type(header: Option<&str>) -> (String, Option<String>) {
    let Some(raw) = header else {
        return ("text/plain".to_string(), None);
    };
    let (media, params) = match raw.split_once(';') {
        Some((media, params)) => (media, Some(params)),
        None => (raw, None),
    };
    let media_type = media.trim().to_ascii_lowercase();
    let charset = params.and_then(|params| {
        params.split(';').find_map(|param| {
            let (name, value) = param.split_once('=')?;
            if name.trim().eq_ignore_ascii_case("charset") {
                Some(value.trim().trim_matches('"').to_string())
            } else {
                None
            }
        })
    });
    (media_type, charset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decoded(content_type: Option<&str>, bytes: &[u8]) -> Result<Response> {
        decode(200, HeaderMap::new(), content_type, bytes)
    }

    #[test]
    fn absent_content_type_defaults_to_text_plain() {
        let (media_type, charset) = split_content_type(None);
        assert_eq!(media_type, "text/plain");
        assert_eq!(charset, None);
    }

    #[test]
    fn media_type_is_trimmed_and_lowercased() {
        let (media_type, _) = split_content_type(Some("  Application/JSON ; x=y"));
        assert_eq!(media_type, "application/json");
    }

    #[test]
    fn charset_parameter_is_extracted() {
        let (_, charset) = split_content_type(Some("text/html; charset=ISO-8859-1"));
        assert_eq!(charset.as_deref(), Some("ISO-8859-1"));
    }

    #[test]
    fn charset_parameter_may_be_quoted() {
        let (_, charset) = split_content_type(Some("text/html; CHARSET=\"utf-8\""));
        assert_eq!(charset.as_deref(), Some("utf-8"));
    }

    #[test]
    fn charset_is_found_among_other_parameters() {
        let (_, charset) =
            split_content_type(Some("multipart/form-data; boundary=x; charset=utf-8"));
        assert_eq!(charset.as_deref(), Some("utf-8"));
    }

    #[test]
    fn json_media_type_parses_body() {
        let response = decoded(Some("application/json"), br#"{"a": 1}"#).unwrap();
        assert_eq!(response.body, Body::Json(json!({"a": 1})));
    }

    #[test]
    fn json_media_type_with_suffix_parameters_parses_body() {
        let response = decoded(Some("application/json; charset=utf-8"), b"[1, 2]").unwrap();
        assert_eq!(response.body, Body::Json(json!([1, 2])));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let result = decoded(Some("application/json"), b"{not json");
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn non_json_media_type_decodes_as_text() {
        let response = decoded(Some("text/html"), b"<p>hi</p>").unwrap();
        assert_eq!(response.body, Body::Text("<p>hi</p>".to_string()));
    }

    #[test]
    fn json_lookalike_text_stays_text() {
        let response = decoded(Some("text/plain"), br#"{"a": 1}"#).unwrap();
        assert_eq!(response.body, Body::Text(r#"{"a": 1}"#.to_string()));
    }

    #[test]
    fn declared_charset_drives_text_decoding() {
        // "café" in latin-1.
        let response = decoded(
            Some("text/plain; charset=iso-8859-1"),
            &[0x63, 0x61, 0x66, 0xe9],
        )
        .unwrap();
        assert_eq!(response.body, Body::Text("caf\u{e9}".to_string()));
    }

    #[test]
    fn unknown_charset_falls_back_to_utf8() {
        let response = decoded(Some("text/plain; charset=klingon"), b"ok").unwrap();
        assert_eq!(response.body, Body::Text("ok".to_string()));
    }

    #[test]
    fn empty_text_body_is_empty_string() {
        let response = decoded(Some("text/plain"), b"").unwrap();
        assert_eq!(response.body, Body::Text(String::new()));
    }

    #[test]
    fn body_accessors_match_classification() {
        let json = Body::Json(json!(1));
        assert!(json.as_json().is_some());
        assert!(json.as_text().is_none());

        let text = Body::Text("x".to_string());
        assert!(text.as_text().is_some());
        assert!(text.as_json().is_none());
    }
}
