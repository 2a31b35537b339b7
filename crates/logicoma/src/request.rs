//! Request options: caller overrides, url merging, target assembly.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH};
use url::Url;

use crate::error::{Error, Result};

/// HTTP method for a request. The helper speaks GET and POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET, no request body.
    Get,
    /// POST with a caller-supplied body.
    Post,
}

impl Method {
    /// Wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// Transport scheme for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
}

impl Scheme {
    /// Resolve a scheme from a protocol string.
    ///
    /// Any string whose trimmed form starts with `https`, in any casing,
    /// selects TLS. Everything else, including unknown protocols, falls
    /// back to plain HTTP.
    pub fn from_protocol(protocol: &str) -> Scheme {
        let head = protocol.trim().get(..5);
        if head.is_some_and(|head| head.eq_ignore_ascii_case("https")) {
            Scheme::Https
        } else {
            Scheme::Http
        }
    }

    /// Url scheme name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// Caller-supplied transport overrides for a single call.
///
/// Every field is optional. A set field takes precedence over the
/// corresponding part parsed from the url.
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    /// Protocol override, e.g. `"https"` or `"https:"`.
    pub protocol: Option<String>,
    /// Host override.
    pub host: Option<String>,
    /// Port override.
    pub port: Option<u16>,
    /// Path override, including any query string.
    pub path: Option<String>,
    /// Extra request headers.
    pub headers: HeaderMap,
}

impl HttpOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the protocol override.
    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Set the host override.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port override.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the path override.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add a request header. Invalid names or values are skipped.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name),
            HeaderValue::try_from(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }
}

/// Fully resolved wire options for one logical call.
///
/// Built once by the entry points and treated as read-only afterwards, so
/// every retry attempt sends the exact same request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method.
    pub method: Method,
    /// Resolved transport scheme.
    pub scheme: Scheme,
    /// Target host.
    pub host: String,
    /// Target port, scheme default when absent.
    pub port: Option<u16>,
    /// Path plus encoded query string.
    pub path: String,
    /// Request headers, including the enforced `content-length`.
    pub headers: HeaderMap,
    /// Request body, absent for GET.
    pub body: Option<Bytes>,
}

impl RequestOptions {
    /// Merge a parsed url with caller overrides into wire options.
    ///
    /// The url is parsed first; any override in `options` then replaces the
    /// parsed part. The `content-length` header is always rewritten to the
    /// body byte length, `0` when there is no body, regardless of what the
    /// caller set.
    pub fn build(
        method: Method,
        url: &str,
        options: &HttpOptions,
        body: Option<Bytes>,
    ) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|source| Error::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let protocol = match &options.protocol {
            Some(protocol) => protocol.clone(),
            None => parsed.scheme().to_string(),
        };
        let host = match options.host.clone().or_else(|| parsed.host_str().map(str::to_string)) {
            Some(host) => host,
            None => {
                return Err(Error::InvalidUrl {
                    url: url.to_string(),
                    source: url::ParseError::EmptyHost,
                })
            }
        };
        let path = match &options.path {
            Some(path) => path.clone(),
            None => match parsed.query() {
                Some(query) => format!("{}?{}", parsed.path(), query),
                None => parsed.path().to_string(),
            },
        };

        let mut resolved = RequestOptions {
            method,
            scheme: Scheme::from_protocol(&protocol),
            host,
            port: options.port.or_else(|| parsed.port()),
            path,
            headers: options.headers.clone(),
            body,
        };
        resolved.enforce_content_length();
        Ok(resolved)
    }

    /// Assemble the absolute url the transport will dial.
    pub fn target(&self) -> Result<Url> {
        let mut target = format!("{}://{}", self.scheme.as_str(), self.host);
        if let Some(port) = self.port {
            target.push_str(&format!(":{port}"));
        }
        if !self.path.starts_with('/') {
            target.push('/');
        }
        target.push_str(&self.path);
        Url::parse(&target).map_err(|source| Error::InvalidUrl {
            url: target.clone(),
            source,
        })
    }

    /// Body byte length, `0` when there is no body.
    pub fn content_length(&self) -> usize {
        self.body.as_ref().map_or(0, Bytes::len)
    }

    fn enforce_content_length(&mut self) {
        self.headers
            .insert(CONTENT_LENGTH, HeaderValue::from(self.content_length()));
    }
}
