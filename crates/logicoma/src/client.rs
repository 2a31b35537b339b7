//! Request entry points and the reusable client.

use bytes::Bytes;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::Serialize;

use logicoma_qs as qs;

use crate::error::{Error, Result};
use crate::request::{HttpOptions, Method, RequestOptions};
use crate::response::{classify, Response};
use crate::retry::{self, RetryPolicy};
use crate::transport::{build_transport, invoke, TransportConfig};

/// HTTP request helper with a reusable transport.
///
/// The free [`get`] and [`post`] functions build a fresh client per call;
/// construct a `Client` once to share connection pools across calls.
pub struct Client {
    transport: reqwest::Client,
}

impl Client {
    /// Create a client with default transport settings.
    pub fn new() -> Result<Self> {
        Self::with_config(TransportConfig::default())
    }

    /// Create a client with custom transport settings.
    pub fn with_config(config: TransportConfig) -> Result<Self> {
        Ok(Self {
            transport: build_transport(&config)?,
        })
    }

    /// The underlying transport client.
    pub fn transport(&self) -> &reqwest::Client {
        &self.transport
    }

    /// Perform a GET request.
    ///
    /// `query` is encoded with `qs_options` and appended to `url` behind a
    /// `?` before the url is parsed, so a url that already carries a query
    /// string keeps it. Transient failures are retried per `retry`.
    pub async fn get(
        &self,
        url: &str,
        query: &qs::Query,
        options: HttpOptions,
        qs_options: qs::StringifyOptions,
        retry: RetryPolicy,
    ) -> Result<Response> {
        let url = require_url(url)?;
        let encoded = qs::stringify(query, &qs_options);
        let target = if encoded.is_empty() {
            url.to_string()
        } else {
            format!("{url}?{encoded}")
        };
        let request = RequestOptions::build(Method::Get, &target, &options, None)?;
        self.dispatch(request, retry).await
    }

    /// Perform a POST request with a raw body.
    ///
    /// The `content-length` header is always set to the body byte length,
    /// replacing any value the caller supplied. Transient failures are
    /// retried per `retry`; every attempt resends the same body.
    pub async fn post(
        &self,
        url: &str,
        body: impl Into<Bytes>,
        options: HttpOptions,
        retry: RetryPolicy,
    ) -> Result<Response> {
        let url = require_url(url)?;
        let request = RequestOptions::build(Method::Post, url, &options, Some(body.into()))?;
        self.dispatch(request, retry).await
    }

    /// Perform a POST request with a JSON-serialized body.
    ///
    /// Sets `content-type: application/json` unless the caller already set
    /// a content type.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        mut options: HttpOptions,
        retry: RetryPolicy,
    ) -> Result<Response> {
        let payload = serde_json::to_vec(body).map_err(Error::Encode)?;
        if !options.headers.contains_key(CONTENT_TYPE) {
            options
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        self.post(url, payload, options, retry).await
    }

    /// Run the attempt pipeline under the retry policy.
    async fn dispatch(&self, request: RequestOptions, policy: RetryPolicy) -> Result<Response> {
        let transport = &self.transport;
        let request = &request;
        retry::run(&policy, move || async move {
            let raw = invoke(transport, request).await?;
            classify(raw).await
        })
        .await
    }
}

/// Perform a GET request with a fresh default client.
///
/// See [`Client::get`].
pub async fn get(
    url: &str,
    query: &qs::Query,
    options: HttpOptions,
    qs_options: qs::StringifyOptions,
    retry: RetryPolicy,
) -> Result<Response> {
    Client::new()?.get(url, query, options, qs_options, retry).await
}

/// Perform a POST request with a fresh default client.
///
/// See [`Client::post`].
pub async fn post(
    url: &str,
    body: impl Into<Bytes>,
    options: HttpOptions,
    retry: RetryPolicy,
) -> Result<Response> {
    Client::new()?.post(url, body, options, retry).await
}

/// Reject a missing url before any encoding or I/O happens.
fn require_url(url: &str) -> Result<&str> {
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::MissingUrl);
    }
    Ok(url)
}
