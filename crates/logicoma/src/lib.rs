//! Outbound HTTP request helper with retries and response decoding.
//!
//! Wraps a small pipeline around every request: caller options are merged
//! with the parsed url, the request is sent, and the response is classified
//! by status and decoded by content type. Transient failures, meaning
//! connection-level errors, truncated bodies, and 504 responses, are
//! retried with exponential backoff; everything else fails immediately.
//!
//! ```no_run
//! use logicoma::qs::{Query, StringifyOptions};
//! use logicoma::{HttpOptions, RetryPolicy};
//!
//! # async fn demo() -> logicoma::Result<()> {
//! let query = Query::new().push("page", 2);
//! let response = logicoma::get(
//!     "http://example.org/items",
//!     &query,
//!     HttpOptions::default(),
//!     StringifyOptions::default(),
//!     RetryPolicy::default(),
//! )
//! .await?;
//!
//! println!("{} {:?}", response.status, response.body);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod retry;
pub mod transport;

pub use client::{get, post, Client};
pub use error::{Error, Result};
pub use request::{HttpOptions, Method, RequestOptions, Scheme};
pub use response::{classify, Body, Response};
pub use retry::RetryPolicy;
pub use transport::{build_transport, invoke, TransportConfig};

/// Re-export of the query string codec used by [`Client::get`].
pub use logicoma_qs as qs;

/// Re-export of the underlying HTTP client for advanced configuration.
pub use reqwest;
