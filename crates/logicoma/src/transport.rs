//! Transport configuration and the single-attempt invoker.

use std::time::Duration;

use reqwest::redirect;
use reqwest::{Client, ClientBuilder};

use crate::error::{Error, Result};
use crate::request::RequestOptions;

/// Transport-level settings for the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout, covering the body read.
    pub request_timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("logicoma/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Build a configured transport client.
///
/// Redirects are not followed; a 3xx response surfaces to the classifier
/// like any other status.
pub fn build_transport(config: &TransportConfig) -> Result<Client> {
    ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .redirect(redirect::Policy::none())
        .build()
        .map_err(Error::ClientBuild)
}

/// Issue a single attempt for `options` and surface the raw response.
///
/// Resolves as soon as response headers arrive; reading and judging the
/// body is the classifier's job. Performs no retries: a connection-level
/// failure comes back as [`Error::Transport`] and the caller decides
/// whether to try again.
pub async fn invoke(client: &Client, options: &RequestOptions) -> Result<reqwest::Response> {
    let target = options.target()?;
    tracing::debug!("{} {}", options.method.as_str(), target);

    let mut request = client
        .request(options.method.into(), target.clone())
        .headers(options.headers.clone());
    if let Some(body) = &options.body {
        request = request.body(body.clone());
    }

    let response = request.send().await.map_err(Error::Transport)?;
    tracing::debug!("{} {} -> {}", options.method.as_str(), target, response.status());
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = TransportConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("logicoma/"));
    }

    #[test]
    fn build_transport_succeeds_with_defaults() {
        assert!(build_transport(&TransportConfig::default()).is_ok());
    }
}
