//! Shared blocking transport.

use std::sync::Arc;

use http::{HeaderMap, Method};
use tracing::Level;
use url::Url;

use crate::config::TransportConfig;
use crate::error::{Error, Result};
use crate::interceptor::{Exchange, ExchangeLog, TracingExchangeLog};
use crate::pool::RoutePool;
use crate::response::Response;

/// The one shared HTTP transport for the process lifetime.
///
/// Wraps a pooled, TLS-configured `reqwest` blocking client plus the
/// route-capacity gate. Safe for concurrent use from many threads; settings
/// are fixed at construction.
pub struct Transport {
    inner: reqwest::blocking::Client,
    pool: RoutePool,
    config: TransportConfig,
    exchange_log: Arc<dyn ExchangeLog>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Build the transport with the default `tracing` exchange sink.
    pub fn new(config: TransportConfig) -> Result<Self> {
        Self::with_exchange_log(config, Arc::new(TracingExchangeLog))
    }

    /// Build the transport with a caller-supplied exchange sink.
    pub fn with_exchange_log(
        config: TransportConfig,
        exchange_log: Arc<dyn ExchangeLog>,
    ) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(config.read_timeout)
            .connect_timeout(config.effective_connect_timeout())
            .user_agent(&config.user_agent);

        if config.trust_all_certificates {
            // Under rustls this also disables hostname verification.
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(version) = config.min_tls_version {
            builder = builder.min_tls_version(version);
        }
        if let Some(version) = config.max_tls_version {
            builder = builder.max_tls_version(version);
        }

        let inner = builder.build()?;
        let pool = RoutePool::new(config.max_per_route, config.max_total);

        Ok(Self {
            inner,
            pool,
            config,
            exchange_log,
        })
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Execute a fully-resolved request and buffer the response.
    ///
    /// Blocks for a pool slot, then for connect and response within the
    /// configured timeouts. Any status code is returned as a [`Response`];
    /// classification of 4xx/5xx happens in the resolver.
    pub(crate) fn dispatch(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        let _permit = self.pool.checkout(&url, self.config.read_timeout)?;

        let debug_enabled = tracing::enabled!(Level::DEBUG);
        let log_headers = debug_enabled.then(|| headers.clone());
        let log_body = if debug_enabled { body.clone() } else { None };

        let mut request = self.inner.request(method.clone(), url.clone()).headers(headers);
        if let Some(bytes) = body {
            request = request.body(bytes);
        }
        let request = request.build()?;

        let raw = self.inner.execute(request).map_err(|e| {
            tracing::error!(method = %method, url = %url, cause = %e, "third-party transport failure");
            Error::Transport(e)
        })?;
        let response = Response::from_blocking(raw).map_err(|e| {
            tracing::error!(method = %method, url = %url, cause = %e, "failed reading third-party response");
            e
        })?;

        if let Some(request_headers) = &log_headers {
            self.exchange_log.record(&Exchange {
                method: &method,
                url: &url,
                request_headers,
                request_body: log_body.as_deref(),
                status: response.status(),
                status_text: response.status_text(),
                response_headers: response.headers(),
                response_body: response.bytes().as_ref(),
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn builds_from_default_config() {
        let transport = Transport::new(TransportConfig::default()).unwrap();
        assert_eq!(transport.config().max_per_route, 40);
        assert!(!transport.config().trust_all_certificates);
    }

    #[test]
    fn builds_with_trust_all_opt_in() {
        let config = TransportConfig::builder()
            .trust_all_certificates(true)
            .connect_timeout(Duration::from_millis(100))
            .build();
        let transport = Transport::new(config).unwrap();
        assert!(transport.config().trust_all_certificates);
    }
}
