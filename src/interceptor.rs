//! Debug-gated exchange logging hook.

use http::{HeaderMap, Method, StatusCode};
use url::Url;

/// One completed request/response exchange, borrowed for logging.
#[derive(Debug)]
pub struct Exchange<'a> {
    /// Request method.
    pub method: &'a Method,
    /// Final request URL.
    pub url: &'a Url,
    /// Headers set on the request.
    pub request_headers: &'a HeaderMap,
    /// Encoded request body, if any.
    pub request_body: Option<&'a [u8]>,
    /// Response status code.
    pub status: StatusCode,
    /// Response status text.
    pub status_text: &'a str,
    /// Response headers.
    pub response_headers: &'a HeaderMap,
    /// Raw response body.
    pub response_body: &'a [u8],
}

/// Sink invoked with every exchange while debug logging is enabled.
///
/// The transport calls this hook but does not own the sink; embedders can
/// forward exchanges to whatever audit channel they use.
pub trait ExchangeLog: Send + Sync {
    /// Record one completed exchange.
    fn record(&self, exchange: &Exchange<'_>);
}

/// Default sink that emits exchanges through `tracing` at debug level.
#[derive(Debug, Default)]
pub struct TracingExchangeLog;

impl ExchangeLog for TracingExchangeLog {
    fn record(&self, exchange: &Exchange<'_>) {
        let request_body = exchange
            .request_body
            .map(String::from_utf8_lossy)
            .unwrap_or_default();
        let response_body = String::from_utf8_lossy(exchange.response_body);
        tracing::debug!(
            method = %exchange.method,
            url = %exchange.url,
            request_headers = ?exchange.request_headers,
            request_body = %request_body,
            status = exchange.status.as_u16(),
            status_text = exchange.status_text,
            response_headers = ?exchange.response_headers,
            response_body = %response_body,
            "third-party exchange"
        );
    }
}
