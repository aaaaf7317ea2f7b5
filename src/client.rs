//! Per-provider entry point.

use std::sync::Arc;

use http::Method;
use serde::Serialize;

use crate::error::Result;
use crate::registry::{Endpoint, EndpointRegistry};
use crate::request::RequestBuilder;
use crate::transport::Transport;
use crate::urls;

/// Client for one third-party provider, identified by its registry key.
///
/// One value is constructed per provider at startup and shared; every verb
/// resolves the key, joins the path onto the endpoint's base URL, and hands
/// back a request builder with the endpoint's auth header already injected.
#[derive(Clone)]
pub struct ProviderClient {
    key: String,
    registry: Arc<EndpointRegistry>,
    transport: Arc<Transport>,
}

impl ProviderClient {
    /// Create a client bound to a provider key.
    pub fn new(
        key: impl Into<String>,
        registry: Arc<EndpointRegistry>,
        transport: Arc<Transport>,
    ) -> Self {
        Self {
            key: key.into(),
            registry,
            transport,
        }
    }

    /// The provider key this client resolves.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Look up this provider's endpoint.
    pub fn endpoint(&self) -> Result<&Endpoint> {
        self.registry.get(&self.key)
    }

    /// Resolve a request path against the endpoint's base URL, routing
    /// through the gateway prefix when one is configured.
    pub fn resolve_url(&self, path: &str) -> Result<String> {
        let endpoint = self.endpoint()?;
        Ok(match &endpoint.gateway_prefix {
            Some(prefix) => urls::join(&urls::join(&endpoint.base_url, prefix), path),
            None => urls::join(&endpoint.base_url, path),
        })
    }

    fn prepare(&self, method: Method, path: &str) -> Result<RequestBuilder<'_>> {
        let endpoint = self.endpoint()?;
        let url = self.resolve_url(path)?;
        let builder = RequestBuilder::new(&self.transport, method, url)
            .initial_header(&endpoint.authorization_header, &endpoint.authorization);
        Ok(builder)
    }

    fn prepare_with_body<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<RequestBuilder<'_>> {
        let endpoint = self.endpoint()?;
        let url = self.resolve_url(path)?;
        let builder = RequestBuilder::with_body(&self.transport, method, url, body)
            .initial_header(&endpoint.authorization_header, &endpoint.authorization);
        Ok(builder)
    }

    /// Start a GET request for `path`.
    pub fn get(&self, path: &str) -> Result<RequestBuilder<'_>> {
        self.prepare(Method::GET, path)
    }

    /// Start a DELETE request for `path`.
    pub fn delete(&self, path: &str) -> Result<RequestBuilder<'_>> {
        self.prepare(Method::DELETE, path)
    }

    /// Start a POST request for `path` with a JSON-encoded body.
    pub fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<RequestBuilder<'_>> {
        self.prepare_with_body(Method::POST, path, body)
    }

    /// Start a body-less POST request for `path`.
    pub fn post_empty(&self, path: &str) -> Result<RequestBuilder<'_>> {
        self.prepare(Method::POST, path)
    }

    /// Start a PUT request for `path` with a JSON-encoded body.
    pub fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<RequestBuilder<'_>> {
        self.prepare_with_body(Method::PUT, path, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportConfig;
    use crate::error::Error;

    fn client(registry: EndpointRegistry, key: &str) -> ProviderClient {
        let transport = Arc::new(Transport::new(TransportConfig::default()).unwrap());
        ProviderClient::new(key, Arc::new(registry), transport)
    }

    #[test]
    fn resolve_url_joins_base_and_path() {
        let registry =
            EndpointRegistry::from_iter([("users", Endpoint::new("https://users.example//"))]);
        let client = client(registry, "users");

        let url = client.resolve_url("/v1/accounts").unwrap();
        assert_eq!(url, "https://users.example/v1/accounts");
    }

    #[test]
    fn resolve_url_splices_gateway_prefix() {
        let registry = EndpointRegistry::from_iter([(
            "users",
            Endpoint::new("https://gw.example").with_gateway_prefix("partner-api"),
        )]);
        let client = client(registry, "users");

        let url = client.resolve_url("v1/accounts").unwrap();
        assert_eq!(url, "https://gw.example/partner-api/v1/accounts");
    }

    #[test]
    fn unknown_key_fails_at_verb_call() {
        let client = client(EndpointRegistry::default(), "missing");
        let err = client.get("/ping").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
