//! Keyed registry of third-party endpoints.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};

fn default_authorization_header() -> String {
    "Authorization".to_string()
}

/// Connection details for one third-party provider.
///
/// Deserializable so an external configuration layer can populate the
/// registry from its own source; field names follow kebab-case keys
/// (`base-url`, `authorization-header`, `gateway-prefix`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Endpoint {
    /// Absolute base URL of the provider.
    pub base_url: String,
    /// Credential value sent with every request.
    #[serde(default)]
    pub authorization: String,
    /// Header name the credential is sent under.
    #[serde(default = "default_authorization_header")]
    pub authorization_header: String,
    /// Optional path segment spliced between the base URL and request paths.
    #[serde(default)]
    pub gateway_prefix: Option<String>,
}

impl Endpoint {
    /// Create an endpoint with the default `Authorization` header and no
    /// credential.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            authorization: String::new(),
            authorization_header: default_authorization_header(),
            gateway_prefix: None,
        }
    }

    /// Set the credential value.
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = value.into();
        self
    }

    /// Send the credential under a custom header name.
    pub fn with_authorization_header(mut self, name: impl Into<String>) -> Self {
        self.authorization_header = name.into();
        self
    }

    /// Route requests through a gateway path prefix.
    pub fn with_gateway_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.gateway_prefix = Some(prefix.into());
        self
    }
}

/// Read-only mapping from a logical provider key to its [`Endpoint`].
///
/// Populated once at startup and never mutated afterwards; an unknown key is
/// a configuration defect, not a runtime condition to retry. The internal map
/// is deliberately not exposed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct EndpointRegistry {
    endpoints: HashMap<String, Endpoint>,
}

impl EndpointRegistry {
    /// Create a registry from an already-loaded key/endpoint map.
    pub fn new(endpoints: HashMap<String, Endpoint>) -> Self {
        Self { endpoints }
    }

    /// Look up the endpoint for a provider key.
    ///
    /// There is no default fallback: a missing key yields
    /// [`Error::Configuration`].
    pub fn get(&self, key: &str) -> Result<&Endpoint> {
        self.endpoints
            .get(key)
            .ok_or_else(|| Error::Configuration(format!("no endpoint registered for key `{key}`")))
    }

    /// Check whether a provider key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.endpoints.contains_key(key)
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// True when no endpoint is registered.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Endpoint)> for EndpointRegistry {
    fn from_iter<I: IntoIterator<Item = (K, Endpoint)>>(iter: I) -> Self {
        Self {
            endpoints: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_is_a_configuration_error() {
        let registry = EndpointRegistry::default();
        let err = registry.get("billing").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("billing"));
    }

    #[test]
    fn lookup_returns_registered_endpoint() {
        let registry = EndpointRegistry::from_iter([(
            "billing",
            Endpoint::new("https://billing.example").with_authorization("Bearer abc"),
        )]);
        assert!(registry.contains("billing"));
        assert!(!registry.contains("shipping"));

        let endpoint = registry.get("billing").unwrap();
        assert_eq!(endpoint.base_url, "https://billing.example");
        assert_eq!(endpoint.authorization, "Bearer abc");
    }

    #[test]
    fn authorization_header_defaults() {
        let endpoint = Endpoint::new("https://svc.example");
        assert_eq!(endpoint.authorization_header, "Authorization");
        assert!(endpoint.gateway_prefix.is_none());

        let custom = Endpoint::new("https://svc.example").with_authorization_header("X-Api-Key");
        assert_eq!(custom.authorization_header, "X-Api-Key");
    }

    #[test]
    fn deserializes_from_external_configuration() {
        let registry: EndpointRegistry = serde_json::from_str(
            r#"{
                "users": {
                    "base-url": "https://users.example",
                    "authorization": "Bearer tok",
                    "gateway-prefix": "partner-api"
                }
            }"#,
        )
        .unwrap();

        let endpoint = registry.get("users").unwrap();
        assert_eq!(endpoint.base_url, "https://users.example");
        assert_eq!(endpoint.authorization_header, "Authorization");
        assert_eq!(endpoint.gateway_prefix.as_deref(), Some("partner-api"));
    }
}
