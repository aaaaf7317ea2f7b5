//! # Egress Client
//!
//! An outbound HTTP client layer for calling third-party APIs identified by
//! a configuration key. A logical key resolves to a base URL and credential,
//! requests are assembled through staged builders, executed over one shared
//! pooled transport with TLS and timeout controls, and responses decode into
//! caller-specified types with failures normalized into a small error
//! taxonomy.
//!
//! ## Features
//!
//! - **Keyed endpoint registry**: base URL, auth header, and optional
//!   gateway prefix per provider key
//! - **Shared blocking transport**: per-route and total connection caps,
//!   connect/read timeouts, TLS trust policy fixed at startup
//! - **Staged builders**: query surface, then header surface, then execute
//! - **Typed decoding**: JSON bodies in and out via `serde`
//! - **No retries**: every failure is logged once and returned to the caller
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use egress_client::{Endpoint, EndpointRegistry, ProviderClient, Transport, TransportConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(EndpointRegistry::from_iter([(
//!         "billing",
//!         Endpoint::new("https://billing.internal.example").with_authorization("Bearer s3cr3t"),
//!     )]));
//!     let transport = Arc::new(Transport::new(TransportConfig::default())?);
//!
//!     let billing = ProviderClient::new("billing", registry, transport);
//!     let invoice: serde_json::Value = billing
//!         .get("/v1/invoices/42")?
//!         .query("expand", "lines")
//!         .fetch()?;
//!
//!     println!("{invoice}");
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod interceptor;
mod pool;
mod registry;
mod request;
mod response;
mod transport;
pub mod urls;

pub use client::ProviderClient;
pub use config::{TlsVersion, TransportConfig, TransportConfigBuilder};
pub use error::{Error, Result};
pub use interceptor::{Exchange, ExchangeLog, TracingExchangeLog};
pub use registry::{Endpoint, EndpointRegistry};
pub use request::{HeaderBuilder, RequestBuilder};
pub use response::Response;
pub use transport::Transport;

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use egress_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::ProviderClient;
    pub use crate::config::{TlsVersion, TransportConfig, TransportConfigBuilder};
    pub use crate::error::{Error, Result};
    pub use crate::interceptor::{Exchange, ExchangeLog, TracingExchangeLog};
    pub use crate::registry::{Endpoint, EndpointRegistry};
    pub use crate::request::{HeaderBuilder, RequestBuilder};
    pub use crate::response::Response;
    pub use crate::transport::Transport;
    pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
}
