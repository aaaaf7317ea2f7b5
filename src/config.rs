//! Transport configuration.

use std::time::Duration;

pub use reqwest::tls::Version as TlsVersion;

/// Fraction of the read timeout used when no connect timeout is set.
const CONNECT_TIMEOUT_RATIO: f64 = 0.05;

/// Settings for the shared transport.
///
/// Fixed at startup; [`crate::Transport`] takes ownership and exposes no
/// mutation afterwards.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Time allowed between writing the request and the response arriving.
    pub read_timeout: Duration,
    /// Time allowed for TCP + TLS establishment. `None` derives 5% of the
    /// read timeout.
    pub connect_timeout: Option<Duration>,
    /// Maximum in-flight connections per scheme+host+port route.
    pub max_per_route: usize,
    /// Maximum in-flight connections overall.
    pub max_total: usize,
    /// Accept any server certificate and skip hostname verification.
    ///
    /// Insecure; acceptable only behind an internal network boundary.
    pub trust_all_certificates: bool,
    /// Lowest TLS protocol version offered.
    pub min_tls_version: Option<TlsVersion>,
    /// Highest TLS protocol version offered.
    pub max_tls_version: Option<TlsVersion>,
    /// User agent string.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(15_000),
            connect_timeout: None,
            max_per_route: 40,
            max_total: 100,
            trust_all_certificates: false,
            min_tls_version: Some(TlsVersion::TLS_1_2),
            max_tls_version: None,
            user_agent: format!("egress-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl TransportConfig {
    /// Create a new configuration builder.
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }

    /// Connect timeout in effect: the explicit value, or 5% of the read
    /// timeout when none was set.
    pub fn effective_connect_timeout(&self) -> Duration {
        self.connect_timeout
            .unwrap_or_else(|| self.read_timeout.mul_f64(CONNECT_TIMEOUT_RATIO))
    }
}

/// Builder for [`TransportConfig`].
#[derive(Debug, Default)]
pub struct TransportConfigBuilder {
    config: TransportConfig,
}

impl TransportConfigBuilder {
    /// Set the read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Set the connect timeout independently of the read timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Set the per-route connection cap.
    pub fn max_per_route(mut self, max: usize) -> Self {
        self.config.max_per_route = max;
        self
    }

    /// Set the total connection cap.
    pub fn max_total(mut self, max: usize) -> Self {
        self.config.max_total = max;
        self
    }

    /// Opt in to trusting any server certificate.
    pub fn trust_all_certificates(mut self, trust: bool) -> Self {
        self.config.trust_all_certificates = trust;
        self
    }

    /// Set the lowest TLS protocol version offered.
    pub fn min_tls_version(mut self, version: TlsVersion) -> Self {
        self.config.min_tls_version = Some(version);
        self
    }

    /// Set the highest TLS protocol version offered.
    pub fn max_tls_version(mut self, version: TlsVersion) -> Self {
        self.config.max_tls_version = Some(version);
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> TransportConfig {
        self.config
    }
}
