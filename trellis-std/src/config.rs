//! Router configuration.

/// Options that change how a [`Router`](crate::router::Router) resolves requests.
///
/// The options are captured per route at registration, so routes mounted
/// from a sub-router keep the sub-router's options.
///
/// ```rust
/// use trellis_std::RouterConfig;
///
/// let config = RouterConfig::default().head_falls_back_to_get(true);
/// assert!(config.decodes_params());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    decode_params: bool,
    head_falls_back_to_get: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            decode_params: true,
            head_falls_back_to_get: false,
        }
    }
}

impl RouterConfig {
    /// Percent-decode bound parameter values (default: on).
    pub fn decode_params(mut self, decode: bool) -> Self {
        self.decode_params = decode;
        self
    }

    /// Serve `HEAD` requests with the `GET` route when no `HEAD` route
    /// matches, dropping the body (default: off).
    pub fn head_falls_back_to_get(mut self, enabled: bool) -> Self {
        self.head_falls_back_to_get = enabled;
        self
    }

    /// Whether parameter values are percent-decoded.
    pub fn decodes_params(&self) -> bool {
        self.decode_params
    }

    /// Whether `HEAD` falls back to `GET`.
    pub fn heads_fall_back_to_get(&self) -> bool {
        self.head_falls_back_to_get
    }
}
