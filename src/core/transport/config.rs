//! HTTP transport configuration.

use serde::{Deserialize, Serialize};

use crate::core::config::env_flag;

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Host address to bind to.
    pub host: String,

    /// Port number to listen on.
    pub port: u16,

    /// Enable CORS for browser clients.
    pub enable_cors: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

impl HttpConfig {
    /// Create an HTTP config for the given address.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// The bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Apply `GATEWAY_HTTP_HOST`, `GATEWAY_HTTP_PORT` and `GATEWAY_HTTP_CORS`.
    pub fn with_env(mut self) -> Self {
        if let Ok(host) = std::env::var("GATEWAY_HTTP_HOST") {
            self.host = host;
        }

        if let Some(port) = std::env::var("GATEWAY_HTTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            self.port = port;
        }

        if let Some(cors) = env_flag("GATEWAY_HTTP_CORS") {
            self.enable_cors = cors;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address() {
        assert_eq!(HttpConfig::new("0.0.0.0", 9000).address(), "0.0.0.0:9000");
        assert_eq!(HttpConfig::default().address(), "127.0.0.1:8080");
    }
}
