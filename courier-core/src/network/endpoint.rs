// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Gateway Endpoints
//!
//! URI-like descriptors for the push gateway and the feedback service.

use std::fmt;
use std::str::FromStr;

use super::error::NetworkError;

/// Production push gateway.
pub const PRODUCTION_GATEWAY_URI: &str = "apn://gateway.push.apple.com:2195";
/// Production feedback service.
pub const PRODUCTION_FEEDBACK_URI: &str = "apn://feedback.push.apple.com:2196";
/// Sandbox push gateway.
pub const DEVELOPMENT_GATEWAY_URI: &str = "apn://gateway.sandbox.push.apple.com:2195";
/// Sandbox feedback service.
pub const DEVELOPMENT_FEEDBACK_URI: &str = "apn://feedback.sandbox.push.apple.com:2196";

/// Schemes accepted for TLS gateway endpoints.
const SCHEMES: [&str; 3] = ["apn", "tls", "ssl"];

/// A gateway or feedback endpoint (`scheme://host:port`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    scheme: String,
    host: String,
    port: u16,
}

impl Endpoint {
    /// Creates an endpoint from its parts.
    pub fn new(scheme: &str, host: &str, port: u16) -> Self {
        Endpoint {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
        }
    }

    /// Parses `scheme://host:port`. A trailing path is ignored.
    pub fn parse(uri: &str) -> Result<Self, NetworkError> {
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| NetworkError::InvalidEndpoint(format!("missing scheme: {}", uri)))?;

        let scheme = scheme.to_ascii_lowercase();
        if !SCHEMES.contains(&scheme.as_str()) {
            return Err(NetworkError::InvalidEndpoint(format!(
                "unsupported scheme '{}' (expected apn://, tls:// or ssl://)",
                scheme
            )));
        }

        let host_port = rest.split('/').next().unwrap_or(rest);
        let (host, port) = host_port
            .rsplit_once(':')
            .ok_or_else(|| NetworkError::InvalidEndpoint(format!("missing port: {}", uri)))?;

        if host.is_empty() {
            return Err(NetworkError::InvalidEndpoint(format!("missing host: {}", uri)));
        }

        let port: u16 = port
            .parse()
            .map_err(|_| NetworkError::InvalidEndpoint(format!("invalid port: {}", port)))?;

        Ok(Endpoint::new(&scheme, host, port))
    }

    /// Production push gateway endpoint.
    pub fn production_gateway() -> Self {
        Endpoint::new("apn", "gateway.push.apple.com", 2195)
    }

    /// Production feedback endpoint.
    pub fn production_feedback() -> Self {
        Endpoint::new("apn", "feedback.push.apple.com", 2196)
    }

    /// Sandbox push gateway endpoint.
    pub fn development_gateway() -> Self {
        Endpoint::new("apn", "gateway.sandbox.push.apple.com", 2195)
    }

    /// Sandbox feedback endpoint.
    pub fn development_feedback() -> Self {
        Endpoint::new("apn", "feedback.sandbox.push.apple.com", 2196)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port`, suitable for socket address resolution.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Endpoint::parse(s)
    }
}
