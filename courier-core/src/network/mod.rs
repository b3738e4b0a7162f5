// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network + Transport Layer
//!
//! Provides the encrypted connection to the push gateway and the feedback
//! service.
//!
//! # Architecture
//!
//! The network layer consists of:
//! - **Endpoint**: `scheme://host:port` descriptor of a service
//! - **Credential**: client certificate and private key
//! - **Transport trait**: open/handshake/read/write/readiness/close
//! - **TlsTransport**: rustls session over a TCP socket
//! - **GatewayConnection**: handshake retry policy and scoped lifetime
//!
//! # Example
//!
//! ```ignore
//! use courier_core::network::{Credential, Endpoint, GatewayConnection, TlsTransport, TransportConfig};
//!
//! let credential = Credential::from_pem_file(path, None)?;
//! GatewayConnection::with_connection(
//!     TlsTransport::new(),
//!     &Endpoint::development_gateway(),
//!     &credential,
//!     &TransportConfig::default(),
//!     |conn| conn.write(&frame),
//! )?;
//! ```

pub mod connection;
pub mod credential;
pub mod endpoint;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod mock;
pub mod tls;
pub mod transport;

// Error types
pub use error::NetworkError;

// Endpoints and credentials
pub use credential::Credential;
pub use endpoint::{
    Endpoint, DEVELOPMENT_FEEDBACK_URI, DEVELOPMENT_GATEWAY_URI, PRODUCTION_FEEDBACK_URI,
    PRODUCTION_GATEWAY_URI,
};

// Transport abstraction
pub use transport::{
    ConnectionState, Readiness, Transport, TransportConfig, TransportFactory, TransportResult,
};

// Mock transport for testing
#[cfg(any(test, feature = "testing"))]
pub use mock::{MockConnectionLog, MockConnectionScript, MockGateway, MockTransport};

// TLS transport for production
pub use tls::TlsTransport;

// Connection management
pub use connection::GatewayConnection;
