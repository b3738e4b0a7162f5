// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Courier Core Library
//!
//! Client for a binary push-notification gateway: streams notifications
//! over mutually authenticated TLS, recovers from the gateway's error frame
//! and drains the feedback service. TLS is provided by `rustls` on `ring`.

pub mod client;
pub mod feedback;
pub mod network;
pub mod push;

pub use client::{parse_timeout, Client, ClientConfig};
pub use feedback::{FeedbackReader, FeedbackRecord, FEEDBACK_RECORD_SIZE};
pub use network::{
    ConnectionState, Credential, Endpoint, GatewayConnection, NetworkError, TlsTransport,
    Transport, TransportConfig, TransportFactory, TransportResult,
};
#[cfg(any(test, feature = "testing"))]
pub use network::{MockGateway, MockTransport};
pub use push::{
    ErrorFrame, ErrorStatus, Notification, PushObserver, PushReport, PushSession,
    RecordingObserver, TracingObserver,
};
