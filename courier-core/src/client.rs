// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Client
//!
//! One object holding the gateway and feedback endpoints, the credential
//! and the push timeout, with environment-based configuration.

use std::path::Path;
use std::time::Duration;

use crate::feedback::{FeedbackReader, FeedbackRecord};
use crate::network::{
    Credential, Endpoint, NetworkError, TlsTransport, TransportConfig, TransportFactory,
    TransportResult,
};
use crate::push::{
    Notification, PushObserver, PushReport, PushSession, TracingObserver, DEFAULT_PUSH_TIMEOUT,
};

/// Environment variable holding the gateway URI.
pub const ENV_GATEWAY_URI: &str = "APN_GATEWAY_URI";
/// Environment variable holding the feedback URI.
pub const ENV_FEEDBACK_URI: &str = "APN_FEEDBACK_URI";
/// Environment variable holding the path to the certificate + key PEM.
pub const ENV_CERTIFICATE: &str = "APN_CERTIFICATE";
/// Environment variable holding the private key passphrase.
pub const ENV_CERTIFICATE_PASSPHRASE: &str = "APN_CERTIFICATE_PASSPHRASE";
/// Environment variable holding the push timeout in seconds.
pub const ENV_TIMEOUT: &str = "APN_TIMEOUT";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Push gateway endpoint.
    pub gateway: Endpoint,
    /// Feedback service endpoint.
    pub feedback: Endpoint,
    /// Client certificate and key.
    pub credential: Credential,
    /// Wait for a late error frame after the last write of a batch.
    pub timeout: Duration,
    /// Socket timeouts and handshake retry budget.
    pub transport: TransportConfig,
}

impl ClientConfig {
    /// Production gateway and feedback endpoints.
    pub fn production(credential: Credential) -> Self {
        ClientConfig {
            gateway: Endpoint::production_gateway(),
            feedback: Endpoint::production_feedback(),
            credential,
            timeout: DEFAULT_PUSH_TIMEOUT,
            transport: TransportConfig::default(),
        }
    }

    /// Sandbox gateway and feedback endpoints.
    pub fn development(credential: Credential) -> Self {
        ClientConfig {
            gateway: Endpoint::development_gateway(),
            feedback: Endpoint::development_feedback(),
            ..ClientConfig::production(credential)
        }
    }

    /// Loads configuration from the process environment.
    ///
    /// `APN_CERTIFICATE` (a PEM file path) is required. Unset endpoints
    /// default to production; `APN_TIMEOUT` defaults to 0.5 seconds.
    pub fn from_env() -> Result<Self, NetworkError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, NetworkError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let certificate = lookup(ENV_CERTIFICATE)
            .ok_or_else(|| NetworkError::Configuration(format!("{} is not set", ENV_CERTIFICATE)))?;
        let passphrase = lookup(ENV_CERTIFICATE_PASSPHRASE).filter(|p| !p.is_empty());
        let credential = Credential::from_pem_file(Path::new(&certificate), passphrase.as_deref())?;

        let mut config = ClientConfig::production(credential);

        if let Some(uri) = lookup(ENV_GATEWAY_URI) {
            config.gateway = Endpoint::parse(&uri)?;
        }
        if let Some(uri) = lookup(ENV_FEEDBACK_URI) {
            config.feedback = Endpoint::parse(&uri)?;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT) {
            config.timeout = parse_timeout(&timeout)?;
        }

        Ok(config)
    }

    /// Overrides the push timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides socket timeouts and the handshake retry budget.
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }
}

/// Parses a timeout given in (fractional) seconds.
pub fn parse_timeout(value: &str) -> Result<Duration, NetworkError> {
    let seconds: f64 = value
        .trim()
        .parse()
        .map_err(|_| NetworkError::Configuration(format!("invalid timeout: {}", value)))?;

    Duration::try_from_secs_f64(seconds)
        .map_err(|_| NetworkError::Configuration(format!("invalid timeout: {}", value)))
}

/// Push and feedback client.
///
/// # Example
///
/// ```ignore
/// use courier_core::{Client, ClientConfig, Notification};
///
/// let mut client = Client::new(ClientConfig::from_env()?);
/// let mut batch = vec![Notification::new(token, r#"{"aps":{"alert":"Hi"}}"#)];
/// client.push(&mut batch)?;
///
/// for record in client.unregistered_devices()? {
///     println!("{} gone since {}", record.token(), record.timestamp());
/// }
/// ```
pub struct Client<F: TransportFactory + Clone, O: PushObserver = TracingObserver> {
    session: PushSession<F, O>,
    feedback: FeedbackReader<F>,
}

impl Client<fn() -> TlsTransport> {
    /// Creates a client that connects over TLS.
    pub fn new(config: ClientConfig) -> Self {
        Client::with_factory(config, TlsTransport::new as fn() -> TlsTransport)
    }
}

impl<F: TransportFactory + Clone> Client<F, TracingObserver> {
    /// Creates a client whose connections come from `factory`.
    pub fn with_factory(config: ClientConfig, factory: F) -> Self {
        let session = PushSession::new(factory.clone(), config.gateway, config.credential.clone())
            .with_timeout(config.timeout)
            .with_transport_config(config.transport.clone());
        let feedback = FeedbackReader::new(factory, config.feedback, config.credential)
            .with_transport_config(config.transport);

        Client { session, feedback }
    }
}

impl<F: TransportFactory + Clone, O: PushObserver> Client<F, O> {
    /// Replaces the observer that receives push rejections.
    pub fn with_observer<P: PushObserver>(self, observer: P) -> Client<F, P> {
        Client {
            session: self.session.with_observer(observer),
            feedback: self.feedback,
        }
    }

    /// Pushes `notifications`; see [`PushSession::push`].
    pub fn push(&mut self, notifications: &mut [Notification]) -> TransportResult<PushReport> {
        self.session.push(notifications)
    }

    /// Drains the feedback service.
    pub fn unregistered_devices(&self) -> TransportResult<Vec<FeedbackRecord>> {
        self.feedback.drain()
    }

    /// Tokens of every device the feedback service reports.
    pub fn devices(&self) -> TransportResult<Vec<String>> {
        self.feedback.devices()
    }

    pub fn session(&self) -> &PushSession<F, O> {
        &self.session
    }

    pub fn feedback(&self) -> &FeedbackReader<F> {
        &self.feedback
    }
}
