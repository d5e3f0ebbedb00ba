//! NATS connection management.
//!
//! A thin wrapper around `async-nats` with session-bus defaults.

use tracing::info;

use crate::error::SessionError;

/// Default NATS server URL.
pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

/// The environment variable used to override the NATS URL.
pub const NATS_URL_ENV: &str = "NATS_URL";

/// A NATS client carrying the session event bus.
#[derive(Debug, Clone)]
pub struct Connection {
    /// The underlying NATS client.
    client: async_nats::Client,
}

impl Connection {
    /// Connect using the URL from the `NATS_URL` environment variable,
    /// falling back to [`DEFAULT_NATS_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connect`] if the connection cannot be
    /// established.
    pub async fn connect() -> Result<Self, SessionError> {
        let url = std::env::var(NATS_URL_ENV).unwrap_or_else(|_| DEFAULT_NATS_URL.to_string());
        Self::connect_to(&url).await
    }

    /// Connect to NATS at the specified URL.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connect`] if the connection cannot be
    /// established.
    pub async fn connect_to(url: &str) -> Result<Self, SessionError> {
        info!(url, "connecting to session bus");
        let client = async_nats::connect(url).await?;
        info!("session bus connection established");
        Ok(Self { client })
    }

    /// Publish a MessagePack-encoded event to a subject.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if encoding or publishing fails.
    pub async fn publish<T: serde::Serialize>(
        &self,
        subject: &str,
        event: &T,
    ) -> Result<(), SessionError> {
        let payload = crate::codec::encode(event)?;
        self.client
            .publish(subject.to_string(), payload.into())
            .await?;
        Ok(())
    }

    /// Subscribe to a subject (wildcards allowed).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Subscribe`] if the subscription fails.
    pub async fn subscribe(&self, subject: &str) -> Result<async_nats::Subscriber, SessionError> {
        let sub = self.client.subscribe(subject.to_string()).await?;
        Ok(sub)
    }
}
