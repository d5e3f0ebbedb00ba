//! Session-layer error types.

/// Errors that can occur while exchanging session events.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to encode an event to MessagePack.
    #[error("failed to encode session event: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode an event from MessagePack.
    #[error("failed to decode session event: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// NATS connection error.
    #[error("NATS connection error: {0}")]
    Connect(#[from] async_nats::ConnectError),

    /// NATS subscription error.
    #[error("NATS subscribe error: {0}")]
    Subscribe(#[from] async_nats::SubscribeError),

    /// NATS publish error.
    #[error("NATS publish error: {0}")]
    Publish(#[from] async_nats::PublishError),
}
