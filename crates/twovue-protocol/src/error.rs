//! Error types for the protocol layer.
//!
//! Each crate in Twovue defines its own error enum. A `ProtocolError`
//! always means the problem is in parsing or (de)serialization, never in
//! game rules or networking.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    ///
    /// The inner `serde_json::Error` is kept so callers can see which
    /// field or value could not be represented.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or a
    /// notification `type` tag this version doesn't know.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded fine but violates protocol rules.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// A user-supplied game identifier could not be normalized into a
    /// valid [`GameId`](crate::GameId).
    #[error("invalid game id: {0:?}")]
    InvalidGameId(String),
}
