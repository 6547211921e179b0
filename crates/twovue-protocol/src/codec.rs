//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The notification layer doesn't care HOW a [`Notification`](crate::Notification)
//! becomes bytes; it just needs something that implements [`Codec`].
//!
//! Currently we provide [`JsonCodec`], which matches what the mobile
//! client parses with `JSON.parse`.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds
///
/// - `Send + Sync` → the codec is shared between the hub's accept loop
///   and every per-connection task.
/// - `'static` → the codec owns everything it needs, so it can live
///   inside long-running tokio tasks.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded value
/// doesn't borrow from the input frame, so the frame buffer can be
/// dropped right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use twovue_protocol::{Codec, JsonCodec, Notification};
///
/// let codec = JsonCodec;
///
/// let notification = Notification::TurnSubmitted {
///     turn_number: 2,
///     player_name: "ada".into(),
/// };
///
/// let bytes = codec.encode(&notification).unwrap();
/// let decoded: Notification = codec.decode(&bytes).unwrap();
/// assert_eq!(notification, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
