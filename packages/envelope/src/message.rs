//! Typed messages and the encode/decode entry points.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Codec, CodecError, Envelope, JsonCodec, TypeTag};

/// A payload type that can travel inside an [`Envelope`].
///
/// # Example
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use sidecar_envelope::{Message, TypeTag};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Ping {
///     seq: u64,
/// }
///
/// impl Message for Ping {
///     const TYPE_TAG: TypeTag = TypeTag::from_static("type.example/Ping");
/// }
///
/// let envelope = sidecar_envelope::encode(&Ping { seq: 7 }).unwrap();
/// let ping: Ping = sidecar_envelope::decode(&envelope).unwrap();
/// assert_eq!(ping, Ping { seq: 7 });
/// ```
pub trait Message: Serialize + DeserializeOwned + Send + 'static {
    /// Unique identifier of this message's schema.
    const TYPE_TAG: TypeTag;

    /// Reject values the schema does not allow.
    ///
    /// Called before every encode. The default accepts everything.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A message with no fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

impl Message for Empty {
    const TYPE_TAG: TypeTag = TypeTag::EMPTY;
}

/// Encode a message with the default codec.
pub fn encode<T: Message>(message: &T) -> Result<Envelope, CodecError> {
    encode_with(&JsonCodec, message)
}

/// Decode a message with the default codec.
pub fn decode<T: Message>(envelope: &Envelope) -> Result<T, CodecError> {
    decode_with(&JsonCodec, envelope)
}

/// Encode a message with a specific codec.
pub fn encode_with<T: Message>(codec: &dyn Codec, message: &T) -> Result<Envelope, CodecError> {
    message
        .validate()
        .map_err(|reason| CodecError::encode(T::TYPE_TAG, reason))?;

    let value = serde_json::to_value(message)
        .map_err(|e| CodecError::encode(T::TYPE_TAG, e.to_string()))?;
    let payload = codec.encode_value(&value, &T::TYPE_TAG)?;

    Ok(Envelope::new(T::TYPE_TAG, payload))
}

/// Decode a message with a specific codec.
///
/// The envelope's tag is checked before any bytes are parsed, and the decoded
/// value must pass [`Message::validate`].
pub fn decode_with<T: Message>(codec: &dyn Codec, envelope: &Envelope) -> Result<T, CodecError> {
    if envelope.type_tag != T::TYPE_TAG {
        return Err(CodecError::SchemaMismatch {
            expected: T::TYPE_TAG,
            found: envelope.type_tag.clone(),
        });
    }

    let value = codec.decode_value(&envelope.payload, &T::TYPE_TAG)?;
    let message: T = serde_json::from_value(value)
        .map_err(|e| CodecError::decode(T::TYPE_TAG, e.to_string()))?;
    message
        .validate()
        .map_err(|reason| CodecError::decode(T::TYPE_TAG, reason))?;
    Ok(message)
}
