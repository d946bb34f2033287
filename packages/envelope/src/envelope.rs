//! The tagged payload container.

use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{CodecError, Message, TypeTag};

/// An opaque payload paired with the tag needed to decode it.
///
/// On the wire an envelope is a JSON object with the payload base64 encoded:
///
/// ```json
/// {"typeUrl": "type.shoppingcart/AddProductRequest", "value": "eyJwcm9kdWN0SWQiOiJhYmMifQ=="}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireEnvelope", into = "WireEnvelope")]
pub struct Envelope {
    pub type_tag: TypeTag,
    pub payload: Bytes,
}

impl Envelope {
    pub fn new(type_tag: impl Into<TypeTag>, payload: impl Into<Bytes>) -> Self {
        Self {
            type_tag: type_tag.into(),
            payload: payload.into(),
        }
    }

    /// Pack a message using the default codec.
    pub fn pack<T: Message>(message: &T) -> Result<Self, CodecError> {
        crate::encode(message)
    }

    /// Unpack this envelope as `T` using the default codec.
    pub fn unpack<T: Message>(&self) -> Result<T, CodecError> {
        crate::decode(self)
    }

    /// Parse an envelope from its JSON wire form.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CodecError> {
        serde_json::from_slice(bytes)
            .map_err(|e| CodecError::decode(TypeTag::ENVELOPE, e.to_string()))
    }

    /// Render the JSON wire form.
    pub fn to_json(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self)
            .map_err(|e| CodecError::encode(TypeTag::ENVELOPE, e.to_string()))
    }

    /// Whether this envelope claims to carry a `T`.
    pub fn is<T: Message>(&self) -> bool {
        self.type_tag == T::TYPE_TAG
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEnvelope {
    type_url: String,
    #[serde(default)]
    value: String,
}

impl From<Envelope> for WireEnvelope {
    fn from(envelope: Envelope) -> Self {
        Self {
            type_url: envelope.type_tag.as_str().to_string(),
            value: base64::engine::general_purpose::STANDARD.encode(&envelope.payload),
        }
    }
}

impl TryFrom<WireEnvelope> for Envelope {
    type Error = String;

    fn try_from(wire: WireEnvelope) -> Result<Self, Self::Error> {
        let payload = base64::engine::general_purpose::STANDARD
            .decode(wire.value.as_bytes())
            .map_err(|e| format!("invalid base64 payload for {}: {}", wire.type_url, e))?;

        Ok(Envelope::new(TypeTag::new(wire.type_url), payload))
    }
}
