//! Payload codecs.

use bytes::Bytes;

use crate::{CodecError, TypeTag};

/// Converts between structured values and payload bytes.
///
/// The type tag is passed through so errors can name the schema that failed.
/// Codecs never inspect the tag to pick a schema; that is the job of
/// [`Message`](crate::Message).
pub trait Codec: Send + Sync {
    /// Decode payload bytes into a value.
    fn decode_value(
        &self,
        bytes: &Bytes,
        type_tag: &TypeTag,
    ) -> Result<serde_json::Value, CodecError>;

    /// Encode a value into payload bytes.
    fn encode_value(
        &self,
        value: &serde_json::Value,
        type_tag: &TypeTag,
    ) -> Result<Bytes, CodecError>;

    /// MIME type of the bytes this codec produces.
    fn content_type(&self) -> &'static str;
}

/// The default codec: payloads are JSON documents.
///
/// An empty payload decodes as an empty object, so messages whose fields all
/// have defaults can travel with no bytes at all.
///
/// # Example
///
/// ```rust
/// use sidecar_envelope::{Codec, JsonCodec, TypeTag};
///
/// let codec = JsonCodec;
/// let tag = TypeTag::from("type.example/Greeting");
/// let value = serde_json::json!({"text": "hello"});
///
/// let bytes = codec.encode_value(&value, &tag).unwrap();
/// assert_eq!(codec.decode_value(&bytes, &tag).unwrap(), value);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn decode_value(
        &self,
        bytes: &Bytes,
        type_tag: &TypeTag,
    ) -> Result<serde_json::Value, CodecError> {
        if bytes.is_empty() {
            return Ok(serde_json::Value::Object(serde_json::Map::new()));
        }

        serde_json::from_slice(bytes)
            .map_err(|e| CodecError::decode(type_tag.clone(), e.to_string()))
    }

    fn encode_value(
        &self,
        value: &serde_json::Value,
        type_tag: &TypeTag,
    ) -> Result<Bytes, CodecError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| CodecError::encode(type_tag.clone(), e.to_string()))?;
        Ok(Bytes::from(bytes))
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

impl<T: Codec + ?Sized> Codec for Box<T> {
    fn decode_value(
        &self,
        bytes: &Bytes,
        type_tag: &TypeTag,
    ) -> Result<serde_json::Value, CodecError> {
        self.as_ref().decode_value(bytes, type_tag)
    }

    fn encode_value(
        &self,
        value: &serde_json::Value,
        type_tag: &TypeTag,
    ) -> Result<Bytes, CodecError> {
        self.as_ref().encode_value(value, type_tag)
    }

    fn content_type(&self) -> &'static str {
        self.as_ref().content_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_codec_roundtrip() {
        let codec = JsonCodec;
        let tag = TypeTag::from("type.test/User");

        let original = serde_json::json!({"name": "Alice", "age": 30});
        let bytes = codec.encode_value(&original, &tag).unwrap();
        let decoded = codec.decode_value(&bytes, &tag).unwrap();

        assert_eq!(original, decoded);
    }

    #[test]
    fn empty_payload_is_empty_object() {
        let decoded = JsonCodec
            .decode_value(&Bytes::new(), &TypeTag::EMPTY)
            .unwrap();
        assert_eq!(decoded, serde_json::json!({}));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let tag = TypeTag::from("type.test/User");
        let result = JsonCodec.decode_value(&Bytes::from_static(b"{not json"), &tag);

        match result {
            Err(CodecError::Decode { type_tag, .. }) => assert_eq!(type_tag, tag),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn boxed_codec_delegates() {
        let codec: Box<dyn Codec> = Box::new(JsonCodec);
        assert_eq!(codec.content_type(), "application/json");
    }
}
