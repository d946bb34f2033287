//! Codec errors.

use thiserror::Error;

use crate::TypeTag;

/// Errors raised while packing or unpacking envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The envelope carries a different type than the one requested.
    #[error("schema mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: TypeTag, found: TypeTag },

    /// The payload bytes are not a valid instance of the type.
    #[error("decode error ({type_tag}): {message}")]
    Decode { type_tag: TypeTag, message: String },

    /// The message holds values outside its schema or failed to serialize.
    #[error("encode error ({type_tag}): {message}")]
    Encode { type_tag: TypeTag, message: String },
}

impl CodecError {
    pub fn decode(type_tag: TypeTag, message: impl Into<String>) -> Self {
        CodecError::Decode {
            type_tag,
            message: message.into(),
        }
    }

    pub fn encode(type_tag: TypeTag, message: impl Into<String>) -> Self {
        CodecError::Encode {
            type_tag,
            message: message.into(),
        }
    }

    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, CodecError::SchemaMismatch { .. })
    }
}
