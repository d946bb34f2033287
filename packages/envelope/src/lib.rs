//! Typed envelopes for sidecar invocation payloads.
//!
//! Everything that crosses the boundary between the application and its
//! sidecar proxy travels as an [`Envelope`]: opaque bytes plus a [`TypeTag`]
//! naming the schema. This crate converts between envelopes and typed
//! [`Message`]s:
//!
//! - `encode`: validate and serialize a message into an envelope
//! - `decode`: check the tag, then deserialize the payload
//! - [`JsonCodec`]: the default payload codec
//!
//! Decoding with the wrong tag is a checked [`CodecError::SchemaMismatch`],
//! never a silent misdecode.

pub use bytes::Bytes;

mod codec;
mod envelope;
mod error;
mod message;
mod type_tag;

pub use codec::{Codec, JsonCodec};
pub use envelope::Envelope;
pub use error::CodecError;
pub use message::{decode, decode_with, encode, encode_with, Empty, Message};
pub use type_tag::TypeTag;
