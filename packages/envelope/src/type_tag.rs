//! Type identifiers carried by envelopes.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Names the schema needed to decode an envelope's payload.
///
/// Tags use a `type.<package>/<Message>` convention, but any string that
/// uniquely identifies a message type works. Two message types must never
/// share a tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(pub Cow<'static, str>);

impl TypeTag {
    /// Tag of the built-in [`Empty`](crate::Empty) message.
    pub const EMPTY: TypeTag = TypeTag(Cow::Borrowed("type.sidecar/Empty"));

    /// Tag used in errors about the envelope container itself.
    pub const ENVELOPE: TypeTag = TypeTag(Cow::Borrowed("type.sidecar/Envelope"));

    /// Create a tag from a static string.
    pub const fn from_static(s: &'static str) -> Self {
        TypeTag(Cow::Borrowed(s))
    }

    /// Create a tag from an owned string.
    pub fn new(s: impl Into<String>) -> Self {
        TypeTag(Cow::Owned(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&'static str> for TypeTag {
    fn from(s: &'static str) -> Self {
        TypeTag(Cow::Borrowed(s))
    }
}

impl From<String> for TypeTag {
    fn from(s: String) -> Self {
        TypeTag(Cow::Owned(s))
    }
}

impl AsRef<str> for TypeTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
