use std::time::Duration;

use sidecar_envelope::CodecError;

/// Errors from outbound calls through the proxy.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// The proxy could not be reached, or the connection broke mid-call.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// No response arrived within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The callee, or the proxy on its behalf, reported a failure.
    #[error("remote error ({status} {code}): {message}")]
    Remote {
        status: u16,
        code: String,
        message: String,
    },

    /// The response payload could not be decoded as the expected type.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },
}

impl ClientError {
    pub fn transport(message: impl Into<String>) -> Self {
        ClientError::Transport {
            message: message.into(),
        }
    }

    /// Whether the call failed before any answer from the callee arrived.
    ///
    /// Transport failures may be worth retrying; remote and codec failures
    /// will fail the same way again.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. } | ClientError::Timeout(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ClientError::Remote { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidecar_envelope::TypeTag;

    #[test]
    fn classification() {
        assert!(ClientError::transport("connection refused").is_transport());
        assert!(ClientError::Timeout(Duration::from_secs(1)).is_transport());

        let remote = ClientError::Remote {
            status: 500,
            code: "ERR_HANDLER".to_string(),
            message: "boom".to_string(),
        };
        assert!(remote.is_remote());
        assert!(!remote.is_transport());

        let codec: ClientError = CodecError::decode(TypeTag::EMPTY, "bad").into();
        assert!(!codec.is_transport());
        assert!(!codec.is_remote());
    }

    #[test]
    fn remote_display() {
        let e = ClientError::Remote {
            status: 404,
            code: "ERR_UNKNOWN_METHOD".to_string(),
            message: "no such method".to_string(),
        };
        let display = e.to_string();
        assert!(display.contains("404"));
        assert!(display.contains("ERR_UNKNOWN_METHOD"));
        assert!(display.contains("no such method"));
    }
}
