//! Error types for dispatch and registration.

use sidecar_client::ClientError;
use sidecar_envelope::CodecError;
use thiserror::Error;

/// Errors raised while building a method registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A handler is already registered under this name.
    #[error("method already registered: {0}")]
    DuplicateMethod(String),
}

/// A failure inside business logic.
///
/// Handlers return this; the dispatcher wraps it in
/// [`DispatchError::Handler`] so it reaches the proxy as an explicit failure
/// rather than a crash.
#[derive(Debug)]
pub struct HandlerError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The outbound failure behind this error, if there is one.
    pub fn client_error(&self) -> Option<&ClientError> {
        self.source.as_deref()?.downcast_ref::<ClientError>()
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<ClientError> for HandlerError {
    fn from(error: ClientError) -> Self {
        HandlerError::with_source(format!("outbound call failed: {}", error), error)
    }
}

impl From<CodecError> for HandlerError {
    fn from(error: CodecError) -> Self {
        HandlerError::with_source(error.to_string(), error)
    }
}

/// Errors returned to the proxy from the callback entry points.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    #[error("unknown binding: {0}")]
    UnknownBinding(String),

    /// The payload did not match, or the reply could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("{operation} failed: {source}")]
    Handler {
        operation: String,
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    /// Stable code reported to the proxy alongside the message.
    pub fn error_code(&self) -> &'static str {
        match self {
            DispatchError::UnknownMethod(_) => "ERR_UNKNOWN_METHOD",
            DispatchError::UnknownTopic(_) => "ERR_UNKNOWN_TOPIC",
            DispatchError::UnknownBinding(_) => "ERR_UNKNOWN_BINDING",
            DispatchError::Codec(CodecError::SchemaMismatch { .. }) => "ERR_SCHEMA_MISMATCH",
            DispatchError::Codec(CodecError::Decode { .. }) => "ERR_DECODE",
            DispatchError::Codec(CodecError::Encode { .. }) => "ERR_ENCODE",
            DispatchError::Handler { .. } => "ERR_HANDLER",
        }
    }

    pub fn is_unknown_method(&self) -> bool {
        matches!(self, DispatchError::UnknownMethod(_))
    }

    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, DispatchError::Codec(CodecError::SchemaMismatch { .. }))
    }
}
