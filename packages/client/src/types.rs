use serde::{Deserialize, Serialize};
use sidecar_envelope::Envelope;

/// A request to call `method` on another service through the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    /// Application id of the callee, as known to the proxy.
    pub target_service_id: String,

    pub method: String,

    pub payload: Envelope,
}

impl InvocationRequest {
    pub fn new(
        target_service_id: impl Into<String>,
        method: impl Into<String>,
        payload: Envelope,
    ) -> Self {
        Self {
            target_service_id: target_service_id.into(),
            method: method.into(),
            payload,
        }
    }
}

/// A one-way event for the proxy to deliver to a topic's subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub topic: String,
    pub payload: Envelope,
}

impl PublishRequest {
    pub fn new(topic: impl Into<String>, payload: Envelope) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }
}

/// JSON body of a failed call, in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_code: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_wire_names() {
        let body = ErrorBody::new("ERR_UNKNOWN_METHOD", "no method Foo");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["errorCode"], "ERR_UNKNOWN_METHOD");
        assert_eq!(json["message"], "no method Foo");
    }
}
