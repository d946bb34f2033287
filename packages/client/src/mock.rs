//! Simulated proxy for tests.
//!
//! Enabled with the `test-utils` feature.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sidecar_envelope::{Envelope, Message};

use crate::transport::ProxyTransport;
use crate::types::{InvocationRequest, PublishRequest};
use crate::ClientError;

#[derive(Clone)]
enum Canned {
    Reply(Envelope),
    Remote {
        status: u16,
        code: String,
        message: String,
    },
}

/// A transport that answers from canned responses and records every call.
///
/// Clones share state, so a test can keep one clone for assertions and hand
/// another to [`SidecarClient::new`](crate::SidecarClient::new).
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Answers keyed by (target service, method).
    responses: Arc<Mutex<HashMap<(String, String), Canned>>>,
    invocations: Arc<Mutex<Vec<InvocationRequest>>>,
    publishes: Arc<Mutex<Vec<PublishRequest>>>,
    /// Fail every call with a transport error carrying this message.
    transport_failure: Arc<Mutex<Option<String>>>,
    /// Delay before answering, to exercise cancellation and timeouts.
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer calls to `target.method` with `response`.
    pub fn with_response<T: Message>(self, target: &str, method: &str, response: &T) -> Self {
        let envelope = sidecar_envelope::encode(response).expect("mock response must encode");
        self.with_raw_response(target, method, envelope)
    }

    pub fn with_raw_response(self, target: &str, method: &str, envelope: Envelope) -> Self {
        self.responses.lock().unwrap().insert(
            (target.to_string(), method.to_string()),
            Canned::Reply(envelope),
        );
        self
    }

    /// Answer calls to `target.method` with a remote failure.
    pub fn with_remote_error(
        self,
        target: &str,
        method: &str,
        status: u16,
        code: &str,
        message: &str,
    ) -> Self {
        self.responses.lock().unwrap().insert(
            (target.to_string(), method.to_string()),
            Canned::Remote {
                status,
                code: code.to_string(),
                message: message.to_string(),
            },
        );
        self
    }

    /// Fail every call as if the proxy were unreachable.
    pub fn failing_with(self, message: impl Into<String>) -> Self {
        *self.transport_failure.lock().unwrap() = Some(message.into());
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    /// Every invocation seen so far, in order.
    pub fn invocations(&self) -> Vec<InvocationRequest> {
        self.invocations.lock().unwrap().clone()
    }

    /// Every publish seen so far, in order.
    pub fn publishes(&self) -> Vec<PublishRequest> {
        self.publishes.lock().unwrap().clone()
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check_transport(&self) -> Result<(), ClientError> {
        match self.transport_failure.lock().unwrap().clone() {
            Some(message) => Err(ClientError::transport(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProxyTransport for MockTransport {
    async fn invoke_service(&self, request: &InvocationRequest) -> Result<Envelope, ClientError> {
        self.invocations.lock().unwrap().push(request.clone());
        self.pause().await;
        self.check_transport()?;

        let key = (request.target_service_id.clone(), request.method.clone());
        let canned = self.responses.lock().unwrap().get(&key).cloned();

        match canned {
            Some(Canned::Reply(envelope)) => Ok(envelope),
            Some(Canned::Remote {
                status,
                code,
                message,
            }) => Err(ClientError::Remote {
                status,
                code,
                message,
            }),
            None => Err(ClientError::Remote {
                status: 404,
                code: "ERR_DIRECT_INVOKE".to_string(),
                message: format!(
                    "no response configured for {}.{}",
                    request.target_service_id, request.method
                ),
            }),
        }
    }

    async fn publish_event(&self, request: &PublishRequest) -> Result<(), ClientError> {
        self.pause().await;
        self.check_transport()?;
        self.publishes.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn health(&self) -> Result<(), ClientError> {
        self.check_transport()
    }
}
