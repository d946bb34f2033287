//! Typed outbound client.

use std::sync::Arc;

use sidecar_envelope::{Envelope, Message};
use tracing::debug;

use crate::transport::{HttpTransport, ProxyTransport};
use crate::types::{InvocationRequest, PublishRequest};
use crate::{ClientConfig, ClientError};

/// Invokes other services and publishes events through the proxy.
///
/// Cloning is cheap and clones share the transport (and with it the
/// connection pool).
///
/// Every call is a future. Dropping it, for instance because the inbound
/// request that triggered it went away or an enclosing
/// `tokio::time::timeout` fired, abandons the wait and drops the in-flight
/// request along with its connection.
///
/// # Example
///
/// ```rust,ignore
/// let client = SidecarClient::connect(ClientConfig::from_host_port("localhost", 3500)?)?;
///
/// let response: CreateOrderResponse = client
///     .invoke("OrderService", "createOrder", &CreateOrderRequest { .. })
///     .await?;
///
/// client.publish("Storage.Reduce", &StorageReduceData { .. }).await?;
/// ```
#[derive(Clone)]
pub struct SidecarClient {
    transport: Arc<dyn ProxyTransport>,
}

impl SidecarClient {
    pub fn new(transport: impl ProxyTransport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Client over HTTP to the proxy described by `config`.
    pub fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::new(HttpTransport::new(config)?))
    }

    /// Call `method` on `target_service_id` and decode the answer as `Resp`.
    pub async fn invoke<Req, Resp>(
        &self,
        target_service_id: &str,
        method: &str,
        request: &Req,
    ) -> Result<Resp, ClientError>
    where
        Req: Message + Sync,
        Resp: Message,
    {
        let payload = sidecar_envelope::encode(request)?;
        let response = self.invoke_raw(target_service_id, method, payload).await?;
        Ok(sidecar_envelope::decode(&response)?)
    }

    /// Untyped form of [`invoke`](Self::invoke).
    pub async fn invoke_raw(
        &self,
        target_service_id: &str,
        method: &str,
        payload: Envelope,
    ) -> Result<Envelope, ClientError> {
        let request = InvocationRequest::new(target_service_id, method, payload);
        let response = self.transport.invoke_service(&request).await?;
        debug!(
            target_service = target_service_id,
            method,
            type_tag = %response.type_tag,
            "invocation answered"
        );
        Ok(response)
    }

    /// Publish `payload` to `topic`.
    ///
    /// Success means the proxy accepted the event, not that any subscriber
    /// has processed it.
    pub async fn publish<T>(&self, topic: &str, payload: &T) -> Result<(), ClientError>
    where
        T: Message + Sync,
    {
        let payload = sidecar_envelope::encode(payload)?;
        self.publish_raw(topic, payload).await
    }

    /// Untyped form of [`publish`](Self::publish).
    pub async fn publish_raw(&self, topic: &str, payload: Envelope) -> Result<(), ClientError> {
        self.transport
            .publish_event(&PublishRequest::new(topic, payload))
            .await
    }

    /// Check that the proxy is reachable.
    pub async fn health(&self) -> Result<(), ClientError> {
        self.transport.health().await
    }
}

impl std::fmt::Debug for SidecarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SidecarClient").finish_non_exhaustive()
    }
}
