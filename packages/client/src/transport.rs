//! Proxy transport abstraction.
//!
//! [`ProxyTransport`] is the seam between the typed client and the bytes on
//! the wire. [`HttpTransport`] talks to a real proxy; tests swap in the
//! `MockTransport` from the `test-utils` feature.

use async_trait::async_trait;
use reqwest::{Client, Response};
use sidecar_envelope::{Codec, Envelope, JsonCodec};
use tracing::debug;
use url::Url;

use crate::types::{ErrorBody, InvocationRequest, PublishRequest};
use crate::{ClientConfig, ClientError};

/// Carries outbound requests to the proxy.
#[async_trait]
pub trait ProxyTransport: Send + Sync {
    /// Send an invocation and wait for the callee's answer.
    async fn invoke_service(&self, request: &InvocationRequest) -> Result<Envelope, ClientError>;

    /// Hand an event to the proxy for delivery.
    async fn publish_event(&self, request: &PublishRequest) -> Result<(), ClientError>;

    /// Check that the proxy is reachable.
    async fn health(&self) -> Result<(), ClientError>;
}

/// Transport over the proxy's HTTP API.
///
/// - invoke: `POST {base}/v1.0/invoke/{target}/method/{method}`
/// - publish: `POST {base}/v1.0/publish[/{pubsub}]/{topic}`
/// - health: `GET {base}/v1.0/healthz`
///
/// Request and response bodies are envelopes in their JSON wire form. The
/// underlying connection pool lives as long as the transport.
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl {
                message: format!("{} cannot be a base URL", self.config.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn invoke_url(&self, target: &str, method: &str) -> Result<Url, ClientError> {
        self.endpoint(&["v1.0", "invoke", target, "method", method])
    }

    fn publish_url(&self, topic: &str) -> Result<Url, ClientError> {
        match &self.config.pubsub_name {
            Some(pubsub) => self.endpoint(&["v1.0", "publish", pubsub, topic]),
            None => self.endpoint(&["v1.0", "publish", topic]),
        }
    }

    fn send_error(&self, error: reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::Timeout(self.config.timeout)
        } else {
            ClientError::transport(error.to_string())
        }
    }

    async fn post_envelope(&self, url: Url, payload: &Envelope) -> Result<Response, ClientError> {
        let body = payload.to_json()?;

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, JsonCodec.content_type())
            .body(body)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(self.remote_error(response).await)
        }
    }

    /// Build a `Remote` error from a non-2xx response.
    ///
    /// Bodies that are not an [`ErrorBody`] are kept verbatim as the message.
    /// A body that cannot be read at all is a transport failure.
    async fn remote_error(&self, response: Response) -> ClientError {
        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return self.send_error(e),
        };

        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => ClientError::Remote {
                status: status.as_u16(),
                code: body.error_code,
                message: body.message,
            },
            Err(_) => ClientError::Remote {
                status: status.as_u16(),
                code: status.canonical_reason().unwrap_or("Unknown").to_string(),
                message: text,
            },
        }
    }
}

#[async_trait]
impl ProxyTransport for HttpTransport {
    async fn invoke_service(&self, request: &InvocationRequest) -> Result<Envelope, ClientError> {
        let url = self.invoke_url(&request.target_service_id, &request.method)?;
        debug!(
            target_service = %request.target_service_id,
            method = %request.method,
            type_tag = %request.payload.type_tag,
            "invoking service"
        );

        let response = self.post_envelope(url, &request.payload).await?;
        let bytes = response.bytes().await.map_err(|e| self.send_error(e))?;

        Ok(Envelope::from_json(&bytes)?)
    }

    async fn publish_event(&self, request: &PublishRequest) -> Result<(), ClientError> {
        let url = self.publish_url(&request.topic)?;
        debug!(topic = %request.topic, type_tag = %request.payload.type_tag, "publishing event");

        self.post_envelope(url, &request.payload).await?;
        Ok(())
    }

    async fn health(&self) -> Result<(), ClientError> {
        let url = self.endpoint(&["v1.0", "healthz"])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.remote_error(response).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(config: ClientConfig) -> HttpTransport {
        HttpTransport::new(config).unwrap()
    }

    #[test]
    fn invoke_url_layout() {
        let t = transport(ClientConfig::from_host_port("localhost", 3500).unwrap());
        let url = t.invoke_url("OrderService", "createOrder").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3500/v1.0/invoke/OrderService/method/createOrder"
        );
    }

    #[test]
    fn segments_are_escaped() {
        let t = transport(ClientConfig::from_host_port("localhost", 3500).unwrap());
        let url = t.invoke_url("svc", "a/b").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3500/v1.0/invoke/svc/method/a%2Fb");
    }

    #[test]
    fn publish_url_with_and_without_pubsub() {
        let config = ClientConfig::from_host_port("localhost", 3500).unwrap();

        let t = transport(config.clone());
        assert_eq!(
            t.publish_url("Storage.Reduce").unwrap().as_str(),
            "http://localhost:3500/v1.0/publish/Storage.Reduce"
        );

        let t = transport(config.with_pubsub("pubsub"));
        assert_eq!(
            t.publish_url("Storage.Reduce").unwrap().as_str(),
            "http://localhost:3500/v1.0/publish/pubsub/Storage.Reduce"
        );
    }

    #[test]
    fn base_path_is_preserved() {
        let t = transport(ClientConfig::new("http://proxy/sidecar/").unwrap());
        assert_eq!(
            t.endpoint(&["v1.0", "healthz"]).unwrap().as_str(),
            "http://proxy/sidecar/v1.0/healthz"
        );
    }
}
