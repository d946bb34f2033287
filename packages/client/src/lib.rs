//! # sidecar-client
//!
//! Outbound half of the sidecar protocol: invoking methods on other services
//! and publishing events, both through the co-located proxy.
//!
//! ```ignore
//! use sidecar_client::{ClientConfig, SidecarClient};
//!
//! let client = SidecarClient::connect(ClientConfig::from_host_port("localhost", 3500)?)?;
//!
//! // Request/response through the proxy
//! let reply: CreateOrderResponse = client.invoke("OrderService", "createOrder", &request).await?;
//!
//! // One-way publish
//! client.publish("Storage.Reduce", &event).await?;
//! ```
//!
//! Errors keep transport failures ([`ClientError::Transport`],
//! [`ClientError::Timeout`]) apart from failures the callee reported
//! ([`ClientError::Remote`]) and payloads that did not decode
//! ([`ClientError::Codec`]), so callers can pick their own retry policy.

pub mod config;
pub mod error;
pub mod transport;
pub mod types;

mod client;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use client::SidecarClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use transport::{HttpTransport, ProxyTransport};
pub use types::{ErrorBody, InvocationRequest, PublishRequest};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockTransport;
