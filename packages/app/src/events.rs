//! Events the proxy pushes to the application.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sidecar_envelope::{Codec, CodecError, Envelope, JsonCodec, Message};

use crate::context::{BoxFuture, Context};
use crate::error::HandlerError;

/// A message published to a topic, wrapped CloudEvents-style by the proxy.
///
/// Only `data` is required on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub source: String,
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub specversion: String,
    #[serde(default)]
    pub datacontenttype: String,
    #[serde(default)]
    pub topic: String,
    pub data: Envelope,
}

impl TopicEvent {
    pub fn new(topic: impl Into<String>, data: Envelope) -> Self {
        Self {
            id: String::new(),
            source: String::new(),
            event_type: "com.dapr.event.sent".to_string(),
            specversion: "1.0".to_string(),
            datacontenttype: JsonCodec.content_type().to_string(),
            topic: topic.into(),
            data,
        }
    }

    /// Decode the event payload.
    pub fn decode<T: Message>(&self) -> Result<T, CodecError> {
        self.data.unpack()
    }
}

/// A trigger from an external binding (a storage event, a queue message).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingEvent {
    #[serde(default)]
    pub name: String,
    pub data: Envelope,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl BindingEvent {
    pub fn new(name: impl Into<String>, data: Envelope) -> Self {
        Self {
            name: name.into(),
            data,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Decode the event payload.
    pub fn decode<T: Message>(&self) -> Result<T, CodecError> {
        self.data.unpack()
    }
}

pub(crate) type EventHandler<S, E> =
    Arc<dyn Fn(Context<S>, E) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;

pub(crate) fn erase<S, E, F, Fut>(handler: F) -> EventHandler<S, E>
where
    S: 'static,
    E: 'static,
    F: Fn(Context<S>, E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    Arc::new(
        move |ctx: Context<S>, event: E| -> BoxFuture<'static, Result<(), HandlerError>> {
            Box::pin(handler(ctx, event))
        },
    )
}
