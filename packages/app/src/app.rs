//! The application object the proxy calls into.
//!
//! An [`App`] owns the frozen method registry, the subscription set, the
//! event handlers and the injected state. All entry points take `&self` and
//! may run concurrently.
//!
//! Handlers are free to make outbound calls through the proxy before they
//! return. Nothing here is transactional: if a handler publishes an event and
//! then fails, the event stays published and the caller still sees the
//! failure.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use sidecar_envelope::{Envelope, Message};
use tracing::{debug, info, warn};

use crate::context::Context;
use crate::error::{DispatchError, HandlerError, RegistryError};
use crate::events::{self, BindingEvent, EventHandler, TopicEvent};
use crate::lifecycle::{Lifecycle, LifecycleCell};
use crate::registry::{Registry, RegistryBuilder};
use crate::subscriptions::Subscriptions;

/// Assembles an [`App`] during startup.
pub struct AppBuilder<S> {
    state: Arc<S>,
    registry: RegistryBuilder<S>,
    subscriptions: Subscriptions,
    topic_handlers: HashMap<String, EventHandler<S, TopicEvent>>,
    binding_handlers: HashMap<String, EventHandler<S, BindingEvent>>,
}

impl<S: Send + Sync + 'static> AppBuilder<S> {
    pub fn new(state: S) -> Self {
        Self::with_shared_state(Arc::new(state))
    }

    pub fn with_shared_state(state: Arc<S>) -> Self {
        Self {
            state,
            registry: RegistryBuilder::new(),
            subscriptions: Subscriptions::new(),
            topic_handlers: HashMap::new(),
            binding_handlers: HashMap::new(),
        }
    }

    /// Register a method handler. See [`RegistryBuilder::register`].
    pub fn method<Req, Resp, F, Fut>(
        &mut self,
        name: impl Into<String>,
        handler: F,
    ) -> Result<&mut Self, RegistryError>
    where
        Req: Message,
        Resp: Message,
        F: Fn(Context<S>, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp, HandlerError>> + Send + 'static,
    {
        self.registry.register(name, handler)?;
        Ok(self)
    }

    /// Declare a topic without a handler. Deliveries are logged and acked.
    pub fn subscribe(&mut self, topic: impl Into<String>) -> &mut Self {
        self.subscriptions.add_topic(topic.into());
        self
    }

    /// Declare a topic and handle its events.
    ///
    /// A topic has at most one handler; later handlers for the same topic are
    /// ignored.
    pub fn on_topic<F, Fut>(&mut self, topic: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(Context<S>, TopicEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let topic = topic.into();
        self.subscriptions.add_topic(topic.clone());
        if self.topic_handlers.contains_key(&topic) {
            warn!(topic = %topic, "topic already has a handler, ignoring");
        } else {
            self.topic_handlers.insert(topic, events::erase(handler));
        }
        self
    }

    /// Declare a binding without a handler.
    pub fn bind(&mut self, binding: impl Into<String>) -> &mut Self {
        self.subscriptions.add_binding(binding.into());
        self
    }

    /// Declare a binding and handle its events.
    pub fn on_binding<F, Fut>(&mut self, binding: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(Context<S>, BindingEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let binding = binding.into();
        self.subscriptions.add_binding(binding.clone());
        if self.binding_handlers.contains_key(&binding) {
            warn!(binding = %binding, "binding already has a handler, ignoring");
        } else {
            self.binding_handlers.insert(binding, events::erase(handler));
        }
        self
    }

    /// Freeze registrations. The app starts out [`Lifecycle::Ready`].
    pub fn build(self) -> App<S> {
        let registry = self.registry.build();
        let lifecycle = LifecycleCell::new(Lifecycle::Starting);
        info!(
            methods = registry.len(),
            topics = self.subscriptions.topics().len(),
            bindings = self.subscriptions.bindings().len(),
            "application ready"
        );
        lifecycle.set(Lifecycle::Ready);

        App {
            state: self.state,
            registry,
            subscriptions: self.subscriptions,
            topic_handlers: self.topic_handlers,
            binding_handlers: self.binding_handlers,
            lifecycle,
        }
    }
}

/// A built application, ready to serve the proxy.
pub struct App<S> {
    state: Arc<S>,
    registry: Registry<S>,
    subscriptions: Subscriptions,
    topic_handlers: HashMap<String, EventHandler<S, TopicEvent>>,
    binding_handlers: HashMap<String, EventHandler<S, BindingEvent>>,
    lifecycle: LifecycleCell,
}

impl<S: Send + Sync + 'static> App<S> {
    pub fn builder(state: S) -> AppBuilder<S> {
        AppBuilder::new(state)
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn registry(&self) -> &Registry<S> {
        &self.registry
    }

    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.get()
    }

    /// Route `payload` to the handler registered under `method`.
    ///
    /// The payload is decoded with the method's request type before the
    /// handler runs, so a handler never sees a payload of the wrong shape.
    pub async fn dispatch(
        &self,
        method: &str,
        payload: Envelope,
    ) -> Result<Envelope, DispatchError> {
        let Some(descriptor) = self.registry.descriptor(method) else {
            warn!(method, "dispatch to unknown method");
            return Err(DispatchError::UnknownMethod(method.to_string()));
        };

        debug!(method, type_tag = %payload.type_tag, "dispatching");
        let ctx = Context::new(Arc::clone(&self.state), method);
        match descriptor.call(ctx, payload).await {
            Ok(reply) => {
                debug!(method, type_tag = %reply.type_tag, "dispatch complete");
                Ok(reply)
            }
            Err(error) => {
                warn!(method, code = error.error_code(), error = %error, "dispatch failed");
                Err(error)
            }
        }
    }

    /// Declared topics. The proxy asks for these during its handshake.
    pub fn topics(&self) -> Vec<String> {
        self.mark_subscribed();
        self.subscriptions.topics().iter().cloned().collect()
    }

    /// Declared input bindings.
    pub fn bindings(&self) -> Vec<String> {
        self.mark_subscribed();
        self.subscriptions.bindings().iter().cloned().collect()
    }

    pub async fn on_topic_event(
        &self,
        topic: &str,
        event: TopicEvent,
    ) -> Result<(), DispatchError> {
        if !self.subscriptions.has_topic(topic) {
            warn!(topic, "event for undeclared topic");
            return Err(DispatchError::UnknownTopic(topic.to_string()));
        }
        self.warn_if_early("topic", topic);

        info!(topic, id = %event.id, type_tag = %event.data.type_tag, "topic event received");
        let Some(handler) = self.topic_handlers.get(topic) else {
            return Ok(());
        };
        handler(Context::new(Arc::clone(&self.state), topic), event)
            .await
            .map_err(|source| {
                warn!(topic, error = %source, "topic handler failed");
                DispatchError::Handler {
                    operation: topic.to_string(),
                    source,
                }
            })
    }

    pub async fn on_binding_event(
        &self,
        binding: &str,
        event: BindingEvent,
    ) -> Result<(), DispatchError> {
        if !self.subscriptions.has_binding(binding) {
            warn!(binding, "event for undeclared binding");
            return Err(DispatchError::UnknownBinding(binding.to_string()));
        }
        self.warn_if_early("binding", binding);

        info!(binding, type_tag = %event.data.type_tag, "binding event received");
        let Some(handler) = self.binding_handlers.get(binding) else {
            return Ok(());
        };
        handler(Context::new(Arc::clone(&self.state), binding), event)
            .await
            .map_err(|source| {
                warn!(binding, error = %source, "binding handler failed");
                DispatchError::Handler {
                    operation: binding.to_string(),
                    source,
                }
            })
    }

    /// Mark the app as shutting down. In-flight dispatches still complete.
    pub fn begin_shutdown(&self) {
        self.lifecycle.set(Lifecycle::ShuttingDown);
        info!("application shutting down");
    }

    fn mark_subscribed(&self) {
        if self.lifecycle.advance(Lifecycle::Ready, Lifecycle::Subscribed) {
            info!("subscription handshake complete");
        }
    }

    fn warn_if_early(&self, kind: &str, name: &str) {
        if self.lifecycle.get() < Lifecycle::Subscribed {
            warn!(kind, name, "event delivered before subscription handshake");
        }
    }
}

impl<S> std::fmt::Debug for App<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("methods", &self.registry.len())
            .field("subscriptions", &self.subscriptions)
            .field("lifecycle", &self.lifecycle.get())
            .finish_non_exhaustive()
    }
}
