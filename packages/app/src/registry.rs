//! Method registry.
//!
//! Maps method names to typed handlers. The registry is assembled with a
//! [`RegistryBuilder`] during startup and frozen by [`RegistryBuilder::build`];
//! a built [`Registry`] has no way to add or replace methods.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use sidecar_envelope::{Envelope, Message, TypeTag};

use crate::context::{BoxFuture, Context};
use crate::error::{DispatchError, HandlerError, RegistryError};

type ErasedHandler<S> = Arc<
    dyn Fn(Context<S>, Envelope) -> BoxFuture<'static, Result<Envelope, DispatchError>>
        + Send
        + Sync,
>;

/// A registered method: its name, its declared types and its handler.
pub struct MethodDescriptor<S> {
    name: String,
    request_type: TypeTag,
    response_type: TypeTag,
    handler: ErasedHandler<S>,
}

impl<S> MethodDescriptor<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn request_type(&self) -> &TypeTag {
        &self.request_type
    }

    pub fn response_type(&self) -> &TypeTag {
        &self.response_type
    }

    /// Decode `payload`, run the handler, encode its reply.
    pub(crate) fn call(
        &self,
        ctx: Context<S>,
        payload: Envelope,
    ) -> BoxFuture<'static, Result<Envelope, DispatchError>> {
        (self.handler)(ctx, payload)
    }
}

impl<S> std::fmt::Debug for MethodDescriptor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("request_type", &self.request_type)
            .field("response_type", &self.response_type)
            .finish_non_exhaustive()
    }
}

/// Collects methods during startup.
pub struct RegistryBuilder<S> {
    methods: HashMap<String, MethodDescriptor<S>>,
}

impl<S: Send + Sync + 'static> RegistryBuilder<S> {
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// Register `handler` under `name`.
    ///
    /// The request type `Req` decides how incoming payloads are decoded and
    /// `Resp` how replies are encoded. Fails with
    /// [`RegistryError::DuplicateMethod`] if `name` is taken, leaving the
    /// existing registration in place.
    pub fn register<Req, Resp, F, Fut>(
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
        let name = name.into();
        if self.methods.contains_key(&name) {
            return Err(RegistryError::DuplicateMethod(name));
        }

        let handler = Arc::new(handler);
        let operation = name.clone();
        let erased: ErasedHandler<S> = Arc::new(
            move |ctx: Context<S>,
                  payload: Envelope|
                  -> BoxFuture<'static, Result<Envelope, DispatchError>> {
                let handler = Arc::clone(&handler);
                let operation = operation.clone();
                Box::pin(async move {
                    let request: Req = sidecar_envelope::decode(&payload)?;
                    let response = handler(ctx, request)
                        .await
                        .map_err(|source| DispatchError::Handler { operation, source })?;
                    Ok::<_, DispatchError>(sidecar_envelope::encode(&response)?)
                })
            },
        );

        self.methods.insert(
            name.clone(),
            MethodDescriptor {
                name,
                request_type: Req::TYPE_TAG,
                response_type: Resp::TYPE_TAG,
                handler: erased,
            },
        );
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> Registry<S> {
        Registry {
            methods: self.methods,
        }
    }
}

impl<S: Send + Sync + 'static> Default for RegistryBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable name -> handler map.
pub struct Registry<S> {
    methods: HashMap<String, MethodDescriptor<S>>,
}

impl<S> Registry<S> {
    pub fn descriptor(&self, name: &str) -> Option<&MethodDescriptor<S>> {
        self.methods.get(name)
    }

    /// All descriptors, sorted by name.
    pub fn methods(&self) -> Vec<&MethodDescriptor<S>> {
        let mut methods: Vec<_> = self.methods.values().collect();
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        methods
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
