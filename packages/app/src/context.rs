use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler receives besides its request.
///
/// Carries the application state the app was built with. State is injected
/// here instead of living in globals; anything a handler mutates concurrently
/// must guard itself.
pub struct Context<S> {
    state: Arc<S>,
    operation: Arc<str>,
}

impl<S> Context<S> {
    pub(crate) fn new(state: Arc<S>, operation: &str) -> Self {
        Self {
            state,
            operation: Arc::from(operation),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// The method, topic or binding being handled.
    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl<S> Clone for Context<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            operation: Arc::clone(&self.operation),
        }
    }
}
