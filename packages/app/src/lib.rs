//! # sidecar-app
//!
//! Inbound half of the sidecar protocol. The proxy calls into an [`App`] to
//! invoke methods, learn which topics and bindings the application wants, and
//! deliver events to them.
//!
//! ```ignore
//! use sidecar_app::{App, server};
//!
//! let mut builder = App::builder(MyState::default());
//! builder
//!     .method("AddProduct", add_product)?
//!     .method("GetShoppingCart", get_cart)?;
//! builder.subscribe("TopicA").bind("storage");
//!
//! let app = Arc::new(builder.build());
//! server::serve(listener, app, shutdown_signal()).await?;
//! ```
//!
//! Methods are registered with their request and response [`Message`] types.
//! [`App::dispatch`] decodes the incoming [`Envelope`] against the declared
//! request type before the handler runs and encodes whatever it returns, so
//! handlers only ever deal in typed values.
//!
//! [`Message`]: sidecar_envelope::Message
//! [`Envelope`]: sidecar_envelope::Envelope

mod app;
mod context;
pub mod error;
pub mod events;
mod lifecycle;
pub mod registry;
pub mod server;
mod subscriptions;

pub use app::{App, AppBuilder};
pub use context::{BoxFuture, Context};
pub use error::{DispatchError, HandlerError, RegistryError};
pub use events::{BindingEvent, TopicEvent};
pub use lifecycle::Lifecycle;
pub use registry::{MethodDescriptor, Registry, RegistryBuilder};
pub use subscriptions::Subscriptions;
