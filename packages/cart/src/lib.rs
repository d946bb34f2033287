//! # sidecar-cart
//!
//! A shopping cart served to a sidecar proxy.
//!
//! The proxy calls `AddProduct` and `GetShoppingCart` on this service; both
//! are plain handlers registered on a [`sidecar_app::App`] over a shared
//! [`CartState`]. `AddProduct` itself calls out to the product service
//! through the proxy before it answers.
//!
//! [`place_order`] runs the order workflow from the client side: create the
//! order on the order service and, if it was accepted, publish a stock
//! reduction for the storage service.

pub mod cli;
pub mod error;
pub mod messages;
pub mod order;
pub mod service;
pub mod state;

pub use error::CartError;
pub use order::{place_order, OrderOutcome};
pub use service::{build_app, serve};
pub use state::CartState;
