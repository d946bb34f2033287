//! Method handlers and the assembled cart application.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use sidecar_app::{server, App, BindingEvent, Context, HandlerError, RegistryError, TopicEvent};
use sidecar_client::SidecarClient;
use sidecar_envelope::Empty;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::error::CartError;
use crate::messages::{
    AddProductRequest, AddProductResponse, GetShoppingCartResponse, ProductList,
    ProductListRequest,
};
use crate::state::CartState;

pub const ADD_PRODUCT: &str = "AddProduct";
pub const GET_SHOPPING_CART: &str = "GetShoppingCart";

pub const PRODUCT_SERVICE: &str = "productService";
pub const GET_ALL_PRODUCTS: &str = "GetAllProducts";

pub const TOPIC: &str = "TopicA";
pub const BINDING: &str = "storage";

/// Build the cart application around `state`.
pub fn build_app(state: CartState) -> Result<App<CartState>, RegistryError> {
    let mut builder = App::builder(state);
    builder
        .method(ADD_PRODUCT, add_product)?
        .method(GET_SHOPPING_CART, get_shopping_cart)?;
    builder
        .on_topic(TOPIC, on_topic_a)
        .on_binding(BINDING, on_storage);
    Ok(builder.build())
}

/// Listen on `listen`, check the proxy, then serve until `shutdown` resolves.
///
/// The port is bound before the proxy is contacted: the proxy may call back
/// as soon as it sees the app. A failed health check is fatal unless
/// `skip_proxy_check` is set.
pub async fn serve<F>(
    listen: SocketAddr,
    client: SidecarClient,
    skip_proxy_check: bool,
    shutdown: F,
) -> Result<(), CartError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(listen)
        .await
        .map_err(|source| CartError::Bind {
            addr: listen,
            source,
        })?;

    match client.health().await {
        Ok(()) => info!("proxy reachable"),
        Err(e) if skip_proxy_check => warn!(error = %e, "proxy health check failed, continuing"),
        Err(e) => return Err(CartError::ProxyUnavailable(e)),
    }

    let app = Arc::new(build_app(CartState::new(client))?);
    server::serve(listener, app, shutdown).await?;
    info!("cart stopped");
    Ok(())
}

/// Add a product to the cart.
///
/// Looks up the product catalogue first. The listing is only logged; a
/// failed lookup is logged and the product is added anyway.
pub async fn add_product(
    ctx: Context<CartState>,
    request: AddProductRequest,
) -> Result<AddProductResponse, HandlerError> {
    refresh_catalogue(ctx.state()).await;

    let size = ctx.state().add(request.product_id.clone()).await;
    info!(product_id = %request.product_id, cart_size = size, "product added");
    Ok(AddProductResponse { succeed: true })
}

pub async fn get_shopping_cart(
    ctx: Context<CartState>,
    _request: Empty,
) -> Result<GetShoppingCartResponse, HandlerError> {
    Ok(GetShoppingCartResponse {
        product_id: ctx.state().snapshot().await,
    })
}

async fn refresh_catalogue(state: &CartState) {
    let listing = state
        .client()
        .invoke::<_, ProductList>(PRODUCT_SERVICE, GET_ALL_PRODUCTS, &ProductListRequest {})
        .await;

    match listing {
        Ok(list) => {
            for product in &list.results {
                debug!(id = %product.id, name = %product.name, "catalogue entry");
            }
            info!(count = list.results.len(), "product catalogue fetched");
        }
        Err(e) => warn!(error = %e, "product catalogue lookup failed"),
    }
}

async fn on_topic_a(ctx: Context<CartState>, event: TopicEvent) -> Result<(), HandlerError> {
    info!(
        topic = ctx.operation(),
        id = %event.id,
        source = %event.source,
        "topic message arrived"
    );
    Ok(())
}

async fn on_storage(ctx: Context<CartState>, event: BindingEvent) -> Result<(), HandlerError> {
    info!(
        binding = ctx.operation(),
        name = %event.name,
        metadata = ?event.metadata,
        "invoked from binding"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidecar_client::{MockTransport, SidecarClient};

    #[test]
    fn declares_cart_surface() {
        let app = build_app(CartState::new(SidecarClient::new(MockTransport::new()))).unwrap();

        let names: Vec<_> = app.registry().methods().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec![ADD_PRODUCT, GET_SHOPPING_CART]);
        assert_eq!(app.topics(), vec![TOPIC]);
        assert_eq!(app.bindings(), vec![BINDING]);
    }
}
