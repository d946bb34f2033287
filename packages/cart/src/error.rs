use sidecar_app::RegistryError;
use sidecar_client::ClientError;
use thiserror::Error;

/// Fatal errors from the `cart` binary.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("proxy unavailable: {0}")]
    ProxyUnavailable(#[source] ClientError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}
