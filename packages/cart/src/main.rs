use std::net::SocketAddr;

use clap::Parser;
use sidecar_cart::cli::{Cli, Command, ProxyArgs};
use sidecar_cart::messages::CreateOrderRequest;
use sidecar_cart::{place_order, CartError, OrderOutcome};
use sidecar_client::SidecarClient;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve {
            listen,
            skip_proxy_check,
        } => serve(&cli.proxy, listen, skip_proxy_check).await,
        Command::Order {
            product_id,
            amount,
            customer_id,
        } => {
            let request = CreateOrderRequest {
                product_id,
                amount,
                customer_id,
            };
            order(&cli.proxy, request).await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "cart failed");
        std::process::exit(1);
    }
}

async fn serve(
    proxy: &ProxyArgs,
    listen: SocketAddr,
    skip_proxy_check: bool,
) -> Result<(), CartError> {
    info!(host = %proxy.proxy_host, port = proxy.proxy_port, "using proxy");
    let client = SidecarClient::connect(proxy.client_config()?)?;
    sidecar_cart::serve(listen, client, skip_proxy_check, shutdown_signal()).await
}

async fn order(proxy: &ProxyArgs, request: CreateOrderRequest) -> Result<(), CartError> {
    let client = SidecarClient::connect(proxy.client_config()?)?;

    match place_order(&client, &request).await? {
        OrderOutcome::Placed(reduce) => {
            println!(
                "order placed: {} x{} for {}",
                reduce.product_id, reduce.amount, request.customer_id
            );
        }
        OrderOutcome::Rejected => println!("order rejected"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
        // Without a signal handler there is nothing to wait on; keep serving.
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
