//! Command line and environment configuration for the `cart` binary.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use sidecar_client::{ClientConfig, ClientError};

/// Shopping cart service behind a sidecar proxy
#[derive(Parser, Debug)]
#[command(name = "cart")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub proxy: ProxyArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the cart callbacks to the proxy
    Serve {
        /// Address the callback server listens on
        #[arg(long, env = "APP_LISTEN", default_value = "0.0.0.0:4001")]
        listen: SocketAddr,

        /// Start even if the proxy health check fails
        #[arg(long)]
        skip_proxy_check: bool,
    },

    /// Place a single order and exit
    Order {
        #[arg(long)]
        product_id: String,

        #[arg(long)]
        amount: i32,

        #[arg(long)]
        customer_id: String,
    },
}

/// Where the proxy is and how long to wait for it.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ProxyArgs {
    #[arg(long, env = "DAPR_HOST", default_value = "127.0.0.1", global = true)]
    pub proxy_host: String,

    #[arg(long, env = "DAPR_HTTP_PORT", default_value_t = 3500, global = true)]
    pub proxy_port: u16,

    /// Per-call timeout for outbound requests, in seconds
    #[arg(long, env = "DAPR_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    /// Pub/sub component to publish through
    #[arg(long, env = "DAPR_PUBSUB_NAME", global = true)]
    pub pubsub: Option<String>,
}

impl ProxyArgs {
    pub fn client_config(&self) -> Result<ClientConfig, ClientError> {
        let mut config = ClientConfig::from_host_port(&self.proxy_host, self.proxy_port)?
            .with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(pubsub) = &self.pubsub {
            config = config.with_pubsub(pubsub.clone());
        }
        Ok(config)
    }
}
