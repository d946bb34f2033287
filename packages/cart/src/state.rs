use sidecar_client::SidecarClient;
use tokio::sync::Mutex;

/// In-process cart state shared by every handler.
///
/// Product ids are kept in insertion order. The lock is only taken for the
/// push or copy itself and never across an outbound call.
#[derive(Debug)]
pub struct CartState {
    product_ids: Mutex<Vec<String>>,
    client: SidecarClient,
}

impl CartState {
    pub fn new(client: SidecarClient) -> Self {
        Self {
            product_ids: Mutex::new(Vec::new()),
            client,
        }
    }

    /// Outbound client for calls made while handling a request.
    pub fn client(&self) -> &SidecarClient {
        &self.client
    }

    /// Append a product id, returning the new cart size.
    pub async fn add(&self, product_id: String) -> usize {
        let mut ids = self.product_ids.lock().await;
        ids.push(product_id);
        ids.len()
    }

    pub async fn snapshot(&self) -> Vec<String> {
        self.product_ids.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.product_ids.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
