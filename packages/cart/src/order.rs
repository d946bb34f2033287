//! The place-order workflow.
//!
//! Ask the order service to create the order, then tell the storage service
//! to reduce stock. The two steps are independent calls through the proxy:
//! if the publish fails after the order was created, the order stays created.

use sidecar_client::{ClientError, SidecarClient};
use tracing::info;

use crate::messages::{CreateOrderRequest, CreateOrderResponse, StorageReduceData};

pub const ORDER_SERVICE: &str = "OrderService";
pub const CREATE_ORDER: &str = "createOrder";
pub const STORAGE_REDUCE_TOPIC: &str = "Storage.Reduce";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    /// The order service declined the order. Nothing was published.
    Rejected,
    /// The order was created and a stock reduction published.
    Placed(StorageReduceData),
}

impl OrderOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, OrderOutcome::Placed(_))
    }
}

pub async fn place_order(
    client: &SidecarClient,
    request: &CreateOrderRequest,
) -> Result<OrderOutcome, ClientError> {
    let response: CreateOrderResponse = client.invoke(ORDER_SERVICE, CREATE_ORDER, request).await?;
    if !response.succeed {
        info!(product_id = %request.product_id, "order rejected");
        return Ok(OrderOutcome::Rejected);
    }

    let reduce = StorageReduceData {
        product_id: request.product_id.clone(),
        amount: request.amount,
    };
    client.publish(STORAGE_REDUCE_TOPIC, &reduce).await?;
    info!(
        product_id = %reduce.product_id,
        amount = reduce.amount,
        "order placed, stock reduction published"
    );

    Ok(OrderOutcome::Placed(reduce))
}
