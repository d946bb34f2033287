//! Wire messages exchanged with the proxy and with other services.

use serde::{Deserialize, Serialize};
use sidecar_envelope::{Message, TypeTag};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProductRequest {
    pub product_id: String,
}

impl Message for AddProductRequest {
    const TYPE_TAG: TypeTag = TypeTag::from_static("type.shoppingcart/AddProductRequest");

    fn validate(&self) -> Result<(), String> {
        if self.product_id.is_empty() {
            return Err("productId must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddProductResponse {
    pub succeed: bool,
}

impl Message for AddProductResponse {
    const TYPE_TAG: TypeTag = TypeTag::from_static("type.shoppingcart/AddProductResponse");
}

/// Current cart contents, in the order products were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetShoppingCartResponse {
    #[serde(default)]
    pub product_id: Vec<String>,
}

impl Message for GetShoppingCartResponse {
    const TYPE_TAG: TypeTag = TypeTag::from_static("type.shoppingcart/GetShoppingCartResponse");
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListRequest {}

impl Message for ProductListRequest {
    const TYPE_TAG: TypeTag = TypeTag::from_static("type.productlist/ProductListRequest");
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductList {
    #[serde(default)]
    pub results: Vec<Product>,
}

impl Message for ProductList {
    const TYPE_TAG: TypeTag = TypeTag::from_static("type.productlist/ProductList");
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub product_id: String,
    pub amount: i32,
    pub customer_id: String,
}

impl Message for CreateOrderRequest {
    const TYPE_TAG: TypeTag = TypeTag::from_static("type.orders/CreateOrderRequest");

    fn validate(&self) -> Result<(), String> {
        if self.product_id.is_empty() {
            return Err("productId must not be empty".to_string());
        }
        if self.customer_id.is_empty() {
            return Err("customerId must not be empty".to_string());
        }
        if self.amount <= 0 {
            return Err(format!("amount must be positive, got {}", self.amount));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub succeed: bool,
}

impl Message for CreateOrderResponse {
    const TYPE_TAG: TypeTag = TypeTag::from_static("type.orders/CreateOrderResponse");
}

/// Published after an order is accepted so the storage service can reduce
/// stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageReduceData {
    pub product_id: String,
    pub amount: i32,
}

impl Message for StorageReduceData {
    const TYPE_TAG: TypeTag = TypeTag::from_static("type.storage/StorageReduceData");
}
