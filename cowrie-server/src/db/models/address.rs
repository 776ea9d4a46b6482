//! Address Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

/// Address ID type
pub type AddressId = RecordId;

/// 地址类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressKind {
    Shipping,
    Billing,
}

/// Address model matching SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<AddressId>,
    /// Record link to owning user
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(rename = "type")]
    pub kind: AddressKind,
}

/// Create address payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddressCreate {
    #[validate(length(min = 1, message = "Street is required"))]
    pub street: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "Postal code is required"))]
    pub postal_code: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    #[serde(rename = "type")]
    pub kind: AddressKind,
}

/// Update address payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<AddressKind>,
}
