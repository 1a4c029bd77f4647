use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sfe_common::Money;
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------     VersionTag      ---------------------------------------------------------

/// An opaque optimistic-concurrency token attached to every product. The store bumps the underlying counter on
/// every update, so a tag captured during a read can be replayed on a patch to detect lost updates. Callers should
/// treat the tag as a black box: obtain it from a read, compare it for equality, render it with `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct VersionTag(i64);

impl From<i64> for VersionTag {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for VersionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "W/\"{}\"", self.0)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid version tag: {0}")]
pub struct VersionTagParseError(String);

impl FromStr for VersionTag {
    type Err = VersionTagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed.strip_prefix("W/\"").and_then(|rest| rest.strip_suffix('"')).unwrap_or(trimmed);
        inner.parse::<i64>().map(Self).map_err(|_| VersionTagParseError(s.to_string()))
    }
}

//--------------------------------------       Product       ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub version: VersionTag,
    pub name: String,
    pub description: Option<String>,
    pub retail_price: Money,
    pub wholesale_price: Money,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewProduct     ---------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub retail_price: Money,
    pub wholesale_price: Money,
    pub quantity: i64,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, retail_price: Money, wholesale_price: Money, quantity: i64) -> Self {
        Self { name: name.into(), description: None, retail_price, wholesale_price, quantity }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }
}

//--------------------------------------   OrderStatusType   ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been placed and stock has been reserved for it.
    Processing,
    /// The order has been fulfilled. Terminal.
    Completed,
    /// The order has been cancelled and its stock returned. Terminal.
    Cancelled,
}

impl OrderStatusType {
    /// Both `Completed` and `Cancelled` are terminal. No transition leaves either state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Completed | OrderStatusType::Cancelled)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Processing => write!(f, "Processing"),
            OrderStatusType::Completed => write!(f, "Completed"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Processing" => Ok(Self::Processing),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Processing");
            OrderStatusType::Processing
        })
    }
}

//--------------------------------------        Order        ---------------------------------------------------------

/// An order row. The `product_*` and `*_price` fields are point-in-time snapshots taken at placement and never
/// change afterwards, even if the source product is repriced or deleted. `product_id` is a soft reference and may
/// dangle once stock for the product collapses to zero.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub status: OrderStatusType,
    pub product_name: String,
    pub product_description: Option<String>,
    pub retail_price: Money,
    pub wholesale_price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder      ---------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Snapshot of the product name at purchase time.
    pub product_name: String,
    /// Snapshot of the product description at purchase time.
    pub product_description: Option<String>,
    /// Snapshot of the retail price at purchase time.
    pub retail_price: Money,
    /// Snapshot of the wholesale price at purchase time.
    pub wholesale_price: Money,
}

impl NewOrder {
    /// Captures the snapshot fields from the product as it stands right now. Must be called before the product is
    /// mutated or deleted as part of the same transaction.
    pub fn from_product(user_id: i64, product: &Product, quantity: i64) -> Self {
        Self {
            user_id,
            product_id: product.id,
            quantity,
            product_name: product.name.clone(),
            product_description: product.description.clone(),
            retail_price: product.retail_price,
            wholesale_price: product.wholesale_price,
        }
    }
}

//--------------------------------------      OrderItem      ---------------------------------------------------------

/// A single line of a multi-item order request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    pub quantity: i64,
}

impl OrderItem {
    pub fn new(product_id: i64, quantity: i64) -> Self {
        Self { product_id, quantity }
    }
}

//--------------------------------------        Role         ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Customer,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "Customer"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

//--------------------------------------     ActingUser      ---------------------------------------------------------

/// The authenticated principal on whose behalf an operation runs. Authentication itself happens upstream; the
/// engine only needs the id and role to enforce ownership rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser {
    pub id: i64,
    pub role: Role,
}

impl ActingUser {
    pub fn customer(id: i64) -> Self {
        Self { id, role: Role::Customer }
    }

    pub fn admin(id: i64) -> Self {
        Self { id, role: Role::Admin }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

//--------------------------------------    NewAuditEntry    ---------------------------------------------------------

/// A field-level change record destined for the audit sink. Write-only from the engine's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuditEntry {
    pub resource_type: String,
    pub resource_id: i64,
    pub user_id: Option<i64>,
    /// JSON object mapping each changed field to `{"from": .., "to": ..}`.
    pub change_set: serde_json::Value,
    pub previous_version: Option<VersionTag>,
    pub new_version: Option<VersionTag>,
}

//--------------------------------------     AuditEntry      ---------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct AuditEntry {
    pub id: i64,
    pub resource_type: String,
    pub resource_id: i64,
    pub user_id: Option<i64>,
    pub change_set: String,
    pub previous_version: Option<VersionTag>,
    pub new_version: Option<VersionTag>,
    pub created_at: DateTime<Utc>,
}
