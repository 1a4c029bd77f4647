//! Storefront Engine
//!
//! The storefront engine is the inventory-consistent core of an online shop. It owns the product catalogue, the
//! order lifecycle, and the sales analytics derived from them. It is presentation-agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly. Instead, use the public API provided by the engine. The exception is the data
//!    types stored in the database. These are defined in the [`mod@db_types`] module and are public.
//! 2. The engine public API ([`mod@shop_api`]). This provides the public-facing functionality: placing, cancelling
//!    and completing orders, patching the catalogue, and querying analytics. Backends implement the traits in the
//!    [`mod@traits`] module in order to serve these APIs.
//!
//! The engine also emits events when state changes. The primary consumer is the audit sink: every committed
//! mutation publishes an [`events::AuditEvent`] carrying a field-level change set, which a subscriber persists to
//! a write-only log. A simple actor framework lets you hook into these events and perform custom actions.

pub mod db_types;
pub mod events;
pub mod patch;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

mod shop_api;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use shop_api::{
    analytics_api::AnalyticsApi,
    order_flow_api::OrderFlowApi,
    order_objects,
    product_api::ProductApi,
};
pub use traits::{
    OrderItemProblem,
    OrderManagement,
    PatchOutcome,
    PatchSummary,
    ProductManagement,
    ShopAnalytics,
    StorefrontDatabase,
    StorefrontError,
    UpsertOutcome,
};
