//! # Backend contracts for the storefront engine.
//!
//! This module defines the interface contracts that database *backends* must expose in order to drive the
//! storefront engine.
//!
//! ## Traits
//! * [`StorefrontDatabase`] defines the write side: the three order-lifecycle verbs and the patch/merge verb, each
//!   of which must execute as a single atomic transaction against the product and order tables.
//! * [`ProductManagement`] and [`OrderManagement`] provide read-side queries over products and orders.
//! * [`ShopAnalytics`] provides the read-only rollups over order history.
//!
//! The write-side invariants worth calling out:
//! * No product row with `quantity <= 0` may persist. Any mutation that takes stock to zero or below deletes the
//!   row instead.
//! * Order snapshot fields are immutable once written, and are the system of record for historical pricing.
mod data_objects;
mod order_management;
mod product_management;
mod shop_analytics;
mod storefront_database;

pub use data_objects::{PatchOutcome, PatchSummary, ProductFrequency, ProductProfit, ProductRecency, ProductUnits, UpsertOutcome};
pub use order_management::OrderManagement;
pub use product_management::ProductManagement;
pub use shop_analytics::ShopAnalytics;
pub use storefront_database::{OrderItemProblem, StorefrontDatabase, StorefrontError};
