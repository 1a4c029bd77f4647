//! # Storefront engine public API
//!
//! The `shop_api` module exposes the programmatic API for the storefront engine. The API is modular, so clients
//! can pick and choose the functionality they need, or run different parts on different machines.
//!
//! * [`order_flow_api`] drives orders through their lifecycle: placement, cancellation, completion.
//! * [`product_api`] manages the catalogue: creation, patching with optimistic concurrency, lookups.
//! * [`analytics_api`] serves read-only sales leaderboards.
//!
//! # API usage
//!
//! The pattern for all the APIs is the same. An API instance is created by supplying a database backend that
//! implements the backend traits the API requires.
//!
//! ```rust,ignore
//! use storefront_engine::{AnalyticsApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements ShopAnalytics
//! let api = AnalyticsApi::new(db);
//! let top = api.top_by_units(5, &[]).await?;
//! ```

pub mod analytics_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod product_api;
