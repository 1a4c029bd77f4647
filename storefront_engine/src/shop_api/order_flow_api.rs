use std::fmt::Debug;

use log::*;
use serde_json::json;

use crate::{
    db_types::{ActingUser, NewAuditEntry, Order, OrderItem, OrderStatusType},
    events::{AuditEvent, EventProducers},
    shop_api::order_objects::OrderQueryFilter,
    traits::{StorefrontDatabase, StorefrontError},
};

/// `OrderFlowApi` is the primary API for driving orders through their lifecycle: placement, cancellation and
/// completion. It layers access control and audit emission over the backend's transactional operations.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: StorefrontDatabase
{
    /// Places a multi-item order for the acting user.
    ///
    /// Placement is all-or-nothing: any invalid item rejects the whole request with
    /// [`StorefrontError::OrderPlacement`] carrying every item-level problem, and no stock moves.
    pub async fn place_order(&self, user: &ActingUser, items: &[OrderItem]) -> Result<Vec<Order>, StorefrontError> {
        let orders = self.db.place_order(user.id, items).await?;
        for order in &orders {
            let entry = NewAuditEntry {
                resource_type: "order".to_string(),
                resource_id: order.id,
                user_id: Some(user.id),
                change_set: json!({"status": {"from": null, "to": order.status.to_string()}}),
                previous_version: None,
                new_version: None,
            };
            self.call_audit_hook(entry).await;
        }
        debug!("🔄️📦️ User {} placed {} order(s)", user.id, orders.len());
        Ok(orders)
    }

    /// Cancels an order. Customers may only cancel their own orders; administrators may cancel anyone's.
    pub async fn cancel_order(&self, order_id: i64, user: &ActingUser) -> Result<Order, StorefrontError> {
        let order = self.db.cancel_order(order_id, user).await?;
        let entry = status_change_entry(&order, user, OrderStatusType::Processing);
        self.call_audit_hook(entry).await;
        debug!("🔄️📦️ Order #{order_id} cancelled by user {}", user.id);
        Ok(order)
    }

    /// Marks an order as completed. Administrators only.
    pub async fn complete_order(&self, order_id: i64, user: &ActingUser) -> Result<Order, StorefrontError> {
        if !user.is_admin() {
            return Err(StorefrontError::Forbidden("Only administrators can complete orders".to_string()));
        }
        let order = self.db.complete_order(order_id).await?;
        let entry = status_change_entry(&order, user, OrderStatusType::Processing);
        self.call_audit_hook(entry).await;
        debug!("🔄️📦️ Order #{order_id} completed");
        Ok(order)
    }

    pub async fn order_by_id(&self, order_id: i64) -> Result<Option<Order>, StorefrontError> {
        self.db.order_by_id(order_id).await
    }

    /// Searches orders. Non-administrators are silently constrained to their own orders, whatever the filter says.
    pub async fn search_orders(
        &self,
        mut query: OrderQueryFilter,
        user: &ActingUser,
    ) -> Result<Vec<Order>, StorefrontError> {
        if !user.is_admin() {
            query.user_id = Some(user.id);
        }
        trace!("🔄️📦️ Searching orders: {query}");
        self.db.search_orders(query).await
    }

    async fn call_audit_hook(&self, entry: NewAuditEntry) {
        for emitter in &self.producers.audit_producer {
            trace!("🔄️📦️ Notifying audit hook subscribers");
            emitter.publish_event(AuditEvent::new(entry.clone())).await;
        }
    }
}

fn status_change_entry(order: &Order, user: &ActingUser, from: OrderStatusType) -> NewAuditEntry {
    NewAuditEntry {
        resource_type: "order".to_string(),
        resource_id: order.id,
        user_id: Some(user.id),
        change_set: json!({"status": {"from": from.to_string(), "to": order.status.to_string()}}),
        previous_version: None,
        new_version: None,
    }
}
