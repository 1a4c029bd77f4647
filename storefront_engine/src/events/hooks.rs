use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::events::{AuditEvent, EventHandler, EventProducer, Handler};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub audit_producer: Vec<EventProducer<AuditEvent>>,
}

pub struct EventHandlers {
    pub on_audit: Option<EventHandler<AuditEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_audit = hooks.on_audit.map(|f| EventHandler::new(buffer_size, f));
        Self { on_audit }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_audit {
            result.audit_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_audit {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_audit: Option<Handler<AuditEvent>>,
}

impl EventHooks {
    pub fn on_audit<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(AuditEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_audit = Some(Arc::new(f));
        self
    }

    /// The standard audit sink: every published event is written through
    /// [`crate::traits::StorefrontDatabase::record_audit`]. A failed write is logged and dropped; it never
    /// reaches the operation that published the event.
    #[cfg(feature = "sqlite")]
    pub fn persist_to(db: crate::SqliteDatabase) -> Self {
        use crate::traits::StorefrontDatabase;
        let mut hooks = Self::default();
        hooks.on_audit(move |event: AuditEvent| {
            let db = db.clone();
            Box::pin(async move {
                if let Err(e) = db.record_audit(event.entry).await {
                    error!("📋️ Failed to record audit entry: {e}");
                }
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        hooks
    }
}
