//! Simple stateless pub-sub event handler.
//!
//! Components subscribe to engine events and react to them. The handler is stateless, i.e. subscribers have no
//! access to the internal state of the engine. All that is received is the event itself. Handlers can be async.
//! Events are handled one at a time in arrival order, so a subscriber like the audit sink sees a serialized
//! stream and writes entries in the order their operations committed.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::sync::mpsc;

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Drains the channel until the last producer is dropped, running the handler to completion on each event
    /// before taking the next. Returning from this future means every published event has been handled.
    pub async fn start_handler(mut self) {
        debug!("📋️ Starting event handler");
        // drop the internal sender so that when the last subscriber is dropped, the handler shuts down on its own
        drop(self.sender);
        while let Some(ev) = self.listener.recv().await {
            trace!("📋️ Handling event");
            (self.handler)(ev).await;
            trace!("📋️ Event handled");
        }
        debug!("📋️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📋️ Failed to send event: {e}");
        }
    }
}
