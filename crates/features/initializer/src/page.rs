//! # Page Runtime
//!
//! Wires a shared document, an [`Initializer`] and the event bus together.
//! Code that replaces markup (typically a network callback on another task)
//! locks the document, mutates it, drops the lock and publishes
//! [`PageSignal::ContentUpdated`]. A single [`PageListener`] applies signals
//! in publication order.
//!
//! The bus is bounded. When the listener falls behind and signals are
//! overwritten, it does not drop them silently: it catches up with the ready
//! scan if the page is not ready yet, or with a rescan of the whole document
//! otherwise, and reports the number of lost signals in [`Handled::lost`].

use crate::error::InitError;
use crate::initializer::Initializer;
use crate::report::Report;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use weld_dom::Document;
use weld_domain::{NodeId, PageSignal};
use weld_event_bus::EventBus;

/// Document handle shared between the listener and content producers.
pub type SharedDocument = Arc<Mutex<Document>>;

#[derive(Debug)]
pub struct Page {
    document: SharedDocument,
    initializer: Arc<Initializer>,
    bus: EventBus,
}

impl Page {
    #[must_use]
    pub fn new(document: Document, initializer: Initializer, bus: EventBus) -> Self {
        Self { document: Arc::new(Mutex::new(document)), initializer: Arc::new(initializer), bus }
    }

    #[must_use]
    pub fn document(&self) -> SharedDocument {
        Arc::clone(&self.document)
    }

    #[must_use]
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    #[must_use]
    pub fn initializer(&self) -> &Initializer {
        &self.initializer
    }

    /// Runs the ready scan on the calling thread.
    pub fn ready(&self) -> Option<Report> {
        let mut doc = self.document.lock();
        self.initializer.on_ready(&mut doc)
    }

    /// Rescans the subtree at `root` on the calling thread.
    pub fn content_updated(&self, root: NodeId) -> Option<Report> {
        let mut doc = self.document.lock();
        self.initializer.on_content_updated(&mut doc, root)
    }

    /// Publishes a signal for the listener.
    ///
    /// # Errors
    /// [`InitError::Bus`] if the bus rejects the event type.
    pub fn signal(&self, signal: PageSignal) -> Result<usize, InitError> {
        Ok(self.bus.publish(signal)?)
    }

    /// Subscribes a listener to page signals.
    ///
    /// # Errors
    /// [`InitError::Bus`] if the subscription cannot be created.
    pub fn listen(&self) -> Result<PageListener, InitError> {
        Ok(PageListener {
            document: Arc::clone(&self.document),
            initializer: Arc::clone(&self.initializer),
            receiver: self.bus.subscribe::<PageSignal>()?,
        })
    }
}

/// One signal and what it produced. `report` is `None` for ignored signals.
#[derive(Debug)]
pub struct Handled {
    /// The signal applied. After a lag this is the catch-up signal the
    /// listener chose, not one that was published.
    pub signal: PageSignal,
    /// Signals overwritten before the listener could read them.
    pub lost: u64,
    pub report: Option<Report>,
}

#[derive(Debug)]
pub struct PageListener {
    document: SharedDocument,
    initializer: Arc<Initializer>,
    receiver: broadcast::Receiver<Arc<PageSignal>>,
}

impl PageListener {
    /// Waits for and applies the next signal. `None` once the bus closes.
    pub async fn next(&mut self) -> Option<Handled> {
        let (signal, lost) = match self.receiver.recv().await {
            Ok(signal) => (*signal, 0),
            Err(RecvError::Lagged(lost)) => {
                let signal = self.catch_up();
                warn!(lost, ?signal, "Page listener fell behind; catching up with a full scan");
                (signal, lost)
            },
            Err(RecvError::Closed) => return None,
        };

        let report = {
            let mut doc = self.document.lock();
            match signal {
                PageSignal::Ready => self.initializer.on_ready(&mut doc),
                PageSignal::ContentUpdated { root } => self.initializer.on_content_updated(&mut doc, root),
            }
        };
        Some(Handled { signal, lost, report })
    }

    /// Signal covering whatever was lost: the ready scan, or once ready, a
    /// rescan from the document root.
    fn catch_up(&self) -> PageSignal {
        if self.initializer.is_ready() {
            PageSignal::ContentUpdated { root: self.document.lock().root() }
        } else {
            PageSignal::Ready
        }
    }

    /// Applies signals until the bus shuts down. Returns how many were handled.
    pub async fn run(mut self) -> usize {
        let mut handled = 0usize;
        while self.next().await.is_some() {
            handled += 1;
        }
        info!(handled, "Page listener stopped");
        handled
    }
}
