use crate::directive::Origin;
use crate::dispatcher::Dispatcher;
use crate::error::InitError;
use crate::registry::ComponentRegistry;
use crate::report::{Failure, Report};
use crate::scanner::Scanner;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, instrument, warn};
use weld_dom::Document;
use weld_domain::NodeId;
use weld_domain::config::InitializerConfig;

/// The scan → resolve → invoke pipeline plus its trigger rules.
///
/// * [`Initializer::on_ready`] runs over the whole document, once.
/// * [`Initializer::on_content_updated`] runs over one subtree, any number of
///   times after the page is ready.
#[derive(Debug)]
pub struct Initializer {
    scanner: Scanner,
    registry: Arc<ComponentRegistry>,
    ready: AtomicBool,
}

impl Initializer {
    #[must_use]
    pub fn new(config: &InitializerConfig, registry: Arc<ComponentRegistry>) -> Self {
        Self { scanner: Scanner::new(config), registry, ready: AtomicBool::new(false) }
    }

    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Handles the page-ready signal. Returns `None` if the page was already
    /// initialized.
    pub fn on_ready(&self, doc: &mut Document) -> Option<Report> {
        if self.ready.swap(true, Ordering::AcqRel) {
            warn!("Ready signal received twice; ignoring");
            return None;
        }
        Some(self.run(doc, doc.root()))
    }

    /// Handles the content-updated signal for the subtree at `root`.
    ///
    /// Returns `None` before the page is ready: the ready scan will cover
    /// that markup. A root that is unknown or detached is not scanned and
    /// yields a single `Internal` failure.
    pub fn on_content_updated(&self, doc: &mut Document, root: NodeId) -> Option<Report> {
        if !self.is_ready() {
            debug!(%root, "Content updated before page ready; deferring to the ready scan");
            return None;
        }
        let problem = if !doc.exists(root) {
            Some("does not belong to the document")
        } else if !doc.is_connected(root) {
            Some("is no longer attached to the document")
        } else {
            None
        };
        if let Some(problem) = problem {
            let origin = Origin::Update { root };
            let error = InitError::Internal {
                message: format!("Content-updated root {root} {problem}").into(),
                context: None,
            };
            warn!("{error}");
            return Some(Report { dispatched: Vec::new(), failures: vec![Failure::new(origin, None, error)] });
        }
        Some(self.run(doc, root))
    }

    /// Scans `scope` and dispatches what it finds, regardless of the ready
    /// state.
    #[instrument(skip(self, doc), fields(scope = %scope))]
    pub fn run(&self, doc: &mut Document, scope: NodeId) -> Report {
        let scan = self.scanner.scan(doc, scope);
        for failure in &scan.failures {
            warn!(origin = %failure.origin, kind = %failure.kind(), "{}", failure.error);
        }

        let mut report = Report { dispatched: Vec::new(), failures: scan.failures };
        Dispatcher::new(&self.registry).dispatch(doc, scan.directives, &mut report);

        info!(dispatched = report.dispatched.len(), failures = report.failures.len(), "Initialization run finished");
        report
    }
}
