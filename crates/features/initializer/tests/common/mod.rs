#![allow(dead_code)]

use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use weld_dom::Document;
use weld_domain::NodeId;

/// One observed component call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub config: Value,
    pub target: Option<NodeId>,
}

/// Shared call log handed to component closures.
#[derive(Debug, Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<Call>>>);

impl Calls {
    pub fn record(&self, name: &str, config: &Value, target: Option<NodeId>) {
        self.0.lock().push(Call { name: name.to_owned(), config: config.clone(), target });
    }

    pub fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn names(&self) -> Vec<String> {
        self.0.lock().iter().map(|call| call.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }
}

pub fn select(doc: &Document, selector: &str) -> Vec<NodeId> {
    doc.query_selector_all(doc.root(), selector).unwrap()
}
