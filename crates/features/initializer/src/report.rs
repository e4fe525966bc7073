use crate::directive::{Origin, Target};
use crate::error::{ErrorKind, InitError};
use crate::resolver::Strategy;
use serde::Serialize;
use std::fmt;

/// A directive that was resolved and whose component returned successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dispatched {
    pub component: String,
    pub target: Target,
    pub strategy: Strategy,
}

/// A failure isolated to one directive or one directive source.
#[derive(Debug)]
pub struct Failure {
    pub origin: Origin,
    /// Set when the failure concerns a single directive.
    pub component: Option<String>,
    pub error: InitError,
}

impl Failure {
    #[must_use]
    pub const fn new(origin: Origin, component: Option<String>, error: InitError) -> Self {
        Self { origin, component, error }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.component {
            Some(component) => write!(f, "[{}] {component} ({}): {}", self.kind(), self.origin, self.error),
            None => write!(f, "[{}] {}: {}", self.kind(), self.origin, self.error),
        }
    }
}

/// Outcome of one scan-and-dispatch run.
#[derive(Debug, Default)]
pub struct Report {
    pub dispatched: Vec<Dispatched>,
    pub failures: Vec<Failure>,
}

impl Report {
    /// No failures of any kind.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures_of(&self, kind: ErrorKind) -> impl Iterator<Item = &Failure> {
        self.failures.iter().filter(move |failure| failure.kind() == kind)
    }
}
