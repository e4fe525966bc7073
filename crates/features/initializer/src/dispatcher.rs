use crate::directive::Directive;
use crate::error::InitError;
use crate::registry::ComponentRegistry;
use crate::report::{Dispatched, Failure, Report};
use crate::resolver::resolve;
use tracing::{debug, warn};
use weld_dom::Document;

/// Resolves and invokes directives in order against one registry.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'r> {
    registry: &'r ComponentRegistry,
}

impl<'r> Dispatcher<'r> {
    #[must_use]
    pub const fn new(registry: &'r ComponentRegistry) -> Self {
        Self { registry }
    }

    /// Dispatches every directive, recording one entry per directive in the
    /// report. Failures never stop the loop.
    pub fn dispatch(&self, doc: &mut Document, directives: Vec<Directive>, report: &mut Report) {
        for directive in directives {
            match self.dispatch_one(doc, &directive) {
                Ok(dispatched) => report.dispatched.push(dispatched),
                Err(error) => {
                    warn!(
                        component = %directive.component,
                        origin = %directive.origin,
                        kind = %error.kind(),
                        "{error}"
                    );
                    report.failures.push(Failure::new(directive.origin, Some(directive.component), error));
                },
            }
        }
    }

    fn dispatch_one(&self, doc: &mut Document, directive: &Directive) -> Result<Dispatched, InitError> {
        let resolution = resolve(self.registry, directive)?;
        let strategy = resolution.strategy();

        debug!(component = %directive.component, %strategy, target = ?directive.target, "Invoking component");
        resolution.invoke(doc, directive).map_err(|error| InitError::Invocation {
            message: error.to_string().into(),
            context: Some(format!("{} via {strategy}", directive.component).into()),
        })?;

        Ok(Dispatched { component: directive.component.clone(), target: directive.target, strategy })
    }
}
