use std::borrow::Cow;
use weld_dom::DomError;
use weld_event_bus::EventBusError;

/// Failure taxonomy shared by reports, logs and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::IntoStaticStr)]
pub enum ErrorKind {
    ParseFailure,
    UnresolvedComponent,
    SelectorEvaluationFailure,
    InvocationFailure,
    Internal,
}

#[weld_derive::weld_error]
pub enum InitError {
    /// Payload is not valid JSON.
    #[error("Invalid directive payload{}: {source}", format_context(.context))]
    Syntax { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// Payload is JSON of the wrong shape.
    #[error("Malformed directive payload{}: {message}", format_context(.context))]
    Shape { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unresolved component{}: {message}", format_context(.context))]
    Unresolved { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Selector evaluation failed{}: {source}", format_context(.context))]
    Selector { source: DomError, context: Option<Cow<'static, str>> },

    #[error("Component failed{}: {message}", format_context(.context))]
    Invocation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid registry{}: {message}", format_context(.context))]
    Registry { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Event bus error{}: {source}", format_context(.context))]
    Bus { source: EventBusError, context: Option<Cow<'static, str>> },

    #[error("Internal initializer error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl InitError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax { .. } | Self::Shape { .. } => ErrorKind::ParseFailure,
            Self::Unresolved { .. } => ErrorKind::UnresolvedComponent,
            Self::Selector { .. } => ErrorKind::SelectorEvaluationFailure,
            Self::Invocation { .. } => ErrorKind::InvocationFailure,
            Self::Registry { .. } | Self::Bus { .. } | Self::Internal { .. } => ErrorKind::Internal,
        }
    }
}
