use std::borrow::Cow;

/// Errors raised by [`crate::Document`] operations.
#[weld_derive::weld_error]
pub enum DomError {
    /// The id does not belong to this document.
    #[error("Unknown node{}: {message}", format_context(.context))]
    UnknownNode { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The requested tree change would produce an invalid tree.
    #[error("Invalid hierarchy{}: {message}", format_context(.context))]
    Hierarchy { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Markup could not be tokenized.
    #[error("Malformed markup{}: {message}", format_context(.context))]
    Markup { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Selector syntax outside the supported subset.
    #[error("Invalid selector{}: {message}", format_context(.context))]
    Selector { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
