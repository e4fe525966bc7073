use std::borrow::Cow;

/// Errors raised by [`crate::EventBus`].
#[weld_derive::weld_error]
pub enum EventBusError {
    /// The channel registered for a type holds a sender of another type.
    /// Indicates a broken invariant in the type registry.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Broadcast channels need room for at least one event.
    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
