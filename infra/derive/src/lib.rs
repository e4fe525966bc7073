#![allow(unreachable_pub)]

//! # Macros
//!
//! Procedural macros used across the weld workspace.
//!
//! The only macro today is [`weld_error`], which turns a plain enum into a
//! `thiserror`-backed error type with context plumbing. Every crate in the
//! workspace declares its error enum with it so diagnostics look the same
//! whether a failure comes from the markup parser, the event bus or a
//! component dispatch.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! weld-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for declaring a crate error enum.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless the enum already derives them.
/// * A companion `<Name>Ext<T>` trait with `.context(...)` for `Result<T, Name>`
///   and for `Result<T, Source>` of every variant that wraps a source error.
/// * `From<Source>` for every variant with a `source` field (or a field tagged
///   `#[source]` / `#[from]`).
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * An inherent `context(&self) -> Option<&str>` accessor, used by reports
///   and log lines to say where a failure came from.
/// * A module-private `format_context` helper for `#[error(...)]` strings.
///
/// # Requirements
///
/// * Only enums with named-field variants are accepted.
/// * A `context` field must have the type `Option<Cow<'static, str>>`.
/// * A variant with a source must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[weld_derive::weld_error]
/// pub enum ScanError {
///     #[error("Invalid payload{}: {source}", format_context(.context))]
///     Payload { source: serde_json::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal scanner error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn parse(raw: &str) -> Result<serde_json::Value, ScanError> {
///     serde_json::from_str(raw).context("data-mage-init on <div>")
/// }
/// ```
#[proc_macro_attribute]
pub fn weld_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
