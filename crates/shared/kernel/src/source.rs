use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::debug;
use weld_dom::{Document, DomError};

#[weld_derive::weld_error]
pub enum SourceError {
    #[error("Cannot read markup{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Cannot parse markup{}: {source}", format_context(.context))]
    Markup { source: DomError, context: Option<Cow<'static, str>> },
}

/// Reads and parses a markup file into a [`Document`].
///
/// # Errors
/// [`SourceError::Io`] when the file cannot be read, [`SourceError::Markup`]
/// when it is not well-formed enough to tokenize. Both carry the path as
/// context.
pub fn load_document(path: impl AsRef<Path>) -> Result<Document, SourceError> {
    let path = path.as_ref();
    let markup = fs::read_to_string(path).context(path.display().to_string())?;
    let doc = Document::parse(&markup).context(path.display().to_string())?;
    debug!(path = %path.display(), nodes = doc.len(), "Loaded markup");
    Ok(doc)
}
