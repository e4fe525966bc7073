use std::borrow::Cow;
use weld_derive::weld_error;

#[weld_error]
pub enum ProbeError {
    #[error("Probe failed{}: {message}", format_context(.context))]
    Failed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Probe skipped: {reason}")]
    Skipped { reason: String },
}

fn main() {
    let failed: Result<(), ProbeError> =
        Err(ProbeError::Failed { message: "no element".into(), context: None });
    let failed = failed.context("<div#panel>").unwrap_err();
    assert_eq!(failed.context(), Some("<div#panel>"));

    let skipped: Result<(), ProbeError> = Err(ProbeError::Skipped { reason: "empty".into() });
    let skipped = skipped.context("ignored").unwrap_err();
    assert_eq!(skipped.context(), None);
}
