use std::borrow::Cow;
use weld_derive::weld_error;

#[weld_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn open() -> Result<(), DemoError> {
    let io: Result<(), std::io::Error> = Err(std::io::Error::other("disk"));
    io.context("opening page.html")
}

fn main() {
    let err = open().unwrap_err();
    assert!(matches!(err, DemoError::Io { .. }));
    assert_eq!(err.to_string(), "IO error (opening page.html): disk");

    let internal: DemoError = "broken invariant".into();
    assert_eq!(internal.to_string(), "Internal error: broken invariant");
}
