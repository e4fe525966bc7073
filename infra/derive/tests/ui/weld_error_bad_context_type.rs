use weld_derive::weld_error;

#[weld_error]
pub enum DemoError {
    #[error("Internal error: {message}")]
    Internal { message: String, context: Option<String> },
}

fn main() {}
