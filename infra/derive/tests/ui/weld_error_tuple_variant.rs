use weld_derive::weld_error;

#[weld_error]
pub enum DemoError {
    Io(std::io::Error),
}

fn main() {}
