//! Library half of the `weld` binary, kept separate so commands can be
//! tested without spawning a process.

pub mod args;
pub mod commands;
pub mod output;
