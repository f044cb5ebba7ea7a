//! AnkiBee command-line front end.

pub mod args;
pub mod commands;
pub mod context;
pub mod prompt;
