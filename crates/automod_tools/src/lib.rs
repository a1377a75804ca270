#![forbid(unsafe_code)]

pub mod admin_cli;
pub mod logging;
