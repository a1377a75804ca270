#![forbid(unsafe_code)]

pub mod admin;
pub mod dispatch;
pub mod enforcement;
pub mod ledger;
pub mod platform;
