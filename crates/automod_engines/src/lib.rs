#![forbid(unsafe_code)]

pub mod activity;
pub mod badwords;
pub mod caps;
pub mod links;
pub mod normalize;
pub mod spam;
pub mod strikes;
