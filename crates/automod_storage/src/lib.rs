#![forbid(unsafe_code)]

pub mod document;
pub mod documents;
pub mod paths;

pub use document::{DocumentStore, JsonFileStore, MemoryStore, StoreError};
pub use documents::{ConfigDocument, StrikeDocument};
