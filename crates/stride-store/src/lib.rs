//! stride-store: the record store boundary
//!
//! The client core never issues raw queries; it talks to an opaque CRUD
//! interface over named collections and only ever supplies/consumes the
//! sealed payload as one opaque column. A production deployment points
//! this trait at a hosted store's client library; this crate ships an
//! in-memory backend for tests and a JSON-file backend for local use.

pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::{Filter, RecordStore};
