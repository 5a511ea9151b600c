//! stride-core: types and configuration shared across the Stride client core.
//!
//! The record store holds one row per domain record. Every row carries its
//! plaintext metadata (ids, foreign keys, dates, anything the store must
//! filter or sort on) next to a single `data_encrypted` column with the
//! sealed payload. This crate defines that row shape and the collection
//! names; the cipher lives in `stride-crypto` and the field split per
//! record kind in `stride-records`.

pub mod config;
pub mod types;

pub use config::StrideConfig;
pub use types::{Collection, FieldMap, NewRecord, RecordPatch, StoredRecord};
