//! Storage layer for siteledger
//!
//! A byte-oriented key-value store behind a trait, a file-backed
//! implementation with atomic writes, and JSON snapshot helpers.

pub mod file_io;
pub mod store;

pub use file_io::{write_bytes_atomic, FileStore};
pub use store::{
    load_json, projects_key, rates_key, save_json, users_key, KeyValueStore, MemoryStore,
    TENANTS_KEY,
};
