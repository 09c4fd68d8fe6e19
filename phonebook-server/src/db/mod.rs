//! Data access layer
//!
//! # Design Principles
//!
//! - One statement per call, over a fresh connection released on every path
//! - Writes run in a transaction: commit on success, rollback on failure
//! - No existence checks: update/delete of a missing id still succeed
//! - Failures come back classified as `StoreError`, never panics

pub mod memory;
pub mod mysql;
pub mod store;

pub use memory::InMemoryPhoneBook;
pub use mysql::MySqlPhoneBook;
pub use store::PhoneBookStore;
