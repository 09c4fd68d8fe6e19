//! phonebook-server: web front end over a single `phone_book` table
//!
//! Two layers:
//! - `db`: one SQL statement per call over a fresh connection
//! - `http` + `session`: routes, pages, pending-action tokens and flashes

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod session;

pub use config::{AppConfig, DatabaseConfig};
pub use db::{InMemoryPhoneBook, MySqlPhoneBook, PhoneBookStore};
pub use error::{ServerError, StoreError};
pub use http::{build_router, run_server, AppState, ServerConfig};
pub use models::{EntryFields, PhoneBookEntry};
