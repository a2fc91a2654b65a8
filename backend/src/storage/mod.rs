//! # Storage Module
//!
//! Handles all data persistence for the finance tracker.
//!
//! The domain layer only sees the traits in [`traits`]; a [`traits::Connection`]
//! hands out one repository per record type. Two backends implement it:
//!
//! - **SQLite** (`sqlite`): the default, a pooled SQLx database with the schema
//!   created on startup
//! - **Memory** (`memory`): a lock-protected store seeded with a demo account,
//!   used for demos and API tests
//!
//! Both backends order listings the same way and apply the same notification
//! deduplication, so services behave identically on either.

pub mod memory;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryConnection;
pub use sqlite::DbConnection;
pub use traits::Connection;
