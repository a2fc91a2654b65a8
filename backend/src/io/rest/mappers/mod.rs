//! Conversions between domain types and the DTOs in the `shared` crate.

pub mod analytics_mapper;
pub mod calendar_mapper;
pub mod chat_mapper;
pub mod ledger_mapper;
pub mod notification_mapper;
pub mod planning_mapper;
pub mod user_mapper;
