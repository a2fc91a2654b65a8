//! # IO Module
//!
//! Adapters between the outside world and the domain layer.
//!
//! ## Key Responsibilities
//!
//! - **REST API**: Axum routers that translate HTTP requests into service calls
//!   and domain results into the JSON DTOs of the `shared` crate
//! - **Error Translation**: Domain errors become HTTP status codes
//! - **Completion Model**: An OpenAI-compatible client implementing the
//!   domain's `CompletionClient` port for the chat assistant
//!
//! ## Design Patterns
//!
//! - **Handler Pattern**: Separate handler functions for each endpoint
//! - **Dependency Injection**: Services injected via Axum state
//! - **Request/Response DTOs**: Dedicated types for API communication

pub mod llm;
pub mod rest;
