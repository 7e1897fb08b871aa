//! Shared domain types for the gatehouse session service.
//!
//! This crate is deliberately dependency-light: identifier generation,
//! the error taxonomy, and the clock abstraction live here so both the
//! storage layer and the session authority can share them.

pub mod error;
pub mod id;
pub mod time;
pub mod types;
