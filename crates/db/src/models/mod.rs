//! Row structs and insert DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the database row and
//! a create DTO for inserts. Public identifiers appear here in their compact
//! `Uuid` storage form; the store adapter layers the type tags back on.

pub mod account;
pub mod session;
