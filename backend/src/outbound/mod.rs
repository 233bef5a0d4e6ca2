//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed stores using Diesel, plus the
//!   in-process [`persistence::MemoryStore`] fallback
//! - **password**: salted SHA-256 credential hashing
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod password;
pub mod persistence;
