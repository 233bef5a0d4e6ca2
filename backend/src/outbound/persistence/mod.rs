//! Persistence adapters for the domain's storage ports.
//!
//! Two families live here. The Diesel adapters persist to PostgreSQL through
//! `diesel-async` with `bb8` pooling; they are thin translations between row
//! structs and domain types, with no business logic. The [`MemoryStore`]
//! implements the same ports in process and backs the server when no database
//! is configured, as well as the test suites.
//!
//! Row structs (`models`) and table definitions (`schema`) are internal
//! implementation details and never cross into the domain layer.

mod diesel_errors;
mod diesel_history_log;
mod diesel_purchase_store;
mod diesel_user_store;
mod diesel_wallet_store;
mod memory;
mod models;
mod pool;
mod schema;

pub use diesel_history_log::DieselHistoryLog;
pub use diesel_purchase_store::DieselPurchaseStore;
pub use diesel_user_store::DieselUserStore;
pub use diesel_wallet_store::DieselWalletStore;
pub use memory::MemoryStore;
pub use pool::{DbPool, PoolConfig, PoolError};
