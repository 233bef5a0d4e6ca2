//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod history;
pub mod marketplace;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod wallet;

pub use error::ApiResult;
