//! Domain entities, ports, and services.
//!
//! Everything in this module is transport and storage agnostic: inbound
//! adapters translate HTTP requests into service calls, outbound adapters
//! implement the ports in [`ports`].

pub mod auth;
pub mod error;
pub mod history;
pub mod history_service;
pub mod marketplace;
pub mod ports;
pub mod user;
pub mod wallet;
pub mod wallet_service;

pub use self::auth::AuthService;
pub use self::error::{Error, ErrorCode};
pub use self::history::{HistoryRecord, NewHistoryRecord};
pub use self::history_service::HistoryService;
pub use self::marketplace::{MarketplaceService, PurchaseReceipt};
pub use self::user::{Email, PasswordHash, User, UserId, UserProfile};
pub use self::wallet::{ImageUrl, ItemId, ItemStatus, MarketplaceListing, WalletItem};
pub use self::wallet_service::WalletService;

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, Error>;
