//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the relational store, the credential hasher). Each trait exposes strongly
//! typed errors so adapters map their failures into predictable variants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use super::history::{HistoryRecord, NewHistoryRecord};
use super::user::{Email, PasswordHash, User, UserId};
use super::wallet::{ImageUrl, ItemId, ItemStatus, MarketplaceListing, WalletItem};

/// Failures surfaced by [`UserStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserStoreError {
    /// Store connection could not be established.
    #[error("user store connection failed: {message}")]
    Connection {
        /// Adapter-level description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user store query failed: {message}")]
    Query {
        /// Adapter-level description.
        message: String,
    },
    /// Another account already uses this email.
    #[error("email {email} is already registered")]
    EmailTaken {
        /// The contested address.
        email: String,
    },
}

impl UserStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for unique-email violations.
    pub fn email_taken(email: impl Into<String>) -> Self {
        Self::EmailTaken {
            email: email.into(),
        }
    }
}

/// Failures surfaced by [`WalletStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletStoreError {
    /// Store connection could not be established.
    #[error("wallet store connection failed: {message}")]
    Connection {
        /// Adapter-level description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("wallet store query failed: {message}")]
    Query {
        /// Adapter-level description.
        message: String,
    },
    /// Item does not exist or is not owned by the acting user. The two cases
    /// are deliberately indistinguishable so the API does not leak ownership.
    #[error("wallet item not found or not owned by the caller")]
    NotFound,
}

impl WalletStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Failures surfaced by [`HistoryLog`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryLogError {
    /// Store connection could not be established.
    #[error("history log connection failed: {message}")]
    Connection {
        /// Adapter-level description.
        message: String,
    },
    /// Query or insert failed during execution.
    #[error("history log query failed: {message}")]
    Query {
        /// Adapter-level description.
        message: String,
    },
}

impl HistoryLogError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Failures surfaced by [`PurchaseStore::commit`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseStoreError {
    /// Store connection could not be established.
    #[error("purchase store connection failed: {message}")]
    Connection {
        /// Adapter-level description.
        message: String,
    },
    /// Query failed during execution; the transaction rolled back.
    #[error("purchase store query failed: {message}")]
    Query {
        /// Adapter-level description.
        message: String,
    },
    /// The item was no longer listed under the expected owner and price when
    /// the commit re-checked it; a racing request won.
    #[error("item is no longer listed as expected")]
    Conflict,
    /// The buyer's balance no longer covers the price at commit time.
    #[error("buyer balance does not cover the price")]
    InsufficientFunds,
    /// The seller's account vanished; nothing was applied.
    #[error("seller account no longer exists")]
    SellerMissing,
}

impl PurchaseStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Failures surfaced by the credential hashing boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    /// Adapter-level description.
    pub message: String,
}

impl PasswordHashError {
    /// Construct from any displayable cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Account ledger: persistence port for user aggregates and balances.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user with the starting balance. Fails with
    /// [`UserStoreError::EmailTaken`] on duplicate email.
    async fn create(&self, email: Email, password_hash: PasswordHash)
        -> Result<User, UserStoreError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError>;

    /// Fetch a user by login email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserStoreError>;

    /// Current balance for the user, or `None` when the user is absent.
    async fn balance_of(&self, id: UserId) -> Result<Option<Decimal>, UserStoreError>;
}

/// Persistence port for wallet items and the marketplace projection.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// All items owned by the user, any order.
    async fn list_for_user(&self, owner_id: UserId) -> Result<Vec<WalletItem>, WalletStoreError>;

    /// Insert a new item; price starts at zero.
    async fn create(
        &self,
        owner_id: UserId,
        image_url: ImageUrl,
        status: ItemStatus,
    ) -> Result<WalletItem, WalletStoreError>;

    /// Mark the item listed at `price`. Fails with
    /// [`WalletStoreError::NotFound`] unless the item exists and belongs to
    /// `owner_id`. The price is assumed validated by the caller.
    async fn set_listed(
        &self,
        item_id: ItemId,
        owner_id: UserId,
        price: Decimal,
    ) -> Result<WalletItem, WalletStoreError>;

    /// Mark the item withdrawn and clear its price. Same ownership rule as
    /// [`WalletStore::set_listed`].
    async fn set_withdrawn(
        &self,
        item_id: ItemId,
        owner_id: UserId,
    ) -> Result<WalletItem, WalletStoreError>;

    /// The currently listed item with this id, if any.
    async fn find_listed(&self, item_id: ItemId) -> Result<Option<WalletItem>, WalletStoreError>;

    /// All listed items joined with their owners' emails.
    async fn list_marketplace(&self) -> Result<Vec<MarketplaceListing>, WalletStoreError>;
}

/// Append-only port for completed-sale records.
#[async_trait]
pub trait HistoryLog: Send + Sync {
    /// Append one record. Pure insert; fails only on storage errors.
    async fn append(&self, record: NewHistoryRecord) -> Result<HistoryRecord, HistoryLogError>;

    /// Records for the seller, newest first (`date_sold` descending).
    async fn list_for_user(&self, seller_id: UserId)
        -> Result<Vec<HistoryRecord>, HistoryLogError>;
}

/// Everything the atomic purchase commit needs, captured after the
/// coordinator's fail-fast checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseCommit {
    /// Item changing hands.
    pub item_id: ItemId,
    /// Owner observed at check time; re-validated inside the commit.
    pub seller_id: UserId,
    /// Authenticated buyer.
    pub buyer_id: UserId,
    /// Buyer label recorded in history (their email).
    pub buyer_name: String,
    /// Image recorded in history.
    pub image_url: ImageUrl,
    /// Price observed at check time; re-validated inside the commit.
    pub price: Decimal,
    /// Sale timestamp recorded in history.
    pub date_sold: DateTime<Utc>,
}

/// Transactional port for the marketplace purchase.
///
/// Implementations must apply the buyer debit, seller credit, ownership
/// transfer, and history append as one atomic unit: either all four happen or
/// none do. The item transfer must re-check `status == listed` (and the
/// expected owner and price) at write time so racing buyers cannot both win.
#[async_trait]
pub trait PurchaseStore: Send + Sync {
    /// Atomically settle a purchase.
    async fn commit(&self, commit: PurchaseCommit) -> Result<(), PurchaseStoreError>;
}

/// Credential hashing boundary; the primitive itself is out of scope.
pub trait PasswordHasher: Send + Sync {
    /// Derive a storable hash from a plaintext password.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError>;

    /// Check a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError>;
}
