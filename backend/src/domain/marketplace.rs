//! Marketplace purchase coordinator.
//!
//! Orchestrates a purchase across the account ledger, the wallet store, and
//! the history log. The coordinator performs the fail-fast checks in the
//! required order (availability, self-purchase, funds) without touching any
//! state, then hands a [`PurchaseCommit`] to the transactional
//! [`PurchaseStore`] port, which applies the debit, credit, ownership
//! transfer, and history append as one atomic unit. The commit re-validates
//! both funds and the item's listed state, so a request that loses a race
//! observes a conflict and leaves every balance untouched.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::Error;
use super::ports::{
    PurchaseCommit, PurchaseStore, PurchaseStoreError, UserStore, UserStoreError, WalletStore,
    WalletStoreError,
};
use super::user::UserId;
use super::wallet::ItemId;

/// Client-facing message when the item is gone, unlisted, or lost to a
/// racing buyer.
pub const MSG_ITEM_UNAVAILABLE: &str = "Item not available or already sold";
/// Client-facing message for a self-purchase attempt.
pub const MSG_SELF_PURCHASE: &str = "Cannot purchase your own item";
/// Client-facing message when the buyer's balance does not cover the price.
pub const MSG_INSUFFICIENT_FUNDS: &str = "Insufficient funds to purchase this item";

/// Confirmation returned to the buyer after a settled purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    /// Price paid, echoed for UI confirmation.
    pub price: Decimal,
}

fn map_user_store_error(error: UserStoreError) -> Error {
    match error {
        UserStoreError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserStoreError::Query { message } => {
            Error::internal(format!("user store error: {message}"))
        }
        UserStoreError::EmailTaken { email } => {
            Error::internal(format!("unexpected duplicate email during purchase: {email}"))
        }
    }
}

fn map_wallet_store_error(error: WalletStoreError) -> Error {
    match error {
        WalletStoreError::Connection { message } => {
            Error::service_unavailable(format!("wallet store unavailable: {message}"))
        }
        WalletStoreError::Query { message } => {
            Error::internal(format!("wallet store error: {message}"))
        }
        WalletStoreError::NotFound => Error::invalid_request(MSG_ITEM_UNAVAILABLE),
    }
}

fn map_purchase_store_error(error: PurchaseStoreError) -> Error {
    match error {
        PurchaseStoreError::Connection { message } => {
            Error::service_unavailable(format!("purchase store unavailable: {message}"))
        }
        PurchaseStoreError::Query { message } => {
            Error::internal(format!("purchase store error: {message}"))
        }
        // A racing request delisted or bought the item between the check and
        // the commit. The client sees the same message as an unlisted item.
        PurchaseStoreError::Conflict => Error::invalid_request(MSG_ITEM_UNAVAILABLE),
        PurchaseStoreError::InsufficientFunds => Error::invalid_request(MSG_INSUFFICIENT_FUNDS),
        PurchaseStoreError::SellerMissing => {
            Error::internal("seller account missing during purchase commit")
        }
    }
}

/// The marketplace transaction coordinator.
#[derive(Clone)]
pub struct MarketplaceService {
    users: Arc<dyn UserStore>,
    wallet: Arc<dyn WalletStore>,
    purchases: Arc<dyn PurchaseStore>,
}

impl MarketplaceService {
    /// Create the coordinator with its three collaborating ports.
    pub fn new(
        users: Arc<dyn UserStore>,
        wallet: Arc<dyn WalletStore>,
        purchases: Arc<dyn PurchaseStore>,
    ) -> Self {
        Self {
            users,
            wallet,
            purchases,
        }
    }

    /// Purchase a listed item on behalf of the authenticated buyer.
    ///
    /// Check order is part of the contract: availability, then
    /// self-purchase, then funds. No state is touched until every check has
    /// passed; the commit itself is all-or-nothing.
    pub async fn purchase(
        &self,
        item_id: ItemId,
        buyer_id: UserId,
    ) -> Result<PurchaseReceipt, Error> {
        let item = self
            .wallet
            .find_listed(item_id)
            .await
            .map_err(map_wallet_store_error)?
            .ok_or_else(|| Error::invalid_request(MSG_ITEM_UNAVAILABLE))?;

        if item.owner_id == buyer_id {
            return Err(Error::forbidden(MSG_SELF_PURCHASE));
        }

        let buyer = self
            .users
            .find_by_id(buyer_id)
            .await
            .map_err(map_user_store_error)?
            .ok_or_else(|| Error::unauthorized("Not authenticated"))?;

        if buyer.balance() < item.price {
            return Err(Error::invalid_request(MSG_INSUFFICIENT_FUNDS));
        }

        let commit = PurchaseCommit {
            item_id,
            seller_id: item.owner_id,
            buyer_id,
            buyer_name: buyer.email().as_str().to_owned(),
            image_url: item.image_url.clone(),
            price: item.price,
            date_sold: Utc::now(),
        };

        self.purchases
            .commit(commit)
            .await
            .map_err(map_purchase_store_error)?;

        info!(
            item = %item_id,
            buyer = %buyer_id,
            seller = %item.owner_id,
            price = %item.price,
            "purchase settled"
        );
        Ok(PurchaseReceipt { price: item.price })
    }
}
