//! Wallet operations: adding images and toggling the listing lifecycle.

use std::sync::Arc;

use rust_decimal::Decimal;

use super::error::Error;
use super::ports::{WalletStore, WalletStoreError};
use super::user::UserId;
use super::wallet::{validate_price, ImageUrl, ItemId, ItemStatus, MarketplaceListing, WalletItem};

fn map_wallet_store_error(error: WalletStoreError) -> Error {
    match error {
        WalletStoreError::Connection { message } => {
            Error::service_unavailable(format!("wallet store unavailable: {message}"))
        }
        WalletStoreError::Query { message } => {
            Error::internal(format!("wallet store error: {message}"))
        }
        WalletStoreError::NotFound => Error::not_found("Card not found or unauthorized."),
    }
}

/// Wallet use-cases for the authenticated owner, plus the public marketplace
/// view.
#[derive(Clone)]
pub struct WalletService {
    wallet: Arc<dyn WalletStore>,
}

impl WalletService {
    /// Create the service with its store.
    pub fn new(wallet: Arc<dyn WalletStore>) -> Self {
        Self { wallet }
    }

    /// All items in the user's wallet.
    pub async fn items_for_user(&self, owner_id: UserId) -> Result<Vec<WalletItem>, Error> {
        self.wallet
            .list_for_user(owner_id)
            .await
            .map_err(map_wallet_store_error)
    }

    /// Add a generated image to the wallet. New items always start withdrawn
    /// at price zero; selling goes through [`Self::list_item`], which is the
    /// only place a price is set. Creating directly as listed would put a
    /// free item on the marketplace, so it is rejected.
    pub async fn add_image(
        &self,
        owner_id: UserId,
        image_url: &str,
        status: Option<&str>,
    ) -> Result<WalletItem, Error> {
        let image_url =
            ImageUrl::new(image_url).map_err(|err| Error::invalid_request(err.to_string()))?;
        if let Some(raw) = status {
            let status = raw
                .parse::<ItemStatus>()
                .map_err(|err| Error::invalid_request(err.to_string()))?;
            if status == ItemStatus::Listed {
                return Err(Error::invalid_request(
                    "New images cannot be created as listed; list them for sale with a price",
                ));
            }
        }
        self.wallet
            .create(owner_id, image_url, ItemStatus::Withdrawn)
            .await
            .map_err(map_wallet_store_error)
    }

    /// List an owned item for sale at a strictly positive price.
    pub async fn list_item(
        &self,
        owner_id: UserId,
        item_id: ItemId,
        price: Decimal,
    ) -> Result<WalletItem, Error> {
        let price = validate_price(price).map_err(|err| Error::invalid_request(err.to_string()))?;
        self.wallet
            .set_listed(item_id, owner_id, price)
            .await
            .map_err(map_wallet_store_error)
    }

    /// Withdraw an owned item from sale; its price resets to zero.
    pub async fn withdraw_item(
        &self,
        owner_id: UserId,
        item_id: ItemId,
    ) -> Result<WalletItem, Error> {
        self.wallet
            .set_withdrawn(item_id, owner_id)
            .await
            .map_err(map_wallet_store_error)
    }

    /// Public marketplace view: every listed item with its owner's email.
    pub async fn marketplace(&self) -> Result<Vec<MarketplaceListing>, Error> {
        self.wallet
            .list_marketplace()
            .await
            .map_err(map_wallet_store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::outbound::persistence::MemoryStore;
    use rstest::rstest;

    fn fixtures() -> (Arc<MemoryStore>, WalletService, UserId) {
        let store = Arc::new(MemoryStore::new());
        let owner = store.register_fixture_user("owner@example.com");
        let service = WalletService::new(store.clone());
        (store, service, owner)
    }

    #[rstest]
    #[actix_web::test]
    async fn add_image_defaults_to_withdrawn() {
        let (_store, service, owner) = fixtures();
        let item = service
            .add_image(owner, "https://img.example/a.png", None)
            .await
            .expect("item created");
        assert_eq!(item.status, ItemStatus::Withdrawn);
        assert_eq!(item.price, Decimal::ZERO);
        assert_eq!(item.owner_id, owner);
    }

    #[rstest]
    #[actix_web::test]
    async fn add_image_rejects_listed_on_create() {
        let (_store, service, owner) = fixtures();
        let err = service
            .add_image(owner, "https://img.example/a.png", Some("listed"))
            .await
            .expect_err("listed-on-create rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        // Nothing reaches the marketplace, so no zero-price listing exists.
        let listings = service.marketplace().await.expect("marketplace loads");
        assert!(listings.is_empty());
    }

    #[rstest]
    #[actix_web::test]
    async fn explicit_withdrawn_status_is_accepted() {
        let (_store, service, owner) = fixtures();
        let item = service
            .add_image(owner, "https://img.example/a.png", Some("withdrawn"))
            .await
            .expect("item created");
        assert_eq!(item.status, ItemStatus::Withdrawn);
    }

    #[rstest]
    #[actix_web::test]
    async fn add_image_rejects_unknown_status() {
        let (_store, service, owner) = fixtures();
        let err = service
            .add_image(owner, "https://img.example/a.png", Some("sold"))
            .await
            .expect_err("unknown status rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[actix_web::test]
    async fn listing_sets_status_and_price() {
        let (_store, service, owner) = fixtures();
        let item = service
            .add_image(owner, "https://img.example/a.png", None)
            .await
            .expect("item created");
        let listed = service
            .list_item(owner, item.id, Decimal::from(100))
            .await
            .expect("listing succeeds");
        assert_eq!(listed.status, ItemStatus::Listed);
        assert_eq!(listed.price, Decimal::from(100));
    }

    #[rstest]
    #[case(Decimal::ZERO)]
    #[case(Decimal::from(-10))]
    #[actix_web::test]
    async fn listing_rejects_non_positive_price(#[case] price: Decimal) {
        let (_store, service, owner) = fixtures();
        let item = service
            .add_image(owner, "https://img.example/a.png", None)
            .await
            .expect("item created");
        let err = service
            .list_item(owner, item.id, price)
            .await
            .expect_err("non-positive price rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[actix_web::test]
    async fn listing_someone_elses_item_is_not_found() {
        let (store, service, owner) = fixtures();
        let stranger = store.register_fixture_user("stranger@example.com");
        let item = service
            .add_image(owner, "https://img.example/a.png", None)
            .await
            .expect("item created");
        let err = service
            .list_item(stranger, item.id, Decimal::from(100))
            .await
            .expect_err("ownership enforced");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "Card not found or unauthorized.");
    }

    #[rstest]
    #[actix_web::test]
    async fn withdraw_clears_price() {
        let (_store, service, owner) = fixtures();
        let item = service
            .add_image(owner, "https://img.example/a.png", None)
            .await
            .expect("item created");
        service
            .list_item(owner, item.id, Decimal::from(100))
            .await
            .expect("listing succeeds");
        let withdrawn = service
            .withdraw_item(owner, item.id)
            .await
            .expect("withdraw succeeds");
        assert_eq!(withdrawn.status, ItemStatus::Withdrawn);
        assert_eq!(withdrawn.price, Decimal::ZERO);
    }

    #[rstest]
    #[actix_web::test]
    async fn marketplace_shows_only_listed_items_with_owner_email() {
        let (_store, service, owner) = fixtures();
        let listed = service
            .add_image(owner, "https://img.example/listed.png", None)
            .await
            .expect("item created");
        service
            .add_image(owner, "https://img.example/hidden.png", None)
            .await
            .expect("item created");
        service
            .list_item(owner, listed.id, Decimal::from(25))
            .await
            .expect("listing succeeds");

        let listings = service.marketplace().await.expect("marketplace loads");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, listed.id);
        assert_eq!(listings[0].owner_email.as_str(), "owner@example.com");
        assert_eq!(listings[0].price, Decimal::from(25));
    }
}
