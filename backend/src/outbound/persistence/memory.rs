//! In-memory store implementing every persistence port.
//!
//! Serves as the default backing when no `DATABASE_URL` is configured and as
//! the engine for integration tests. A single mutex guards the whole state,
//! which makes the purchase commit trivially atomic: the entire
//! check-and-apply sequence runs inside one critical section. That global
//! lock serialises unrelated purchases too, an accepted simplification for a
//! fixture adapter; the PostgreSQL adapter locks per row.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::history::{HistoryRecord, NewHistoryRecord};
use crate::domain::ports::{
    HistoryLog, HistoryLogError, PurchaseCommit, PurchaseStore, PurchaseStoreError, UserStore,
    UserStoreError, WalletStore, WalletStoreError,
};
use crate::domain::user::{starting_balance, Email, PasswordHash, User, UserId};
use crate::domain::wallet::{ImageUrl, ItemId, ItemStatus, MarketplaceListing, WalletItem};
#[cfg(any(test, feature = "test-support"))]
use crate::domain::wallet::WalletValidationError;

#[derive(Debug, Clone)]
struct UserRecord {
    id: UserId,
    email: Email,
    password_hash: PasswordHash,
    balance: Decimal,
}

impl UserRecord {
    fn to_user(&self) -> User {
        User::new(
            self.id,
            self.email.clone(),
            self.password_hash.clone(),
            self.balance,
        )
    }
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, UserRecord>,
    items: HashMap<ItemId, WalletItem>,
    history: Vec<HistoryRecord>,
}

/// Mutex-guarded state implementing all four persistence ports.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<State>,
}

const POISONED: &str = "memory store mutex poisoned";

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, &'static str> {
        self.inner.lock().map_err(|_| POISONED)
    }

    /// Register a user from fixture strings, panicking if validation fails.
    ///
    /// Test-only seam; production accounts go through `AuthService::register`.
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub fn register_fixture_user(&self, email: &str) -> UserId {
        let email = Email::new(email)
            .unwrap_or_else(|err| panic!("fixture email must satisfy validation: {err}"));
        let hash = PasswordHash::new("fixture")
            .unwrap_or_else(|err| panic!("fixture hash must satisfy validation: {err}"));
        let record = UserRecord {
            id: UserId::random(),
            email,
            password_hash: hash,
            balance: starting_balance(),
        };
        let id = record.id;
        let mut state = self
            .state()
            .unwrap_or_else(|err| panic!("fixture setup failed: {err}"));
        state.users.insert(id, record);
        id
    }

    /// Seed a wallet item directly, bypassing the service layer.
    ///
    /// Like [`Self::register_fixture_user`], poisoned state panics so a
    /// broken fixture never masquerades as a seeded item.
    #[cfg(any(test, feature = "test-support"))]
    pub fn seed_item(
        &self,
        owner_id: UserId,
        image_url: &str,
        status: ItemStatus,
        price: Decimal,
    ) -> Result<ItemId, WalletValidationError> {
        let item = WalletItem {
            id: ItemId::random(),
            owner_id,
            image_url: ImageUrl::new(image_url)?,
            status,
            price,
        };
        let id = item.id;
        let mut state = self
            .state()
            .unwrap_or_else(|err| panic!("fixture setup failed: {err}"));
        state.items.insert(id, item);
        Ok(id)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(
        &self,
        email: Email,
        password_hash: PasswordHash,
    ) -> Result<User, UserStoreError> {
        let mut state = self.state().map_err(UserStoreError::query)?;
        if state.users.values().any(|user| user.email == email) {
            return Err(UserStoreError::email_taken(email.as_str()));
        }
        let record = UserRecord {
            id: UserId::random(),
            email,
            password_hash,
            balance: starting_balance(),
        };
        let user = record.to_user();
        state.users.insert(record.id, record);
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError> {
        let state = self.state().map_err(UserStoreError::query)?;
        Ok(state.users.get(&id).map(UserRecord::to_user))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserStoreError> {
        let state = self.state().map_err(UserStoreError::query)?;
        Ok(state
            .users
            .values()
            .find(|user| user.email == *email)
            .map(UserRecord::to_user))
    }

    async fn balance_of(&self, id: UserId) -> Result<Option<Decimal>, UserStoreError> {
        let state = self.state().map_err(UserStoreError::query)?;
        Ok(state.users.get(&id).map(|user| user.balance))
    }
}

#[async_trait]
impl WalletStore for MemoryStore {
    async fn list_for_user(&self, owner_id: UserId) -> Result<Vec<WalletItem>, WalletStoreError> {
        let state = self.state().map_err(WalletStoreError::query)?;
        Ok(state
            .items
            .values()
            .filter(|item| item.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        owner_id: UserId,
        image_url: ImageUrl,
        status: ItemStatus,
    ) -> Result<WalletItem, WalletStoreError> {
        let item = WalletItem {
            id: ItemId::random(),
            owner_id,
            image_url,
            status,
            price: Decimal::ZERO,
        };
        let mut state = self.state().map_err(WalletStoreError::query)?;
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn set_listed(
        &self,
        item_id: ItemId,
        owner_id: UserId,
        price: Decimal,
    ) -> Result<WalletItem, WalletStoreError> {
        let mut state = self.state().map_err(WalletStoreError::query)?;
        let item = state
            .items
            .get_mut(&item_id)
            .filter(|item| item.owner_id == owner_id)
            .ok_or(WalletStoreError::NotFound)?;
        item.status = ItemStatus::Listed;
        item.price = price;
        Ok(item.clone())
    }

    async fn set_withdrawn(
        &self,
        item_id: ItemId,
        owner_id: UserId,
    ) -> Result<WalletItem, WalletStoreError> {
        let mut state = self.state().map_err(WalletStoreError::query)?;
        let item = state
            .items
            .get_mut(&item_id)
            .filter(|item| item.owner_id == owner_id)
            .ok_or(WalletStoreError::NotFound)?;
        item.status = ItemStatus::Withdrawn;
        item.price = Decimal::ZERO;
        Ok(item.clone())
    }

    async fn find_listed(&self, item_id: ItemId) -> Result<Option<WalletItem>, WalletStoreError> {
        let state = self.state().map_err(WalletStoreError::query)?;
        Ok(state
            .items
            .get(&item_id)
            .filter(|item| item.status == ItemStatus::Listed)
            .cloned())
    }

    async fn list_marketplace(&self) -> Result<Vec<MarketplaceListing>, WalletStoreError> {
        let state = self.state().map_err(WalletStoreError::query)?;
        // Inner-join semantics: listings whose owner vanished are dropped.
        Ok(state
            .items
            .values()
            .filter(|item| item.status == ItemStatus::Listed)
            .filter_map(|item| {
                state.users.get(&item.owner_id).map(|owner| MarketplaceListing {
                    id: item.id,
                    image_url: item.image_url.clone(),
                    price: item.price,
                    status: item.status,
                    owner_email: owner.email.clone(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl HistoryLog for MemoryStore {
    async fn append(&self, record: NewHistoryRecord) -> Result<HistoryRecord, HistoryLogError> {
        let mut state = self.state().map_err(HistoryLogError::query)?;
        let record = record.into_record(Uuid::new_v4());
        state.history.push(record.clone());
        Ok(record)
    }

    async fn list_for_user(
        &self,
        seller_id: UserId,
    ) -> Result<Vec<HistoryRecord>, HistoryLogError> {
        let state = self.state().map_err(HistoryLogError::query)?;
        let mut records: Vec<HistoryRecord> = state
            .history
            .iter()
            .filter(|record| record.seller_id == seller_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date_sold.cmp(&a.date_sold));
        Ok(records)
    }
}

#[async_trait]
impl PurchaseStore for MemoryStore {
    async fn commit(&self, commit: PurchaseCommit) -> Result<(), PurchaseStoreError> {
        let mut state = self.state().map_err(PurchaseStoreError::query)?;

        // Optimistic re-check: the item must still be listed by the expected
        // seller at the expected price.
        let item = state
            .items
            .get(&commit.item_id)
            .ok_or(PurchaseStoreError::Conflict)?;
        if item.status != ItemStatus::Listed
            || item.owner_id != commit.seller_id
            || item.price != commit.price
        {
            return Err(PurchaseStoreError::Conflict);
        }

        let buyer_balance = state
            .users
            .get(&commit.buyer_id)
            .map(|user| user.balance)
            .ok_or_else(|| PurchaseStoreError::query("buyer account missing"))?;
        if buyer_balance < commit.price {
            return Err(PurchaseStoreError::InsufficientFunds);
        }
        if !state.users.contains_key(&commit.seller_id) {
            return Err(PurchaseStoreError::SellerMissing);
        }

        // All checks passed inside the critical section; apply every effect.
        if let Some(buyer) = state.users.get_mut(&commit.buyer_id) {
            buyer.balance -= commit.price;
        }
        if let Some(seller) = state.users.get_mut(&commit.seller_id) {
            seller.balance += commit.price;
        }
        if let Some(item) = state.items.get_mut(&commit.item_id) {
            item.owner_id = commit.buyer_id;
            item.status = ItemStatus::Withdrawn;
            item.price = Decimal::ZERO;
        }
        state.history.push(HistoryRecord {
            id: Uuid::new_v4(),
            seller_id: commit.seller_id,
            image_url: commit.image_url,
            price: commit.price,
            buyer_name: commit.buyer_name,
            date_sold: commit.date_sold,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    #[actix_web::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        let email = Email::new("dup@example.com").expect("valid email");
        let hash = PasswordHash::new("h").expect("non-empty");
        UserStore::create(&store, email.clone(), hash.clone())
            .await
            .expect("first create succeeds");
        let err = UserStore::create(&store, email.clone(), hash)
            .await
            .expect_err("duplicate rejected");
        assert_eq!(err, UserStoreError::email_taken(email.as_str()));
    }

    #[rstest]
    #[actix_web::test]
    async fn seeded_item_is_immediately_queryable() {
        let store = MemoryStore::new();
        let owner = store.register_fixture_user("owner@example.com");
        let item = store
            .seed_item(
                owner,
                "https://img.example/seeded.png",
                ItemStatus::Listed,
                Decimal::from(30),
            )
            .expect("seed item");

        let found = store
            .find_listed(item)
            .await
            .expect("lookup succeeds")
            .expect("seeded item present");
        assert_eq!(found.owner_id, owner);
        assert_eq!(found.price, Decimal::from(30));
    }

    #[rstest]
    #[actix_web::test]
    async fn commit_rejects_stale_price() {
        let store = MemoryStore::new();
        let seller = store.register_fixture_user("seller@example.com");
        let buyer = store.register_fixture_user("buyer@example.com");
        let item = store
            .seed_item(
                seller,
                "https://img.example/x.png",
                ItemStatus::Listed,
                Decimal::from(100),
            )
            .expect("seed item");

        // Seller relists at a different price after the coordinator's read.
        store
            .set_listed(item, seller, Decimal::from(250))
            .await
            .expect("relist succeeds");

        let err = store
            .commit(PurchaseCommit {
                item_id: item,
                seller_id: seller,
                buyer_id: buyer,
                buyer_name: "buyer@example.com".to_owned(),
                image_url: ImageUrl::new("https://img.example/x.png").expect("valid url"),
                price: Decimal::from(100),
                date_sold: Utc::now(),
            })
            .await
            .expect_err("stale price loses");
        assert_eq!(err, PurchaseStoreError::Conflict);

        // Balances untouched.
        assert_eq!(
            store.balance_of(buyer).await.expect("query"),
            Some(starting_balance())
        );
    }
}
