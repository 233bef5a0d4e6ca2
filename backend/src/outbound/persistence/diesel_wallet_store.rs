//! PostgreSQL-backed [`WalletStore`] implementation using Diesel.
//!
//! Ownership checks ride along in the SQL predicates: mutations filter on
//! both the item id and the owner, so a zero row count means "not found or
//! not yours" without a separate lookup.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rust_decimal::Decimal;

use crate::domain::ports::{WalletStore, WalletStoreError};
use crate::domain::user::{Email, UserId};
use crate::domain::wallet::{ImageUrl, ItemId, ItemStatus, MarketplaceListing, WalletItem};

use super::diesel_errors::classify_diesel_error;
use super::models::{from_numeric, to_numeric, NewWalletItemRow, WalletItemRow};
use super::pool::{DbPool, PoolError};
use super::schema::{users, wallet_items};

/// Diesel-backed implementation of the [`WalletStore`] port.
#[derive(Clone)]
pub struct DieselWalletStore {
    pool: DbPool,
}

impl DieselWalletStore {
    /// Create a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> WalletStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            WalletStoreError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> WalletStoreError {
    classify_diesel_error(error).lift(
        |message| WalletStoreError::Connection { message },
        |message| WalletStoreError::Query { message },
    )
}

fn row_to_item(row: WalletItemRow) -> Result<WalletItem, WalletStoreError> {
    let image_url = ImageUrl::new(row.image_url)
        .map_err(|err| WalletStoreError::query(format!("stored image url invalid: {err}")))?;
    let status = row
        .status
        .parse::<ItemStatus>()
        .map_err(|err| WalletStoreError::query(format!("stored status invalid: {err}")))?;
    let price = from_numeric(&row.price).map_err(|err| WalletStoreError::query(err.to_string()))?;
    Ok(WalletItem {
        id: ItemId::from_uuid(row.id),
        owner_id: UserId::from_uuid(row.owner_id),
        image_url,
        status,
        price,
    })
}

#[async_trait]
impl WalletStore for DieselWalletStore {
    async fn list_for_user(&self, owner_id: UserId) -> Result<Vec<WalletItem>, WalletStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<WalletItemRow> = wallet_items::table
            .filter(wallet_items::owner_id.eq(owner_id.as_uuid()))
            .select(WalletItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_item).collect()
    }

    async fn create(
        &self,
        owner_id: UserId,
        image_url: ImageUrl,
        status: ItemStatus,
    ) -> Result<WalletItem, WalletStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let item = WalletItem {
            id: ItemId::random(),
            owner_id,
            image_url,
            status,
            price: Decimal::ZERO,
        };
        let new_row = NewWalletItemRow {
            id: *item.id.as_uuid(),
            owner_id: *owner_id.as_uuid(),
            image_url: item.image_url.as_str(),
            status: item.status.as_str(),
            price: to_numeric(item.price)
                .map_err(|err| WalletStoreError::query(err.to_string()))?,
        };

        diesel::insert_into(wallet_items::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(item)
    }

    async fn set_listed(
        &self,
        item_id: ItemId,
        owner_id: UserId,
        price: Decimal,
    ) -> Result<WalletItem, WalletStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let price_db =
            to_numeric(price).map_err(|err| WalletStoreError::query(err.to_string()))?;
        let row: Option<WalletItemRow> = diesel::update(
            wallet_items::table.filter(
                wallet_items::id
                    .eq(item_id.as_uuid())
                    .and(wallet_items::owner_id.eq(owner_id.as_uuid())),
            ),
        )
        .set((
            wallet_items::status.eq(ItemStatus::Listed.as_str()),
            wallet_items::price.eq(price_db),
        ))
        .returning(WalletItemRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map_or(Err(WalletStoreError::NotFound), row_to_item)
    }

    async fn set_withdrawn(
        &self,
        item_id: ItemId,
        owner_id: UserId,
    ) -> Result<WalletItem, WalletStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let zero =
            to_numeric(Decimal::ZERO).map_err(|err| WalletStoreError::query(err.to_string()))?;
        let row: Option<WalletItemRow> = diesel::update(
            wallet_items::table.filter(
                wallet_items::id
                    .eq(item_id.as_uuid())
                    .and(wallet_items::owner_id.eq(owner_id.as_uuid())),
            ),
        )
        .set((
            wallet_items::status.eq(ItemStatus::Withdrawn.as_str()),
            wallet_items::price.eq(zero),
        ))
        .returning(WalletItemRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        row.map_or(Err(WalletStoreError::NotFound), row_to_item)
    }

    async fn find_listed(&self, item_id: ItemId) -> Result<Option<WalletItem>, WalletStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<WalletItemRow> = wallet_items::table
            .filter(
                wallet_items::id
                    .eq(item_id.as_uuid())
                    .and(wallet_items::status.eq(ItemStatus::Listed.as_str())),
            )
            .select(WalletItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_item).transpose()
    }

    async fn list_marketplace(&self) -> Result<Vec<MarketplaceListing>, WalletStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(WalletItemRow, String)> = wallet_items::table
            .inner_join(users::table)
            .filter(wallet_items::status.eq(ItemStatus::Listed.as_str()))
            .select((WalletItemRow::as_select(), users::email))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(row, owner_email)| {
                let item = row_to_item(row)?;
                let owner_email = Email::new(owner_email).map_err(|err| {
                    WalletStoreError::query(format!("stored email invalid: {err}"))
                })?;
                Ok(MarketplaceListing {
                    id: item.id,
                    image_url: item.image_url,
                    price: item.price,
                    status: item.status,
                    owner_email,
                })
            })
            .collect()
    }
}
