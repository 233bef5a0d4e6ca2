//! PostgreSQL-backed [`PurchaseStore`] implementation using Diesel.
//!
//! The whole settlement runs in one transaction:
//!
//! 1. Lock both account rows with `SELECT ... FOR UPDATE`. A single query
//!    ordered by id locks them in ascending order, so two settlements touching
//!    the same pair can never deadlock.
//! 2. Re-check the buyer's funds under the lock.
//! 3. Transfer the item with a guarded `UPDATE` whose predicate re-checks
//!    status, owner, and price. Zero affected rows means a racing request
//!    already settled the item, and the transaction rolls back.
//! 4. Write both balances as absolute values computed under the locks, then
//!    append the history record.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::ports::{PurchaseCommit, PurchaseStore, PurchaseStoreError};
use crate::domain::wallet::ItemStatus;

use super::diesel_errors::classify_diesel_error;
use super::models::{from_numeric, to_numeric, NewHistoryRecordRow};
use super::pool::{DbPool, PoolError};
use super::schema::{history_records, users, wallet_items};

/// Diesel-backed implementation of the [`PurchaseStore`] port.
#[derive(Clone)]
pub struct DieselPurchaseStore {
    pool: DbPool,
}

impl DieselPurchaseStore {
    /// Create a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PurchaseStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            PurchaseStoreError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> PurchaseStoreError {
    classify_diesel_error(error).lift(
        |message| PurchaseStoreError::Connection { message },
        |message| PurchaseStoreError::Query { message },
    )
}

/// Transaction-internal error: Diesel failures roll back through `Db`, the
/// settlement checks roll back through `Settlement`.
#[derive(Debug)]
enum CommitError {
    Db(diesel::result::Error),
    Settlement(PurchaseStoreError),
}

impl From<diesel::result::Error> for CommitError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Db(error)
    }
}

fn settlement(error: PurchaseStoreError) -> CommitError {
    CommitError::Settlement(error)
}

#[async_trait]
impl PurchaseStore for DieselPurchaseStore {
    async fn commit(&self, commit: PurchaseCommit) -> Result<(), PurchaseStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let price_db =
            to_numeric(commit.price).map_err(|err| PurchaseStoreError::query(err.to_string()))?;
        let zero_db =
            to_numeric(Decimal::ZERO).map_err(|err| PurchaseStoreError::query(err.to_string()))?;

        let result: Result<(), CommitError> = conn
            .transaction(|conn| {
                let commit = &commit;
                let price_db = price_db.clone();
                let zero_db = zero_db.clone();
                async move {
                    let buyer_uuid = *commit.buyer_id.as_uuid();
                    let seller_uuid = *commit.seller_id.as_uuid();

                    // One ordered query locks both rows, ascending by id.
                    let locked: Vec<(Uuid, bigdecimal::BigDecimal)> = users::table
                        .filter(users::id.eq_any([buyer_uuid, seller_uuid]))
                        .order(users::id.asc())
                        .select((users::id, users::balance))
                        .for_update()
                        .load(conn)
                        .await?;

                    let buyer_balance = locked
                        .iter()
                        .find(|(id, _)| *id == buyer_uuid)
                        .map(|(_, balance)| from_numeric(balance))
                        .transpose()
                        .map_err(|err| {
                            settlement(PurchaseStoreError::query(err.to_string()))
                        })?
                        .ok_or_else(|| {
                            settlement(PurchaseStoreError::query("buyer account missing"))
                        })?;
                    let seller_balance = locked
                        .iter()
                        .find(|(id, _)| *id == seller_uuid)
                        .map(|(_, balance)| from_numeric(balance))
                        .transpose()
                        .map_err(|err| {
                            settlement(PurchaseStoreError::query(err.to_string()))
                        })?
                        .ok_or_else(|| settlement(PurchaseStoreError::SellerMissing))?;

                    if buyer_balance < commit.price {
                        return Err(settlement(PurchaseStoreError::InsufficientFunds));
                    }

                    // Guarded transfer: the predicate re-checks everything the
                    // coordinator observed before the commit.
                    let transferred = diesel::update(
                        wallet_items::table.filter(
                            wallet_items::id
                                .eq(commit.item_id.as_uuid())
                                .and(wallet_items::owner_id.eq(seller_uuid))
                                .and(wallet_items::status.eq(ItemStatus::Listed.as_str()))
                                .and(wallet_items::price.eq(&price_db)),
                        ),
                    )
                    .set((
                        wallet_items::owner_id.eq(buyer_uuid),
                        wallet_items::status.eq(ItemStatus::Withdrawn.as_str()),
                        wallet_items::price.eq(&zero_db),
                    ))
                    .execute(conn)
                    .await?;

                    if transferred == 0 {
                        return Err(settlement(PurchaseStoreError::Conflict));
                    }

                    let buyer_after = to_numeric(buyer_balance - commit.price)
                        .map_err(|err| settlement(PurchaseStoreError::query(err.to_string())))?;
                    let seller_after = to_numeric(seller_balance + commit.price)
                        .map_err(|err| settlement(PurchaseStoreError::query(err.to_string())))?;

                    diesel::update(users::table.filter(users::id.eq(buyer_uuid)))
                        .set(users::balance.eq(buyer_after))
                        .execute(conn)
                        .await?;
                    diesel::update(users::table.filter(users::id.eq(seller_uuid)))
                        .set(users::balance.eq(seller_after))
                        .execute(conn)
                        .await?;

                    let history_row = NewHistoryRecordRow {
                        id: Uuid::new_v4(),
                        seller_id: seller_uuid,
                        image_url: commit.image_url.as_str(),
                        price: price_db,
                        buyer_name: &commit.buyer_name,
                        date_sold: commit.date_sold,
                    };
                    diesel::insert_into(history_records::table)
                        .values(&history_row)
                        .execute(conn)
                        .await?;

                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        result.map_err(|err| match err {
            CommitError::Db(error) => map_diesel_error(error),
            CommitError::Settlement(error) => error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, PurchaseStoreError::Connection { .. }));
    }

    #[rstest]
    fn diesel_error_rolls_up_as_query_error() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, PurchaseStoreError::Query { .. }));
    }

    #[rstest]
    fn settlement_errors_pass_through_unchanged() {
        let wrapped = settlement(PurchaseStoreError::Conflict);
        assert!(matches!(
            wrapped,
            CommitError::Settlement(PurchaseStoreError::Conflict)
        ));
    }
}
