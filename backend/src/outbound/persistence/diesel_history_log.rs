//! PostgreSQL-backed [`HistoryLog`] implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::history::{HistoryRecord, NewHistoryRecord};
use crate::domain::ports::{HistoryLog, HistoryLogError};
use crate::domain::user::UserId;
use crate::domain::wallet::ImageUrl;

use super::diesel_errors::classify_diesel_error;
use super::models::{from_numeric, to_numeric, HistoryRecordRow, NewHistoryRecordRow};
use super::pool::{DbPool, PoolError};
use super::schema::history_records;

/// Diesel-backed implementation of the [`HistoryLog`] port.
#[derive(Clone)]
pub struct DieselHistoryLog {
    pool: DbPool,
}

impl DieselHistoryLog {
    /// Create a new log with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> HistoryLogError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            HistoryLogError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> HistoryLogError {
    classify_diesel_error(error).lift(
        |message| HistoryLogError::Connection { message },
        |message| HistoryLogError::Query { message },
    )
}

fn row_to_record(row: HistoryRecordRow) -> Result<HistoryRecord, HistoryLogError> {
    let image_url = ImageUrl::new(row.image_url)
        .map_err(|err| HistoryLogError::query(format!("stored image url invalid: {err}")))?;
    let price = from_numeric(&row.price).map_err(|err| HistoryLogError::query(err.to_string()))?;
    Ok(HistoryRecord {
        id: row.id,
        seller_id: UserId::from_uuid(row.seller_id),
        image_url,
        price,
        buyer_name: row.buyer_name,
        date_sold: row.date_sold,
    })
}

#[async_trait]
impl HistoryLog for DieselHistoryLog {
    async fn append(&self, record: NewHistoryRecord) -> Result<HistoryRecord, HistoryLogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let record = record.into_record(uuid::Uuid::new_v4());
        let new_row = NewHistoryRecordRow {
            id: record.id,
            seller_id: *record.seller_id.as_uuid(),
            image_url: record.image_url.as_str(),
            price: to_numeric(record.price)
                .map_err(|err| HistoryLogError::query(err.to_string()))?,
            buyer_name: &record.buyer_name,
            date_sold: record.date_sold,
        };

        diesel::insert_into(history_records::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(record)
    }

    async fn list_for_user(
        &self,
        seller_id: UserId,
    ) -> Result<Vec<HistoryRecord>, HistoryLogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<HistoryRecordRow> = history_records::table
            .filter(history_records::seller_id.eq(seller_id.as_uuid()))
            .order(history_records::date_sold.desc())
            .select(HistoryRecordRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_record).collect()
    }
}
