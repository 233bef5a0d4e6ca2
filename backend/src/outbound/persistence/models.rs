//! Internal Diesel row structs and numeric conversions.
//!
//! These types are implementation details of the persistence layer and are
//! never exposed to the domain. `NUMERIC` columns map through [`BigDecimal`]
//! on the wire; the domain works in [`Decimal`], and the conversions go
//! through the canonical string form because the two libraries share no
//! direct representation.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schema::{history_records, users, wallet_items};

/// Conversion failure between domain and database numeric forms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("numeric conversion failed: {message}")]
pub(crate) struct NumericError {
    message: String,
}

/// Convert a domain amount to the database `NUMERIC` form.
pub(crate) fn to_numeric(value: Decimal) -> Result<BigDecimal, NumericError> {
    BigDecimal::from_str(&value.to_string()).map_err(|err| NumericError {
        message: err.to_string(),
    })
}

/// Convert a database `NUMERIC` value back to a domain amount.
pub(crate) fn from_numeric(value: &BigDecimal) -> Result<Decimal, NumericError> {
    Decimal::from_str(&value.to_string()).map_err(|err| NumericError {
        message: err.to_string(),
    })
}

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub balance: BigDecimal,
    #[expect(dead_code, reason = "schema field read for completeness, unused in mapping")]
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub balance: BigDecimal,
}

/// Row struct for reading from the wallet_items table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = wallet_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WalletItemRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub image_url: String,
    pub status: String,
    pub price: BigDecimal,
}

/// Insertable struct for creating new wallet items.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = wallet_items)]
pub(crate) struct NewWalletItemRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub image_url: &'a str,
    pub status: &'a str,
    pub price: BigDecimal,
}

/// Row struct for reading from the history_records table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = history_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HistoryRecordRow {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub image_url: String,
    pub price: BigDecimal,
    pub buyer_name: String,
    pub date_sold: DateTime<Utc>,
}

/// Insertable struct for appending completed sales.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = history_records)]
pub(crate) struct NewHistoryRecordRow<'a> {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub image_url: &'a str,
    pub price: BigDecimal,
    pub buyer_name: &'a str,
    pub date_sold: DateTime<Utc>,
}
