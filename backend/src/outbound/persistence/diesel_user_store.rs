//! PostgreSQL-backed [`UserStore`] implementation using Diesel.
//!
//! A thin adapter: translates between Diesel rows and the domain user
//! aggregate. Duplicate registrations are detected through the unique
//! constraint on `users.email` rather than a racy pre-check.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rust_decimal::Decimal;

use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::user::{starting_balance, Email, PasswordHash, User, UserId};

use super::diesel_errors::{classify_diesel_error, is_unique_violation};
use super::models::{from_numeric, to_numeric, NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the [`UserStore`] port.
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
}

impl DieselUserStore {
    /// Create a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserStoreError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserStoreError {
    classify_diesel_error(error).lift(
        |message| UserStoreError::Connection { message },
        |message| UserStoreError::Query { message },
    )
}

fn row_to_user(row: UserRow) -> Result<User, UserStoreError> {
    let email = Email::new(row.email)
        .map_err(|err| UserStoreError::query(format!("stored email invalid: {err}")))?;
    let hash = PasswordHash::new(row.password_hash)
        .map_err(|err| UserStoreError::query(format!("stored credential invalid: {err}")))?;
    let balance = from_numeric(&row.balance).map_err(|err| UserStoreError::query(err.to_string()))?;
    Ok(User::new(UserId::from_uuid(row.id), email, hash, balance))
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn create(
        &self,
        email: Email,
        password_hash: PasswordHash,
    ) -> Result<User, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let id = UserId::random();
        let balance = starting_balance();
        let new_row = NewUserRow {
            id: *id.as_uuid(),
            email: email.as_str(),
            password_hash: password_hash.as_str(),
            balance: to_numeric(balance).map_err(|err| UserStoreError::query(err.to_string()))?,
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserStoreError::email_taken(email.as_str())
                } else {
                    map_diesel_error(err)
                }
            })?;

        Ok(User::new(id, email, password_hash, balance))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn balance_of(&self, id: UserId) -> Result<Option<Decimal>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let balance: Option<bigdecimal::BigDecimal> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(users::balance)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        balance
            .map(|value| from_numeric(&value).map_err(|err| UserStoreError::query(err.to_string())))
            .transpose()
    }
}
