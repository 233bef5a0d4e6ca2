//! Registration and login services over the user store and the hashing
//! boundary.

use std::sync::Arc;

use rust_decimal::Decimal;

use super::error::Error;
use super::ports::{PasswordHasher, UserStore, UserStoreError};
use super::user::{Email, UserId, UserProfile};

fn map_user_store_error(error: UserStoreError) -> Error {
    match error {
        UserStoreError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserStoreError::Query { message } => {
            Error::internal(format!("user store error: {message}"))
        }
        UserStoreError::EmailTaken { .. } => {
            Error::invalid_request("Registration error: email already registered")
        }
    }
}

/// Registration, login, and identity lookups.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AuthService {
    /// Create the service with its store and hashing boundary.
    pub fn new(users: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Register a new account with the starting balance.
    pub async fn register(&self, email: &str, password: &str) -> Result<UserProfile, Error> {
        let email = Email::new(email).map_err(|err| Error::invalid_request(err.to_string()))?;
        if password.is_empty() {
            return Err(Error::invalid_request("password must not be empty"));
        }
        let hash = self
            .hasher
            .hash(password)
            .map_err(|err| Error::internal(err.to_string()))?;
        let user = self
            .users
            .create(email, hash)
            .await
            .map_err(map_user_store_error)?;
        Ok(user.profile())
    }

    /// Verify credentials and return the authenticated user's profile.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, Error> {
        let email = Email::new(email).map_err(|err| Error::invalid_request(err.to_string()))?;
        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_store_error)?
            .ok_or_else(|| Error::unauthorized("User not found"))?;
        let matches = self
            .hasher
            .verify(password, user.password_hash())
            .map_err(|err| Error::internal(err.to_string()))?;
        if !matches {
            return Err(Error::unauthorized("Incorrect password"));
        }
        Ok(user.profile())
    }

    /// Profile for an authenticated session's user id.
    pub async fn current_user(&self, id: UserId) -> Result<UserProfile, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_store_error)?
            .map(|user| user.profile())
            .ok_or_else(|| Error::unauthorized("Not authenticated"))
    }

    /// Current balance for an authenticated user.
    pub async fn balance_of(&self, id: UserId) -> Result<Decimal, Error> {
        self.users
            .balance_of(id)
            .await
            .map_err(map_user_store_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::outbound::password::Sha256PasswordHasher;
    use crate::outbound::persistence::MemoryStore;
    use rstest::rstest;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(Sha256PasswordHasher::default()),
        )
    }

    #[rstest]
    #[actix_web::test]
    async fn register_grants_starting_balance() {
        let auth = service();
        let profile = auth
            .register("alice@example.com", "hunter2")
            .await
            .expect("registration succeeds");
        assert_eq!(profile.balance, Decimal::from(500));
        assert_eq!(profile.email.as_str(), "alice@example.com");
    }

    #[rstest]
    #[actix_web::test]
    async fn register_rejects_duplicate_email() {
        let auth = service();
        auth.register("alice@example.com", "hunter2")
            .await
            .expect("first registration succeeds");
        let err = auth
            .register("alice@example.com", "other")
            .await
            .expect_err("duplicate rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case("", "hunter2")]
    #[case("not-an-email", "hunter2")]
    #[case("alice@example.com", "")]
    #[actix_web::test]
    async fn register_rejects_invalid_input(#[case] email: &str, #[case] password: &str) {
        let err = service()
            .register(email, password)
            .await
            .expect_err("invalid input rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[actix_web::test]
    async fn login_round_trips_credentials() {
        let auth = service();
        let registered = auth
            .register("alice@example.com", "hunter2")
            .await
            .expect("registration succeeds");
        let logged_in = auth
            .login("alice@example.com", "hunter2")
            .await
            .expect("login succeeds");
        assert_eq!(logged_in.id, registered.id);
    }

    #[rstest]
    #[actix_web::test]
    async fn login_rejects_wrong_password() {
        let auth = service();
        auth.register("alice@example.com", "hunter2")
            .await
            .expect("registration succeeds");
        let err = auth
            .login("alice@example.com", "wrong")
            .await
            .expect_err("wrong password rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "Incorrect password");
    }

    #[rstest]
    #[actix_web::test]
    async fn login_rejects_unknown_user() {
        let err = service()
            .login("ghost@example.com", "whatever")
            .await
            .expect_err("unknown user rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "User not found");
    }

    #[rstest]
    #[actix_web::test]
    async fn balance_of_unknown_user_is_not_found() {
        let err = service()
            .balance_of(UserId::random())
            .await
            .expect_err("unknown user");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
