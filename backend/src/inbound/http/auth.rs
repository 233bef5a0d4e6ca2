//! Account and session HTTP handlers.
//!
//! ```text
//! POST /api/register
//! POST /api/login
//! POST /api/logout
//! GET  /api/check-auth
//! GET  /api/user-balance
//! ```

use actix_web::{get, post, web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::UserProfile;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request payload shared by registration and login.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Response payload for a successful login or identity check.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserProfile,
}

/// Register a new account.
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let profile = state.auth.register(&payload.email, &payload.password).await?;
    tracing::info!(user_id = %profile.id, "user registered");
    Ok(HttpResponse::Ok().json(json!({ "message": "User registered successfully" })))
}

/// Authenticate and start a session.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let profile = state.auth.login(&payload.email, &payload.password).await?;
    session.persist_user(profile.id)?;
    tracing::info!(user_id = %profile.id, "user logged in");
    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".to_owned(),
        user: profile,
    }))
}

/// Drop the session, ending authentication.
#[post("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.purge();
    Ok(HttpResponse::Ok().json(json!({ "message": "Logout successful" })))
}

/// Return the authenticated user's profile, or 401.
#[get("/check-auth")]
pub async fn check_auth(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session
        .user_id()?
        .ok_or_else(|| crate::domain::Error::unauthorized("Not authenticated"))?;
    let profile = state.auth.current_user(user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": profile })))
}

/// Response payload for the balance lookup.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: Decimal,
}

/// Return the authenticated user's current balance.
#[get("/user-balance")]
pub async fn user_balance(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let balance = state.auth.balance_of(user_id).await?;
    Ok(HttpResponse::Ok().json(BalanceResponse { balance }))
}
