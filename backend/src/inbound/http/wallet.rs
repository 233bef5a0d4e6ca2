//! Wallet HTTP handlers.
//!
//! ```text
//! GET  /api/wallet
//! POST /api/wallet
//! POST /api/wallet/list
//! POST /api/wallet/withdraw
//! ```
//!
//! All routes require an authenticated session; the acting user is always the
//! session owner, never a request field.

use actix_web::{get, post, web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::domain::ItemId;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request payload for adding an image to the wallet.
#[derive(Debug, Deserialize)]
pub struct AddImageRequest {
    pub image_url: String,
    /// Optional initial status; defaults to withdrawn.
    pub status: Option<String>,
}

/// Request payload for listing an owned image for sale.
#[derive(Debug, Deserialize)]
pub struct ListImageRequest {
    pub image_id: ItemId,
    pub price: Decimal,
}

/// Request payload for withdrawing an owned image from sale.
#[derive(Debug, Deserialize)]
pub struct WithdrawImageRequest {
    pub image_id: ItemId,
}

/// All items owned by the session user.
#[get("/wallet")]
pub async fn wallet(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let items = state.wallet.items_for_user(user_id).await?;
    Ok(HttpResponse::Ok().json(items))
}

/// Add a generated image to the session user's wallet.
#[post("/wallet")]
pub async fn add_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AddImageRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state
        .wallet
        .add_image(user_id, &payload.image_url, payload.status.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Image added to wallet" })))
}

/// List an owned image for sale at a price.
#[post("/wallet/list")]
pub async fn list_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ListImageRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let item = state
        .wallet
        .list_item(user_id, payload.image_id, payload.price)
        .await?;
    tracing::info!(item_id = %item.id, price = %item.price, "item listed for sale");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Card successfully listed for sale.",
        "image_id": item.id,
        "price": item.price,
    })))
}

/// Withdraw an owned image from sale.
#[post("/wallet/withdraw")]
pub async fn withdraw_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<WithdrawImageRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let item = state.wallet.withdraw_item(user_id, payload.image_id).await?;
    tracing::info!(item_id = %item.id, "item withdrawn from sale");
    Ok(HttpResponse::Ok().json(json!({ "message": "Image successfully withdrawn from sale." })))
}
