//! Marketplace HTTP handlers.
//!
//! ```text
//! GET  /api/marketplace
//! POST /api/marketplace/buy
//! ```
//!
//! Browsing is public; buying requires a session.

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::domain::ItemId;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request payload for buying a listed item.
#[derive(Debug, Deserialize)]
pub struct BuyRequest {
    pub image_id: ItemId,
}

/// All currently listed items with their sellers' emails.
#[get("/marketplace")]
pub async fn marketplace(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let listings = state.wallet.marketplace().await?;
    Ok(HttpResponse::Ok().json(listings))
}

/// Buy a listed item on behalf of the session user.
#[post("/marketplace/buy")]
pub async fn buy(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BuyRequest>,
) -> ApiResult<HttpResponse> {
    let buyer_id = session.require_user_id()?;
    let receipt = state.marketplace.purchase(payload.image_id, buyer_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Purchase successful",
        "price": receipt.price,
    })))
}
