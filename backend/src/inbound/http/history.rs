//! Sale history HTTP handlers.
//!
//! ```text
//! GET  /api/history
//! POST /api/history
//! ```
//!
//! Reads return the session user's sales newest first. The append endpoint
//! exists for externally settled sales; purchases write their own history
//! record inside the settlement transaction.

use actix_web::{get, post, web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request payload for recording a sale.
#[derive(Debug, Deserialize)]
pub struct RecordSaleRequest {
    pub image_url: String,
    pub price: Decimal,
    pub buyer_name: String,
}

/// The session user's completed sales, newest first.
#[get("/history")]
pub async fn history(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let records = state.history.sales_for_user(user_id).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Record a sale for the session user.
#[post("/history")]
pub async fn record_sale(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecordSaleRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state
        .history
        .record_sale(user_id, &payload.image_url, payload.price, &payload.buyer_name)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Sale successfully added to history." })))
}
