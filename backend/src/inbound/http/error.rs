//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic: Actix handlers return [`Error`]
//! and this mapping turns it into a status code plus a JSON envelope of the
//! form `{"message": ..., "error": ...}` where `error` is the optional detail
//! string. Internal errors are redacted so adapter internals never leak to
//! clients.

use actix_web::error::JsonPayloadError;
use actix_web::{http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use serde::Serialize;
use tracing::error;

use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

fn body_for(error: &Error) -> HttpResponse {
    let redacted;
    let visible = if matches!(error.code(), ErrorCode::InternalError) {
        redacted = Error::internal("Internal server error");
        &redacted
    } else {
        error
    };
    HttpResponse::build(status_for(error.code())).json(ErrorBody {
        message: visible.message(),
        error: visible.detail(),
    })
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(message = self.message(), detail = ?self.detail(), "internal error surfaced to client");
        }
        body_for(self)
    }
}

/// Map a JSON body failure (malformed payload, missing or mistyped fields)
/// into the standard `{message}` envelope instead of actix's plain-text 400.
pub fn json_payload_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid request body: {err}")).into()
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("Not authenticated"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("own item"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("raced"), StatusCode::CONFLICT)]
    #[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn codes_map_to_statuses(#[case] error: Error, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn internal_detail_is_redacted() {
        let error = Error::internal("pool exploded").with_detail("stack trace here");
        let response = error.error_response();
        let bytes = to_bytes(response.into_body()).await.expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(json["message"], "Internal server error");
        assert!(json.get("error").is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn json_payload_failure_uses_error_envelope() {
        let req = actix_web::test::TestRequest::default().to_http_request();
        let err = json_payload_error(JsonPayloadError::ContentType, &req);
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body()).await.expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        let message = json["message"].as_str().expect("message string");
        assert!(message.starts_with("invalid request body"));
    }

    #[rstest]
    #[actix_web::test]
    async fn client_errors_keep_their_message() {
        let error = Error::invalid_request("Insufficient funds to purchase this item");
        let response = error.error_response();
        let bytes = to_bytes(response.into_body()).await.expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(json["message"], "Insufficient funds to purchase this item");
    }
}
