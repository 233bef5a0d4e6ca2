//! Sale history queries and manual record submission.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use super::error::Error;
use super::history::{HistoryRecord, NewHistoryRecord};
use super::ports::{HistoryLog, HistoryLogError};
use super::user::UserId;
use super::wallet::ImageUrl;

fn map_history_log_error(error: HistoryLogError) -> Error {
    match error {
        HistoryLogError::Connection { message } => {
            Error::service_unavailable(format!("history log unavailable: {message}"))
        }
        HistoryLogError::Query { message } => {
            Error::internal(format!("history log error: {message}"))
        }
    }
}

/// Read and append sale history for the authenticated seller.
#[derive(Clone)]
pub struct HistoryService {
    history: Arc<dyn HistoryLog>,
}

impl HistoryService {
    /// Create the service with its log.
    pub fn new(history: Arc<dyn HistoryLog>) -> Self {
        Self { history }
    }

    /// Sales for this seller, newest first.
    pub async fn sales_for_user(&self, seller_id: UserId) -> Result<Vec<HistoryRecord>, Error> {
        self.history
            .list_for_user(seller_id)
            .await
            .map_err(map_history_log_error)
    }

    /// Record a sale on behalf of the authenticated seller. Besides field
    /// presence there is nothing to validate; the log is append-only.
    pub async fn record_sale(
        &self,
        seller_id: UserId,
        image_url: &str,
        price: Decimal,
        buyer_name: &str,
    ) -> Result<HistoryRecord, Error> {
        let image_url =
            ImageUrl::new(image_url).map_err(|err| Error::invalid_request(err.to_string()))?;
        if buyer_name.trim().is_empty() {
            return Err(Error::invalid_request("buyer_name must not be empty"));
        }
        self.history
            .append(NewHistoryRecord {
                seller_id,
                image_url,
                price,
                buyer_name: buyer_name.to_owned(),
                date_sold: Utc::now(),
            })
            .await
            .map_err(map_history_log_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::outbound::persistence::MemoryStore;
    use rstest::rstest;

    fn fixtures() -> (HistoryService, UserId) {
        let store = Arc::new(MemoryStore::new());
        let seller = store.register_fixture_user("seller@example.com");
        (HistoryService::new(store), seller)
    }

    #[rstest]
    #[actix_web::test]
    async fn recorded_sales_come_back_newest_first() {
        let (service, seller) = fixtures();
        for (url, price) in [("https://img.example/1.png", 10), ("https://img.example/2.png", 20)] {
            service
                .record_sale(seller, url, Decimal::from(price), "buyer@example.com")
                .await
                .expect("record appended");
        }

        let sales = service.sales_for_user(seller).await.expect("sales load");
        assert_eq!(sales.len(), 2);
        assert!(sales[0].date_sold >= sales[1].date_sold);
        assert_eq!(sales[0].image_url.as_str(), "https://img.example/2.png");
    }

    #[rstest]
    #[actix_web::test]
    async fn other_sellers_history_stays_private() {
        let (service, seller) = fixtures();
        service
            .record_sale(
                seller,
                "https://img.example/1.png",
                Decimal::from(10),
                "buyer@example.com",
            )
            .await
            .expect("record appended");

        let other = service
            .sales_for_user(UserId::random())
            .await
            .expect("query succeeds");
        assert!(other.is_empty());
    }

    #[rstest]
    #[actix_web::test]
    async fn blank_buyer_name_is_rejected() {
        let (service, seller) = fixtures();
        let err = service
            .record_sale(seller, "https://img.example/1.png", Decimal::from(10), "  ")
            .await
            .expect_err("blank buyer rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
