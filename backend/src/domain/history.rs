//! Sale history model.
//!
//! History records are append-only: one record per completed sale, never
//! mutated afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;
use super::wallet::ImageUrl;

/// Immutable record of a completed sale, keyed to the seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Record identifier.
    pub id: Uuid,
    /// User whose item was sold.
    pub seller_id: UserId,
    /// Image that changed hands.
    pub image_url: ImageUrl,
    /// Price at the moment of sale.
    pub price: Decimal,
    /// Display label of the buyer (their email).
    pub buyer_name: String,
    /// Moment the sale completed.
    pub date_sold: DateTime<Utc>,
}

/// Draft for a history record before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryRecord {
    /// User whose item was sold.
    pub seller_id: UserId,
    /// Image that changed hands.
    pub image_url: ImageUrl,
    /// Price at the moment of sale.
    pub price: Decimal,
    /// Display label of the buyer (their email).
    pub buyer_name: String,
    /// Moment the sale completed.
    pub date_sold: DateTime<Utc>,
}

impl NewHistoryRecord {
    /// Attach a freshly generated id, producing the stored record.
    #[must_use]
    pub fn into_record(self, id: Uuid) -> HistoryRecord {
        HistoryRecord {
            id,
            seller_id: self.seller_id,
            image_url: self.image_url,
            price: self.price,
            buyer_name: self.buyer_name,
            date_sold: self.date_sold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn draft_promotes_to_record() {
        let draft = NewHistoryRecord {
            seller_id: UserId::random(),
            image_url: ImageUrl::new("https://img.example/1.png").expect("valid url"),
            price: Decimal::from(100),
            buyer_name: "buyer@example.com".to_owned(),
            date_sold: Utc::now(),
        };
        let id = Uuid::new_v4();
        let record = draft.clone().into_record(id);
        assert_eq!(record.id, id);
        assert_eq!(record.seller_id, draft.seller_id);
        assert_eq!(record.price, draft.price);
        assert_eq!(record.buyer_name, draft.buyer_name);
    }

    #[rstest]
    fn record_serializes_snake_case_fields() {
        let record = HistoryRecord {
            id: Uuid::new_v4(),
            seller_id: UserId::random(),
            image_url: ImageUrl::new("https://img.example/1.png").expect("valid url"),
            price: Decimal::from(42),
            buyer_name: "buyer@example.com".to_owned(),
            date_sold: Utc::now(),
        };
        let json = serde_json::to_value(&record).expect("serialize");
        assert!(json.get("date_sold").is_some());
        assert!(json.get("buyer_name").is_some());
        assert!(json.get("image_url").is_some());
    }
}
