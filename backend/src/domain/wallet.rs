//! Wallet item model and its listing lifecycle.
//!
//! A wallet item is an image owned by a user. Its only transitions are
//! `withdrawn ⇄ listed` by the owner and `listed → (withdrawn, new owner)`
//! through a completed purchase.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{Email, UserId};

/// Validation errors for wallet values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletValidationError {
    /// Image URL is empty after trimming whitespace.
    #[error("image_url must not be empty")]
    EmptyImageUrl,
    /// Image URL exceeds the maximum accepted length.
    #[error("image_url must be at most {max} characters")]
    ImageUrlTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Status string is neither `listed` nor `withdrawn`.
    #[error("status must be 'listed' or 'withdrawn'")]
    UnknownStatus,
    /// Listing price must be strictly positive.
    #[error("price must be greater than zero")]
    NonPositivePrice,
}

/// Stable wallet item identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum accepted image URL length.
pub const IMAGE_URL_MAX: usize = 2048;

/// Location of the rendered image, produced by the external generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Validate and construct an [`ImageUrl`].
    pub fn new(raw: impl Into<String>) -> Result<Self, WalletValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(WalletValidationError::EmptyImageUrl);
        }
        if raw.chars().count() > IMAGE_URL_MAX {
            return Err(WalletValidationError::ImageUrlTooLong { max: IMAGE_URL_MAX });
        }
        Ok(Self(raw))
    }

    /// Borrow the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ImageUrl> for String {
    fn from(value: ImageUrl) -> Self {
        value.0
    }
}

impl TryFrom<String> for ImageUrl {
    type Error = WalletValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Listing lifecycle state of a wallet item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Visible in the marketplace at the stored price.
    Listed,
    /// Held in the owner's wallet, not for sale.
    Withdrawn,
}

impl ItemStatus {
    /// Storage representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listed => "listed",
            Self::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = WalletValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "listed" => Ok(Self::Listed),
            "withdrawn" => Ok(Self::Withdrawn),
            _ => Err(WalletValidationError::UnknownStatus),
        }
    }
}

/// Validate a listing price: strictly positive.
pub fn validate_price(price: Decimal) -> Result<Decimal, WalletValidationError> {
    if price <= Decimal::ZERO {
        return Err(WalletValidationError::NonPositivePrice);
    }
    Ok(price)
}

/// An image record owned by a user.
///
/// `price` is meaningful only while `status == Listed`; it resets to zero on
/// withdrawal and on transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletItem {
    /// Stable identifier.
    pub id: ItemId,
    /// Current owner.
    pub owner_id: UserId,
    /// Location of the rendered image.
    pub image_url: ImageUrl,
    /// Listing lifecycle state.
    pub status: ItemStatus,
    /// Asking price while listed; zero otherwise.
    pub price: Decimal,
}

/// Marketplace projection: a listed item joined with its owner's email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceListing {
    /// Item identifier, used by the buy endpoint.
    pub id: ItemId,
    /// Location of the rendered image.
    pub image_url: ImageUrl,
    /// Asking price.
    pub price: Decimal,
    /// Always `listed` in this projection.
    pub status: ItemStatus,
    /// Seller's email shown alongside the listing.
    pub owner_email: Email,
}
