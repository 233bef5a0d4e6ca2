//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain services and remain testable without I/O.

use crate::domain::{AuthService, HistoryService, MarketplaceService, WalletService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration, login, and identity lookups.
    pub auth: AuthService,
    /// Wallet item use-cases and the marketplace view.
    pub wallet: WalletService,
    /// The purchase transaction coordinator.
    pub marketplace: MarketplaceService,
    /// Sale history reads and appends.
    pub history: HistoryService,
}
