//! Assembly of the HTTP dependency bundle from server configuration.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{HistoryLog, PurchaseStore, UserStore, WalletStore};
use crate::domain::{AuthService, HistoryService, MarketplaceService, WalletService};
use crate::inbound::http::state::HttpState;
use crate::outbound::password::Sha256PasswordHasher;
use crate::outbound::persistence::{
    DieselHistoryLog, DieselPurchaseStore, DieselUserStore, DieselWalletStore, MemoryStore,
};

use super::config::ServerConfig;

/// Build the HTTP state from configuration.
///
/// With a pool, every port gets its Diesel adapter. Without one, a single
/// shared [`MemoryStore`] backs all four ports so the fixture sees one
/// consistent world.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let (users, wallet, history, purchases): (
        Arc<dyn UserStore>,
        Arc<dyn WalletStore>,
        Arc<dyn HistoryLog>,
        Arc<dyn PurchaseStore>,
    ) = match &config.db_pool {
        Some(pool) => (
            Arc::new(DieselUserStore::new(pool.clone())),
            Arc::new(DieselWalletStore::new(pool.clone())),
            Arc::new(DieselHistoryLog::new(pool.clone())),
            Arc::new(DieselPurchaseStore::new(pool.clone())),
        ),
        None => {
            tracing::warn!("no database pool configured; using in-memory store");
            let store = Arc::new(MemoryStore::new());
            (
                store.clone(),
                store.clone(),
                store.clone(),
                store,
            )
        }
    };

    let hasher = Arc::new(Sha256PasswordHasher::new());

    web::Data::new(HttpState {
        auth: AuthService::new(users.clone(), hasher),
        wallet: WalletService::new(wallet.clone()),
        marketplace: MarketplaceService::new(users, wallet, purchases),
        history: HistoryService::new(history),
    })
}
