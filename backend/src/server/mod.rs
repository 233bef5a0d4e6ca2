//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use actix_session::{
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
    SessionMiddleware,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};

use crate::inbound::http::auth::{check_auth, login, logout, register, user_balance};
use crate::inbound::http::error::json_payload_error;
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::history::{history, record_sale};
use crate::inbound::http::marketplace::{buy, marketplace};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::wallet::{add_image, list_image, wallet, withdraw_image};
use crate::middleware::Trace;

use state_builders::build_http_state;

/// Session cookies stay valid for a day before a fresh login is required.
const SESSION_TTL: actix_web::cookie::time::Duration =
    actix_web::cookie::time::Duration::hours(24);

/// Dependency bundle consumed by [`build_app`].
#[derive(Clone)]
pub struct AppDependencies {
    /// Shared readiness and liveness state.
    pub health_state: web::Data<HealthState>,
    /// Domain services for the HTTP handlers.
    pub http_state: web::Data<HttpState>,
    /// Session cookie signing key.
    pub key: Key,
    /// Whether session cookies carry the `Secure` flag.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Assemble the Actix application: session middleware, tracing, and every
/// route under the `/api` scope plus the health probes.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(SESSION_TTL))
        .build();

    let api = web::scope("/api")
        .app_data(web::JsonConfig::default().error_handler(json_payload_error))
        .wrap(session)
        .service(register)
        .service(login)
        .service(logout)
        .service(check_auth)
        .service(user_balance)
        .service(wallet)
        .service(add_image)
        .service(list_image)
        .service(withdraw_image)
        .service(marketplace)
        .service(buy)
        .service(history)
        .service(record_sale);

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live)
}

/// Build the HTTP state for `config` without starting a listener.
///
/// Used by integration tests that drive [`build_app`] through
/// `actix_web::test` instead of a bound socket.
#[must_use]
pub fn build_state(config: &ServerConfig) -> web::Data<HttpState> {
    build_http_state(config)
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
