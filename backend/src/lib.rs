//! RenderMart backend library modules.
//!
//! Hexagonal layout: `domain` holds the models, services, and ports;
//! `inbound` exposes the REST surface; `outbound` implements the ports
//! against PostgreSQL and the in-memory fixture; `server` wires it together.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::Trace;
