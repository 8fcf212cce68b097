//! # OrderSync Gateway
//! Small HTTP surface: instructions page, manual trigger, health check.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
