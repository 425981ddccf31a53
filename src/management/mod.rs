//! HTTP surface: server assembly, routes, middleware and handlers.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod validation;

pub use server::{AppState, HttpServer};
