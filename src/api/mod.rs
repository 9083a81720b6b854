//! HTTP API
//!
//! JSON endpoints for playing rounds and verifying them afterwards.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{build_app, ApiServer};
