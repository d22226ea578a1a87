//! faqdesk API server library.
//!
//! Everything the binary wires together lives here so integration tests can
//! drive the full router against in-memory repositories.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::router;
pub use state::AppState;
