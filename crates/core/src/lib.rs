//! faqdesk core - domain model and decision logic.
//!
//! This crate holds everything the FAQ backend decides without touching I/O:
//! - `server` - HTTP API, session gate, rate limiter, Postgres repositories
//! - `cli` - Migrations and account bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types, pure functions and traits - no
//! database access, no HTTP. Persistence is expressed as the async traits in
//! [`repository`], implemented by the server crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, roles, languages, password policy
//! - [`models`] - Users, stores, categories, FAQs and translations
//! - [`validation`] - Non-fail-fast field error collection
//! - [`error`] - The [`FaqError`] taxonomy
//! - [`policy`] - Authorization decisions
//! - [`consistency`] - FAQ/translation invariants and write planning
//! - [`repository`] - Persistence contracts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod consistency;
pub mod error;
pub mod models;
pub mod policy;
pub mod repository;
pub mod types;
pub mod validation;

pub use error::{FaqError, FaqResult};
pub use types::*;
pub use validation::FieldErrors;
