//! Business logic services.
//!
//! Each service borrows the repositories it needs for one request and runs
//! the same pipeline: look up the target, authorize the actor, plan the
//! change, persist it.
//!
//! # Services
//!
//! - `auth` - Signup, admin account creation, password login
//! - `catalog` - FAQ categories
//! - `faqs` - Global and store FAQs and their translations
//! - `session` - Session tokens and the gate resolving them
//! - `stores` - Store profiles

pub mod auth;
pub mod catalog;
pub mod faqs;
pub mod session;
pub mod stores;

pub use auth::AuthService;
pub use catalog::CategoryService;
pub use faqs::{FaqAddress, FaqService, FaqUpdate};
pub use session::{SessionGate, TokenService};
pub use stores::StoreService;
