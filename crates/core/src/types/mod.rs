//! Value types shared by the domain model.
//!
//! This module provides type-safe wrappers for identifiers, emails, roles,
//! and languages.

pub mod email;
pub mod id;
pub mod language;
pub mod password;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use language::Language;
pub use password::check_password;
pub use role::Role;
