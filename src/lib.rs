//! LCA Auth - authentication and user management backend
//!
//! This library provides the flows behind the Beta LCA frontend: login with
//! refresh-token rotation, invite-based user creation, password reset by
//! email, and admin-gated user management, all persisted in an external
//! hosted datastore.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod storage;
pub mod users;

// Re-export main components
pub use config::*;
pub use constants::*;
