//! Admin-gated user management

pub mod service;

pub use service::UserAdminService;
