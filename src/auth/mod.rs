//! Authentication and authorization module

pub mod password;
pub mod service;
pub mod token;
pub mod user;

// Re-export main components
pub use service::AuthService;
pub use token::{Claims, TokenManager};
pub use user::{PublicUser, UserRecord, UserRole};
