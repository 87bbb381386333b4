//! Abstract storage interface for the user collection
//!
//! The backend owns no data engine; everything persists in an external
//! row-oriented datastore. This trait is the seam between the flows and the
//! concrete adapter, and lets tests run against an in-memory backend.

use async_trait::async_trait;

use crate::auth::user::{NewUser, UserRecord, UserRole};
use crate::error::Result;

/// User record storage interface
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get a user by email (unique)
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Get a user by id
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>>;

    /// Insert a new user record and return it with its assigned id
    async fn insert(&self, user: NewUser) -> Result<UserRecord>;

    /// Replace the password hash for the account with this email, mark the
    /// account active and stamp the update time
    async fn update_password(&self, email: &str, pass_hash: &str) -> Result<()>;

    /// Persist a new refresh-token hash for a user, or clear it with `None`
    async fn set_refresh_token(&self, user_id: i64, refresh_hash: Option<&str>) -> Result<()>;

    /// List all users holding the given role
    async fn list_by_role(&self, rol: UserRole) -> Result<Vec<UserRecord>>;

    /// Delete a user record by id
    async fn delete(&self, user_id: i64) -> Result<()>;
}
