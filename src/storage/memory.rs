//! In-memory storage implementation for development and testing
//!
//! Keeps the whole user collection in a map behind an async lock. Suitable
//! for development and the integration tests; production uses the hosted
//! datastore adapter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::user::{NewUser, UserRecord, UserRole};
use crate::error::{AuthError, Result};
use crate::storage::traits::UserStore;

pub struct MemoryStore {
    users: Arc<RwLock<HashMap<i64, UserRecord>>>,
    next_id: Arc<RwLock<i64>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(RwLock::new(1)),
        }
    }

    async fn generate_id(&self) -> i64 {
        let mut id = self.next_id.write().await;
        let current = *id;
        *id += 1;
        current
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(AuthError::InvalidInput(
                "El correo ya está registrado".to_string(),
            ));
        }

        let id = self.generate_id().await;
        let record = UserRecord {
            id,
            nombre: user.nombre,
            email: user.email,
            pass_hash: user.pass_hash,
            rol: user.rol,
            activo: user.activo,
            refresh_token: None,
            actualizado_en: None,
        };
        self.users.write().await.insert(id, record.clone());
        Ok(record)
    }

    async fn update_password(&self, email: &str, pass_hash: &str) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.values_mut().find(|u| u.email == email) {
            user.pass_hash = pass_hash.to_string();
            user.activo = true;
            user.actualizado_en = Some(chrono::Utc::now());
        }
        Ok(())
    }

    async fn set_refresh_token(&self, user_id: i64, refresh_hash: Option<&str>) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.get_mut(&user_id) {
            user.refresh_token = refresh_hash.map(|h| h.to_string());
        }
        Ok(())
    }

    async fn list_by_role(&self, rol: UserRole) -> Result<Vec<UserRecord>> {
        let users = self.users.read().await;
        let mut matching: Vec<UserRecord> =
            users.values().filter(|u| u.rol == rol).cloned().collect();
        matching.sort_by_key(|u| u.id);
        Ok(matching)
    }

    async fn delete(&self, user_id: i64) -> Result<()> {
        self.users.write().await.remove(&user_id);
        Ok(())
    }
}
