//! User management flow
//!
//! Admin-only operations over the user collection: listing non-admin
//! accounts, invite-style creation with a temporary password, and deletion
//! restricted to non-admin targets.

use std::sync::Arc;

use crate::auth::password::{generate_temp_password, hash_secret};
use crate::auth::service::{MessageResponse, UserResponse};
use crate::auth::user::{NewUser, PublicUser, UserRole};
use crate::error::{AuthError, Result};
use crate::mail::{invite_email_body, Mailer};
use crate::storage::UserStore;

pub struct UserAdminService {
    store: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    front_url: String,
}

impl UserAdminService {
    pub fn new(store: Arc<dyn UserStore>, mailer: Arc<dyn Mailer>, front_url: String) -> Self {
        Self {
            store,
            mailer,
            front_url,
        }
    }

    /// All accounts with role `usuario`, sanitized
    pub async fn get_all_users(&self) -> Result<Vec<PublicUser>> {
        let users = self.store.list_by_role(UserRole::Usuario).await?;
        Ok(users.iter().map(|u| u.sanitized()).collect())
    }

    /// Invite flow: create an inactive `usuario` account with a random
    /// temporary password and email it to the invitee. The record exists
    /// even if the mail fails; the account stays locked behind the
    /// mandatory password change either way.
    pub async fn create_user(
        &self,
        nombre: Option<String>,
        email: Option<String>,
    ) -> Result<UserResponse> {
        let (nombre, email) = match (
            nombre.filter(|s| !s.is_empty()),
            email.filter(|s| !s.is_empty()),
        ) {
            (Some(n), Some(e)) => (n, e),
            _ => {
                return Err(AuthError::InvalidInput(
                    "Faltan campos obligatorios".to_string(),
                ))
            }
        };

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::InvalidInput(
                "El correo ya está registrado".to_string(),
            ));
        }

        let temp_password = generate_temp_password();
        let pass_hash = hash_secret(&temp_password)?;

        let record = self
            .store
            .insert(NewUser {
                nombre: nombre.clone(),
                email: email.clone(),
                pass_hash,
                rol: UserRole::Usuario,
                activo: false,
            })
            .await?;

        let login_url = format!("{}/login", self.front_url);
        self.mailer
            .send(
                &email,
                "Invitación a Beta LCA",
                &invite_email_body(&nombre, &temp_password, &login_url),
            )
            .await?;

        log::info!("User {} invited", record.id);
        Ok(UserResponse {
            message: "Usuario creado correctamente y correo enviado".to_string(),
            user: record.sanitized(),
        })
    }

    /// Delete a `usuario` account. Admin targets are indistinguishable from
    /// missing records.
    pub async fn delete_user(&self, id: i64) -> Result<MessageResponse> {
        match self.store.find_by_id(id).await? {
            Some(user) if user.rol == UserRole::Usuario => {
                self.store.delete(id).await?;
                log::info!("User {} deleted", id);
                Ok(MessageResponse::new("Usuario eliminado correctamente"))
            }
            _ => Err(AuthError::NotFound(
                "Usuario no encontrado o no autorizado".to_string(),
            )),
        }
    }
}
