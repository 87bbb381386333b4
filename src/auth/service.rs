//! Authentication flow
//!
//! Orchestrates the credential store, the password hasher, the token
//! managers and the mailer: login, refresh rotation, logout, registration,
//! password change and the reset-link round trip. Collaborators arrive
//! through the constructor; the service holds no other state.

use serde::Serialize;
use std::sync::Arc;

use crate::auth::password::{hash_secret, verify_secret};
use crate::auth::token::{Claims, ResetClaims, TokenManager};
use crate::auth::user::{NewUser, PublicUser, UserRole};
use crate::error::{AuthError, Result};
use crate::mail::{reset_email_body, Mailer};
use crate::storage::UserStore;

/// Response for a login attempt. On an inactive account the token fields
/// stay empty and `must_change_password` is set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub user: PublicUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub must_change_password: bool,
}

/// Freshly rotated token pair
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Response carrying a sanitized user record
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: String,
    pub user: PublicUser,
}

/// Plain confirmation response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Fields accepted by self-registration
#[derive(Debug, Clone)]
pub struct RegisterFields {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub rol: Option<String>,
}

pub struct AuthService {
    store: Arc<dyn UserStore>,
    access_tokens: Arc<TokenManager>,
    refresh_tokens: Arc<TokenManager>,
    mailer: Arc<dyn Mailer>,
    front_url: String,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        access_tokens: Arc<TokenManager>,
        refresh_tokens: Arc<TokenManager>,
        mailer: Arc<dyn Mailer>,
        front_url: String,
    ) -> Self {
        Self {
            store,
            access_tokens,
            refresh_tokens,
            mailer,
            front_url,
        }
    }

    /// Issue an access/refresh pair for a user and persist the hash of the
    /// refresh token. Overwriting the stored hash invalidates the previous
    /// refresh token.
    async fn issue_token_pair(&self, user: &crate::auth::user::UserRecord) -> Result<TokenPair> {
        let access_token = self.access_tokens.sign(&Claims::access(user))?;
        let refresh_token = self.refresh_tokens.sign(&Claims::refresh(user))?;

        let refresh_hash = hash_secret(&refresh_token)?;
        self.store
            .set_refresh_token(user.id, Some(&refresh_hash))
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Check credentials and issue tokens.
    /// Unknown email and wrong password produce the identical message, so a
    /// caller cannot probe which addresses are registered.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::Unauthenticated("Credenciales inválidas".to_string()))?;

        if !verify_secret(password, &user.pass_hash) {
            log::debug!("Login rejected for {}: password mismatch", email);
            return Err(AuthError::Unauthenticated(
                "Credenciales inválidas".to_string(),
            ));
        }

        // Invited accounts must change the temporary password before any
        // token is issued
        if !user.activo {
            return Ok(LoginResponse {
                message: "Debe cambiar su contraseña temporal.".to_string(),
                user: user.sanitized(),
                access_token: None,
                refresh_token: None,
                must_change_password: true,
            });
        }

        let pair = self.issue_token_pair(&user).await?;
        log::info!("Login successful for user {}", user.id);

        Ok(LoginResponse {
            message: "Inicio de sesión exitoso".to_string(),
            user: user.sanitized(),
            access_token: Some(pair.access_token),
            refresh_token: Some(pair.refresh_token),
            must_change_password: false,
        })
    }

    /// Rotate the token pair. Single-use: the old refresh token stops
    /// matching once the new hash is written.
    pub async fn refresh(&self, user_id: i64, refresh_token: &str) -> Result<TokenPair> {
        let user = self.store.find_by_id(user_id).await?;

        let user = match user {
            Some(u) if u.refresh_token.is_some() => u,
            _ => {
                return Err(AuthError::Forbidden(
                    "Refresh token no registrado".to_string(),
                ))
            }
        };

        let stored_hash = user.refresh_token.as_deref().unwrap_or_default();
        if !verify_secret(refresh_token, stored_hash) {
            log::warn!("Refresh rejected for user {}: hash mismatch", user_id);
            return Err(AuthError::Forbidden("Refresh token inválido".to_string()));
        }

        self.issue_token_pair(&user).await
    }

    /// Clear the stored refresh-token hash. Idempotent.
    pub async fn logout(&self, user_id: i64) -> Result<MessageResponse> {
        self.store.set_refresh_token(user_id, None).await?;
        log::debug!("Refresh token cleared for user {}", user_id);
        Ok(MessageResponse::new("Sesión cerrada correctamente"))
    }

    /// Create an active account from self-registration fields
    pub async fn register_user(&self, fields: RegisterFields) -> Result<UserResponse> {
        let (nombre, email, password, rol) = match (
            fields.nombre.filter(|s| !s.is_empty()),
            fields.email.filter(|s| !s.is_empty()),
            fields.password.filter(|s| !s.is_empty()),
            fields.rol.filter(|s| !s.is_empty()),
        ) {
            (Some(n), Some(e), Some(p), Some(r)) => (n, e, p, r),
            _ => {
                return Err(AuthError::InvalidInput(
                    "Faltan campos obligatorios".to_string(),
                ))
            }
        };

        let rol = UserRole::parse(&rol)?;

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::InvalidInput(
                "El correo ya está registrado".to_string(),
            ));
        }

        let pass_hash = hash_secret(&password)?;
        let record = self
            .store
            .insert(NewUser {
                nombre,
                email,
                pass_hash,
                rol,
                activo: true,
            })
            .await?;

        log::info!("User {} registered", record.id);
        Ok(UserResponse {
            message: "Usuario registrado exitosamente".to_string(),
            user: record.sanitized(),
        })
    }

    /// Verify the current password and persist a new hash. Also reactivates
    /// invited accounts, which unlocks normal login.
    pub async fn change_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<MessageResponse> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::InvalidInput("Usuario no encontrado".to_string()))?;

        if !verify_secret(current_password, &user.pass_hash) {
            return Err(AuthError::InvalidInput(
                "Contraseña actual incorrecta".to_string(),
            ));
        }

        let new_hash = hash_secret(new_password)?;
        self.store.update_password(email, &new_hash).await?;

        log::info!("Password changed for user {}", user.id);
        Ok(MessageResponse::new("Contraseña actualizada correctamente"))
    }

    /// Email a short-lived single-purpose reset link
    pub async fn send_reset_link(&self, email: &str) -> Result<MessageResponse> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::InvalidInput("El correo no está registrado".to_string()))?;

        let token = self.access_tokens.sign(&ResetClaims::new(email))?;
        let reset_url = format!("{}/reset-password?token={}", self.front_url, token);

        self.mailer
            .send(
                email,
                "Restablecer contraseña",
                &reset_email_body(&user.nombre, &reset_url),
            )
            .await?;

        log::info!("Reset link sent to user {}", user.id);
        Ok(MessageResponse::new("Correo enviado correctamente"))
    }

    /// Redeem a reset token and persist the new password.
    /// Every verification failure collapses to the same client message.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<MessageResponse> {
        let claims: ResetClaims = self.access_tokens.verify(token).map_err(|e| {
            log::debug!("Reset token rejected: {}", e);
            AuthError::InvalidInput("Token inválido o expirado".to_string())
        })?;

        let new_hash = hash_secret(new_password)?;
        self.store.update_password(&claims.email, &new_hash).await?;

        log::info!("Password reset completed for {}", claims.email);
        Ok(MessageResponse::new("Contraseña restablecida correctamente"))
    }
}
