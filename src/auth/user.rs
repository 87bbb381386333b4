use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

/// Account roles. The admin frontend only ever creates `Usuario` accounts;
/// `Admin` accounts are provisioned out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Usuario,
}

impl UserRole {
    /// Wire/database representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Usuario => "usuario",
        }
    }

    /// Parse a role from its wire representation
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "admin" => Ok(UserRole::Admin),
            "usuario" => Ok(UserRole::Usuario),
            other => Err(AuthError::InvalidInput(format!(
                "Rol desconocido: {}",
                other
            ))),
        }
    }
}

/// Full user record as stored in the `usuario` collection.
///
/// `pass_hash` and `refresh_token` are credential material and must never
/// leave the backend; responses carry [`PublicUser`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub pass_hash: String,
    pub rol: UserRole,
    pub activo: bool,
    /// Hash of the last issued refresh token; `None` until a successful
    /// login/refresh, cleared again on logout
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub actualizado_en: Option<chrono::DateTime<chrono::Utc>>,
}

impl UserRecord {
    /// Strip credential material for client-facing responses
    pub fn sanitized(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            nombre: self.nombre.clone(),
            email: self.email.clone(),
            rol: self.rol,
            activo: self.activo,
        }
    }
}

/// Sanitized projection of a user record, safe to return to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub rol: UserRole,
    pub activo: bool,
}

/// Fields for inserting a new user record
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub nombre: String,
    pub email: String,
    pub pass_hash: String,
    pub rol: UserRole,
    pub activo: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::parse("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::parse("usuario").unwrap(), UserRole::Usuario);
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert!(UserRole::parse("root").is_err());
    }

    #[test]
    fn test_sanitized_strips_credentials() {
        let record = UserRecord {
            id: 7,
            nombre: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            pass_hash: "$argon2id$...".to_string(),
            rol: UserRole::Usuario,
            activo: true,
            refresh_token: Some("hash".to_string()),
            actualizado_en: None,
        };

        let public = record.sanitized();
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("pass_hash").is_none());
        assert!(json.get("refresh_token").is_none());
        assert_eq!(json["email"], "ana@example.com");
    }
}
