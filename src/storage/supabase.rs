//! Hosted datastore adapter
//!
//! Thin client over the hosted PostgREST dialect: every operation is one
//! HTTP call with equality filters in the query string. A single long-lived
//! `reqwest::Client` carries the `apikey`/`Authorization` headers and is safe
//! for concurrent use.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde_json::json;

use crate::auth::user::{NewUser, UserRecord, UserRole};
use crate::config::ServerConfig;
use crate::constants::USER_TABLE;
use crate::error::{AuthError, Result};
use crate::storage::traits::UserStore;

pub struct SupabaseStore {
    client: Client,
    table_url: String,
}

impl SupabaseStore {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let key_value = HeaderValue::from_str(&config.supabase_key).map_err(|_| {
            AuthError::ConfigError("SUPABASE_KEY contains invalid header characters".to_string())
        })?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.supabase_key))
            .map_err(|_| {
                AuthError::ConfigError(
                    "SUPABASE_KEY contains invalid header characters".to_string(),
                )
            })?;
        headers.insert("apikey", key_value);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AuthError::ConfigError(format!("HTTP client setup failed: {}", e)))?;

        let base = config.supabase_url.trim_end_matches('/');
        Ok(Self {
            client,
            table_url: format!("{}/rest/v1/{}", base, USER_TABLE),
        })
    }

    async fn check(&self, response: Response, context: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        log::error!("Datastore {} failed: {} {}", context, status, body);
        Err(AuthError::StoreError(format!(
            "{} returned {}",
            context, status
        )))
    }

    async fn select_one(&self, filter: (&str, String)) -> Result<Option<UserRecord>> {
        let response = self
            .client
            .get(&self.table_url)
            .query(&[filter, ("select", "*".to_string())])
            .send()
            .await
            .map_err(|e| AuthError::StoreError(format!("select request failed: {}", e)))?;

        let response = self.check(response, "select").await?;
        let mut rows: Vec<UserRecord> = response
            .json()
            .await
            .map_err(|e| AuthError::StoreError(format!("select decode failed: {}", e)))?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn patch(&self, filter: (&str, String), body: serde_json::Value) -> Result<()> {
        let response = self
            .client
            .patch(&self.table_url)
            .query(&[filter])
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::StoreError(format!("update request failed: {}", e)))?;

        self.check(response, "update").await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for SupabaseStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.select_one(("email", format!("eq.{}", email))).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>> {
        self.select_one(("id", format!("eq.{}", id))).await
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord> {
        let response = self
            .client
            .post(&self.table_url)
            .header("Prefer", "return=representation")
            .json(&[user])
            .send()
            .await
            .map_err(|e| AuthError::StoreError(format!("insert request failed: {}", e)))?;

        // Unique-violation conflicts should not happen (flows pre-check the
        // email) but a concurrent insert can still race us here
        if response.status() == StatusCode::CONFLICT {
            return Err(AuthError::InvalidInput(
                "El correo ya está registrado".to_string(),
            ));
        }

        let response = self.check(response, "insert").await?;
        let mut rows: Vec<UserRecord> = response
            .json()
            .await
            .map_err(|e| AuthError::StoreError(format!("insert decode failed: {}", e)))?;
        rows.pop()
            .ok_or_else(|| AuthError::StoreError("insert returned no representation".to_string()))
    }

    async fn update_password(&self, email: &str, pass_hash: &str) -> Result<()> {
        self.patch(
            ("email", format!("eq.{}", email)),
            json!({
                "pass_hash": pass_hash,
                "activo": true,
                "actualizado_en": chrono::Utc::now(),
            }),
        )
        .await
    }

    async fn set_refresh_token(&self, user_id: i64, refresh_hash: Option<&str>) -> Result<()> {
        self.patch(
            ("id", format!("eq.{}", user_id)),
            json!({ "refresh_token": refresh_hash }),
        )
        .await
    }

    async fn list_by_role(&self, rol: UserRole) -> Result<Vec<UserRecord>> {
        let response = self
            .client
            .get(&self.table_url)
            .query(&[
                ("rol", format!("eq.{}", rol.as_str())),
                ("select", "*".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::StoreError(format!("select request failed: {}", e)))?;

        let response = self.check(response, "select").await?;
        response
            .json()
            .await
            .map_err(|e| AuthError::StoreError(format!("select decode failed: {}", e)))
    }

    async fn delete(&self, user_id: i64) -> Result<()> {
        let response = self
            .client
            .delete(&self.table_url)
            .query(&[("id", format!("eq.{}", user_id))])
            .send()
            .await
            .map_err(|e| AuthError::StoreError(format!("delete request failed: {}", e)))?;

        self.check(response, "delete").await?;
        Ok(())
    }
}
