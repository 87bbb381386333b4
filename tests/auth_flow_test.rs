//! Integration tests for the authentication flow over the in-memory store

use std::sync::Arc;

use lca_auth::auth::password::hash_secret;
use lca_auth::auth::service::AuthService;
use lca_auth::auth::token::{Claims, TokenManager};
use lca_auth::auth::user::{NewUser, UserRole};
use lca_auth::error::AuthError;
use lca_auth::mail::RecordingMailer;
use lca_auth::storage::{MemoryStore, UserStore};

const ACCESS_SECRET: &str = "integration-access-signing-key-0123456789";
const REFRESH_SECRET: &str = "integration-refresh-signing-key-0123456789";
const FRONT_URL: &str = "http://localhost:5173";

struct TestBackend {
    store: Arc<MemoryStore>,
    mailer: Arc<RecordingMailer>,
    auth: AuthService,
}

fn backend() -> TestBackend {
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(RecordingMailer::new());
    let auth = AuthService::new(
        store.clone(),
        Arc::new(TokenManager::new(ACCESS_SECRET)),
        Arc::new(TokenManager::new(REFRESH_SECRET)),
        mailer.clone(),
        FRONT_URL.to_string(),
    );
    TestBackend {
        store,
        mailer,
        auth,
    }
}

async fn seed_user(
    store: &MemoryStore,
    email: &str,
    password: &str,
    rol: UserRole,
    activo: bool,
) -> i64 {
    store
        .insert(NewUser {
            nombre: "Prueba".to_string(),
            email: email.to_string(),
            pass_hash: hash_secret(password).unwrap(),
            rol,
            activo,
        })
        .await
        .unwrap()
        .id
}

fn extract_query_token(html: &str) -> String {
    let start = html.find("token=").expect("mail body carries a token") + "token=".len();
    let rest = &html[start..];
    let end = rest.find('"').expect("token ends at the href quote");
    rest[..end].to_string()
}

#[tokio::test]
async fn login_returns_tokens_and_sanitized_user() {
    let backend = backend();
    let id = seed_user(
        &backend.store,
        "ana@example.com",
        "clave-segura",
        UserRole::Usuario,
        true,
    )
    .await;

    let response = backend
        .auth
        .login("ana@example.com", "clave-segura")
        .await
        .unwrap();

    assert_eq!(response.message, "Inicio de sesión exitoso");
    assert!(!response.must_change_password);
    assert!(response.access_token.is_some());
    assert!(response.refresh_token.is_some());
    assert_eq!(response.user.id, id);

    // The hash field never reaches the client
    let json = serde_json::to_value(&response).unwrap();
    assert!(json["user"].get("pass_hash").is_none());
    assert!(json["user"].get("refresh_token").is_none());

    // A refresh-token hash got persisted
    let stored = backend.store.find_by_id(id).await.unwrap().unwrap();
    assert!(stored.refresh_token.is_some());
}

#[tokio::test]
async fn login_access_token_carries_identity() {
    let backend = backend();
    let id = seed_user(
        &backend.store,
        "ana@example.com",
        "clave-segura",
        UserRole::Admin,
        true,
    )
    .await;

    let response = backend
        .auth
        .login("ana@example.com", "clave-segura")
        .await
        .unwrap();

    let manager = TokenManager::new(ACCESS_SECRET);
    let claims: Claims = manager.verify(&response.access_token.unwrap()).unwrap();
    assert_eq!(claims.sub, id);
    assert_eq!(claims.email, "ana@example.com");
    assert_eq!(claims.rol, UserRole::Admin);
}

#[tokio::test]
async fn login_inactive_account_issues_no_tokens() {
    let backend = backend();
    let id = seed_user(
        &backend.store,
        "invitado@example.com",
        "temporal123",
        UserRole::Usuario,
        false,
    )
    .await;

    let response = backend
        .auth
        .login("invitado@example.com", "temporal123")
        .await
        .unwrap();

    assert!(response.must_change_password);
    assert_eq!(response.message, "Debe cambiar su contraseña temporal.");
    assert!(response.access_token.is_none());
    assert!(response.refresh_token.is_none());

    let stored = backend.store.find_by_id(id).await.unwrap().unwrap();
    assert!(stored.refresh_token.is_none());
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let backend = backend();
    seed_user(
        &backend.store,
        "ana@example.com",
        "clave-segura",
        UserRole::Usuario,
        true,
    )
    .await;

    let wrong_password = backend
        .auth
        .login("ana@example.com", "clave-mala")
        .await
        .unwrap_err();
    let unknown_email = backend
        .auth
        .login("nadie@example.com", "clave-segura")
        .await
        .unwrap_err();

    // No user-enumeration signal: both failures are indistinguishable
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(
        wrong_password,
        AuthError::Unauthenticated("Credenciales inválidas".to_string())
    );
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let backend = backend();
    seed_user(
        &backend.store,
        "ana@example.com",
        "clave-segura",
        UserRole::Usuario,
        true,
    )
    .await;

    let result = backend
        .auth
        .register_user(lca_auth::auth::service::RegisterFields {
            nombre: Some("Ana Dos".to_string()),
            email: Some("ana@example.com".to_string()),
            password: Some("otra-clave".to_string()),
            rol: Some("usuario".to_string()),
        })
        .await;

    assert_eq!(
        result.unwrap_err(),
        AuthError::InvalidInput("El correo ya está registrado".to_string())
    );
    // No second record was created
    let users = backend.store.list_by_role(UserRole::Usuario).await.unwrap();
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn register_requires_all_fields() {
    let backend = backend();

    let result = backend
        .auth
        .register_user(lca_auth::auth::service::RegisterFields {
            nombre: Some("Ana".to_string()),
            email: Some("ana@example.com".to_string()),
            password: None,
            rol: Some("usuario".to_string()),
        })
        .await;

    assert_eq!(
        result.unwrap_err(),
        AuthError::InvalidInput("Faltan campos obligatorios".to_string())
    );
}

#[tokio::test]
async fn register_rejects_unknown_role() {
    let backend = backend();

    let result = backend
        .auth
        .register_user(lca_auth::auth::service::RegisterFields {
            nombre: Some("Ana".to_string()),
            email: Some("ana@example.com".to_string()),
            password: Some("clave-segura".to_string()),
            rol: Some("root".to_string()),
        })
        .await;

    assert!(matches!(result.unwrap_err(), AuthError::InvalidInput(_)));
}

#[tokio::test]
async fn refresh_rotates_and_invalidates_old_token() {
    let backend = backend();
    let id = seed_user(
        &backend.store,
        "ana@example.com",
        "clave-segura",
        UserRole::Usuario,
        true,
    )
    .await;

    let login = backend
        .auth
        .login("ana@example.com", "clave-segura")
        .await
        .unwrap();
    let first_refresh = login.refresh_token.unwrap();

    let pair = backend.auth.refresh(id, &first_refresh).await.unwrap();
    assert_ne!(pair.refresh_token, first_refresh);

    // Single-use rotation: the old token no longer matches the stored hash
    let replay = backend.auth.refresh(id, &first_refresh).await;
    assert_eq!(
        replay.unwrap_err(),
        AuthError::Forbidden("Refresh token inválido".to_string())
    );

    // The rotated token keeps working
    backend.auth.refresh(id, &pair.refresh_token).await.unwrap();
}

#[tokio::test]
async fn refresh_mismatch_persists_nothing() {
    let backend = backend();
    let id = seed_user(
        &backend.store,
        "ana@example.com",
        "clave-segura",
        UserRole::Usuario,
        true,
    )
    .await;

    backend
        .auth
        .login("ana@example.com", "clave-segura")
        .await
        .unwrap();
    let before = backend
        .store
        .find_by_id(id)
        .await
        .unwrap()
        .unwrap()
        .refresh_token;

    let result = backend.auth.refresh(id, "token-ajeno").await;
    assert_eq!(
        result.unwrap_err(),
        AuthError::Forbidden("Refresh token inválido".to_string())
    );

    let after = backend
        .store
        .find_by_id(id)
        .await
        .unwrap()
        .unwrap()
        .refresh_token;
    assert_eq!(before, after);
}

#[tokio::test]
async fn refresh_without_registered_token_is_forbidden() {
    let backend = backend();
    let id = seed_user(
        &backend.store,
        "ana@example.com",
        "clave-segura",
        UserRole::Usuario,
        true,
    )
    .await;

    let never_logged_in = backend.auth.refresh(id, "cualquiera").await;
    assert_eq!(
        never_logged_in.unwrap_err(),
        AuthError::Forbidden("Refresh token no registrado".to_string())
    );

    let unknown_user = backend.auth.refresh(9999, "cualquiera").await;
    assert_eq!(
        unknown_user.unwrap_err(),
        AuthError::Forbidden("Refresh token no registrado".to_string())
    );
}

#[tokio::test]
async fn logout_clears_refresh_token_and_is_idempotent() {
    let backend = backend();
    let id = seed_user(
        &backend.store,
        "ana@example.com",
        "clave-segura",
        UserRole::Usuario,
        true,
    )
    .await;

    let login = backend
        .auth
        .login("ana@example.com", "clave-segura")
        .await
        .unwrap();
    let refresh_token = login.refresh_token.unwrap();

    backend.auth.logout(id).await.unwrap();
    let stored = backend.store.find_by_id(id).await.unwrap().unwrap();
    assert!(stored.refresh_token.is_none());

    // The cleared token can no longer be exchanged
    let result = backend.auth.refresh(id, &refresh_token).await;
    assert_eq!(
        result.unwrap_err(),
        AuthError::Forbidden("Refresh token no registrado".to_string())
    );

    // Logging out again still succeeds
    backend.auth.logout(id).await.unwrap();
}

#[tokio::test]
async fn change_password_verifies_current_and_reactivates() {
    let backend = backend();
    seed_user(
        &backend.store,
        "invitado@example.com",
        "temporal123",
        UserRole::Usuario,
        false,
    )
    .await;

    let wrong = backend
        .auth
        .change_password("invitado@example.com", "temporal-mala", "clave-nueva")
        .await;
    assert_eq!(
        wrong.unwrap_err(),
        AuthError::InvalidInput("Contraseña actual incorrecta".to_string())
    );

    backend
        .auth
        .change_password("invitado@example.com", "temporal123", "clave-nueva")
        .await
        .unwrap();

    // Changing the temporary password unlocks normal login
    let login = backend
        .auth
        .login("invitado@example.com", "clave-nueva")
        .await
        .unwrap();
    assert!(!login.must_change_password);
    assert!(login.access_token.is_some());

    // And the old password stops working
    let old = backend.auth.login("invitado@example.com", "temporal123").await;
    assert!(old.is_err());
}

#[tokio::test]
async fn reset_link_round_trip() {
    let backend = backend();
    seed_user(
        &backend.store,
        "ana@example.com",
        "clave-vieja",
        UserRole::Usuario,
        true,
    )
    .await;

    backend
        .auth
        .send_reset_link("ana@example.com")
        .await
        .unwrap();

    let sent = backend.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ana@example.com");
    assert_eq!(sent[0].subject, "Restablecer contraseña");
    assert!(sent[0]
        .html_body
        .contains(&format!("{}/reset-password?token=", FRONT_URL)));

    let token = extract_query_token(&sent[0].html_body);
    backend
        .auth
        .reset_password(&token, "clave-nueva")
        .await
        .unwrap();

    backend
        .auth
        .login("ana@example.com", "clave-nueva")
        .await
        .unwrap();
    let old = backend.auth.login("ana@example.com", "clave-vieja").await;
    assert!(old.is_err());
}

#[tokio::test]
async fn reset_with_tampered_token_is_invalid_input() {
    let backend = backend();
    seed_user(
        &backend.store,
        "ana@example.com",
        "clave-vieja",
        UserRole::Usuario,
        true,
    )
    .await;

    let result = backend
        .auth
        .reset_password("no.es.un.token", "clave-nueva")
        .await;
    assert_eq!(
        result.unwrap_err(),
        AuthError::InvalidInput("Token inválido o expirado".to_string())
    );

    // A token signed with another secret fails the same way
    let foreign = TokenManager::new("another-signing-key-for-forged-tokens")
        .sign(&lca_auth::auth::token::ResetClaims::new("ana@example.com"))
        .unwrap();
    let result = backend.auth.reset_password(&foreign, "clave-nueva").await;
    assert_eq!(
        result.unwrap_err(),
        AuthError::InvalidInput("Token inválido o expirado".to_string())
    );
}

#[tokio::test]
async fn forgot_password_for_unknown_email_sends_nothing() {
    let backend = backend();

    let result = backend.auth.send_reset_link("nadie@example.com").await;
    assert_eq!(
        result.unwrap_err(),
        AuthError::InvalidInput("El correo no está registrado".to_string())
    );
    assert!(backend.mailer.sent().await.is_empty());
}
