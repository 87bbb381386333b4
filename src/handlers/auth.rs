//! Authentication routes and request guards
//!
//! The access guard is a filter: it pulls the bearer token out of the
//! Authorization header, verifies it against the access secret and hands the
//! decoded claims to the handler. The role guard composes on top and checks
//! membership in an explicit per-route role set.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

use crate::auth::token::{extract_bearer_token, Claims, TokenManager};
use crate::auth::user::UserRole;
use crate::error::AuthError;
use crate::handlers::{json_body, with_ctx, AppContext};

const MISSING_TOKEN: &str = "No se ha proporcionado un token.";

/// Access guard: require a valid bearer token and extract its claims
pub fn with_identity(
    tokens: Arc<TokenManager>,
) -> impl Filter<Extract = (Claims,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let tokens = tokens.clone();
        async move {
            let header = header.ok_or_else(|| {
                log::debug!("Request without Authorization header");
                warp::reject::custom(AuthError::Unauthenticated(MISSING_TOKEN.to_string()))
            })?;

            let token = extract_bearer_token(&header).ok_or_else(|| {
                log::debug!("Authorization header without bearer token");
                warp::reject::custom(AuthError::Unauthenticated(MISSING_TOKEN.to_string()))
            })?;

            let claims: Claims = tokens.verify(&token).map_err(warp::reject::custom)?;
            Ok::<_, Rejection>(claims)
        }
    })
}

/// Role guard: on top of the access guard, allow only identities whose role
/// is in the declared set. An empty set allows any authenticated identity.
pub fn require_role(
    tokens: Arc<TokenManager>,
    required: &'static [UserRole],
) -> impl Filter<Extract = (Claims,), Error = Rejection> + Clone {
    with_identity(tokens).and_then(move |claims: Claims| async move {
        if required.is_empty() || required.contains(&claims.rol) {
            Ok(claims)
        } else {
            let roles: Vec<&str> = required.iter().map(|r| r.as_str()).collect();
            log::warn!(
                "Role check failed for user {}: has {}, requires ({})",
                claims.sub,
                claims.rol.as_str(),
                roles.join(", ")
            );
            Err(warp::reject::custom(AuthError::Forbidden(format!(
                "Acceso denegado: requiere rol ({})",
                roles.join(", ")
            ))))
        }
    })
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub rol: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub email: String,
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub user_id: Option<i64>,
    pub refresh_token: Option<String>,
}

/// Identity attached by the access guard, echoed by the profile route
#[derive(Debug, Serialize)]
struct IdentityUser {
    id: i64,
    email: String,
    rol: UserRole,
}

#[derive(Debug, Serialize)]
struct ProfileResponse {
    message: String,
    user: IdentityUser,
}

/// All /api/auth routes
pub fn routes(ctx: AppContext) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let login = warp::path!("api" / "auth" / "login")
        .and(warp::post())
        .and(json_body())
        .and(with_ctx(ctx.clone()))
        .and_then(handle_login);

    let register = warp::path!("api" / "auth" / "register")
        .and(warp::post())
        .and(json_body())
        .and(with_ctx(ctx.clone()))
        .and_then(handle_register);

    let change_password = warp::path!("api" / "auth" / "changePassword")
        .and(warp::post())
        .and(json_body())
        .and(with_ctx(ctx.clone()))
        .and_then(handle_change_password);

    let forgot_password = warp::path!("api" / "auth" / "forgotPassword")
        .and(warp::post())
        .and(json_body())
        .and(with_ctx(ctx.clone()))
        .and_then(handle_forgot_password);

    let reset_password = warp::path!("api" / "auth" / "resetPassword")
        .and(warp::post())
        .and(json_body())
        .and(with_ctx(ctx.clone()))
        .and_then(handle_reset_password);

    let refresh = warp::path!("api" / "auth" / "refresh")
        .and(warp::post())
        .and(json_body())
        .and(with_ctx(ctx.clone()))
        .and_then(handle_refresh);

    let logout = warp::path!("api" / "auth" / "logout")
        .and(warp::post())
        .and(with_identity(ctx.access_tokens.clone()))
        .and(with_ctx(ctx.clone()))
        .and_then(handle_logout);

    let profile = warp::path!("api" / "auth" / "profile")
        .and(warp::get())
        .and(with_identity(ctx.access_tokens.clone()))
        .and_then(handle_profile);

    login
        .or(register)
        .or(change_password)
        .or(forgot_password)
        .or(reset_password)
        .or(refresh)
        .or(logout)
        .or(profile)
}

async fn handle_login(
    req: LoginRequest,
    ctx: AppContext,
) -> std::result::Result<impl Reply, Rejection> {
    let response = ctx
        .auth
        .login(&req.email, &req.password)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&response))
}

async fn handle_register(
    req: RegisterRequest,
    ctx: AppContext,
) -> std::result::Result<impl Reply, Rejection> {
    let response = ctx
        .auth
        .register_user(crate::auth::service::RegisterFields {
            nombre: req.nombre,
            email: req.email,
            password: req.password,
            rol: req.rol,
        })
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&response))
}

async fn handle_change_password(
    req: ChangePasswordRequest,
    ctx: AppContext,
) -> std::result::Result<impl Reply, Rejection> {
    let response = ctx
        .auth
        .change_password(&req.email, &req.current_password, &req.new_password)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&response))
}

async fn handle_forgot_password(
    req: ForgotPasswordRequest,
    ctx: AppContext,
) -> std::result::Result<impl Reply, Rejection> {
    let response = ctx
        .auth
        .send_reset_link(&req.email)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&response))
}

async fn handle_reset_password(
    req: ResetPasswordRequest,
    ctx: AppContext,
) -> std::result::Result<impl Reply, Rejection> {
    let response = ctx
        .auth
        .reset_password(&req.token, &req.new_password)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&response))
}

async fn handle_refresh(
    req: RefreshRequest,
    ctx: AppContext,
) -> std::result::Result<impl Reply, Rejection> {
    let (user_id, refresh_token) = match (req.user_id, req.refresh_token) {
        (Some(id), Some(token)) if !token.is_empty() => (id, token),
        _ => {
            return Err(warp::reject::custom(AuthError::Forbidden(
                "Datos incompletos".to_string(),
            )))
        }
    };

    let response = ctx
        .auth
        .refresh(user_id, &refresh_token)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&response))
}

async fn handle_logout(
    claims: Claims,
    ctx: AppContext,
) -> std::result::Result<impl Reply, Rejection> {
    let response = ctx
        .auth
        .logout(claims.sub)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&response))
}

async fn handle_profile(claims: Claims) -> std::result::Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&ProfileResponse {
        message: "Token válido".to_string(),
        user: IdentityUser {
            id: claims.sub,
            email: claims.email,
            rol: claims.rol,
        },
    }))
}
