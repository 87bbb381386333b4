//! Admin user-management routes
//!
//! Every route here sits behind the access guard plus an explicit
//! admin-only role set.

use serde::Deserialize;
use warp::{Filter, Rejection, Reply};

use crate::auth::token::Claims;
use crate::auth::user::UserRole;
use crate::handlers::auth::require_role;
use crate::handlers::{json_body, with_ctx, AppContext};

/// Role set declared for every /api/users route
const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub nombre: Option<String>,
    pub email: Option<String>,
}

/// All /api/users routes
pub fn routes(ctx: AppContext) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let get_all = warp::path!("api" / "users" / "getAllUsers")
        .and(warp::get())
        .and(require_role(ctx.access_tokens.clone(), ADMIN_ONLY))
        .and(with_ctx(ctx.clone()))
        .and_then(handle_get_all);

    let register_user = warp::path!("api" / "users" / "registerUser")
        .and(warp::post())
        .and(require_role(ctx.access_tokens.clone(), ADMIN_ONLY))
        .and(json_body())
        .and(with_ctx(ctx.clone()))
        .and_then(handle_create);

    let delete_user = warp::path!("api" / "users" / "deleteUser" / i64)
        .and(warp::delete())
        .and(require_role(ctx.access_tokens.clone(), ADMIN_ONLY))
        .and(with_ctx(ctx.clone()))
        .and_then(handle_delete);

    get_all.or(register_user).or(delete_user)
}

async fn handle_get_all(
    _claims: Claims,
    ctx: AppContext,
) -> std::result::Result<impl Reply, Rejection> {
    let users = ctx
        .users
        .get_all_users()
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&users))
}

async fn handle_create(
    _claims: Claims,
    req: CreateUserRequest,
    ctx: AppContext,
) -> std::result::Result<impl Reply, Rejection> {
    let response = ctx
        .users
        .create_user(req.nombre, req.email)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&response))
}

async fn handle_delete(
    id: i64,
    _claims: Claims,
    ctx: AppContext,
) -> std::result::Result<impl Reply, Rejection> {
    let response = ctx
        .users
        .delete_user(id)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&response))
}
