//! Request handlers and route composition
//!
//! Routes are explicit filter chains; no route metadata lives anywhere but
//! here. Domain errors travel as rejections and get rendered to JSON bodies
//! by [`handle_rejection`].

pub mod auth;
pub mod users;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::auth::service::AuthService;
use crate::auth::token::TokenManager;
use crate::config::ServerConfig;
use crate::constants::MAX_JSON_BODY_BYTES;
use crate::error::AuthError;
use crate::mail::Mailer;
use crate::storage::UserStore;
use crate::users::UserAdminService;

/// Shared handler context: the two flows plus the token manager the access
/// guard verifies against
#[derive(Clone)]
pub struct AppContext {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserAdminService>,
    pub access_tokens: Arc<TokenManager>,
}

impl AppContext {
    /// Explicit composition root: build both flows from their collaborators
    pub fn new(config: &ServerConfig, store: Arc<dyn UserStore>, mailer: Arc<dyn Mailer>) -> Self {
        let access_tokens = Arc::new(TokenManager::new(&config.access_secret));
        let refresh_tokens = Arc::new(TokenManager::new(&config.refresh_secret));

        let auth = Arc::new(AuthService::new(
            store.clone(),
            access_tokens.clone(),
            refresh_tokens,
            mailer.clone(),
            config.front_url.clone(),
        ));
        let users = Arc::new(UserAdminService::new(
            store,
            mailer,
            config.front_url.clone(),
        ));

        Self {
            auth,
            users,
            access_tokens,
        }
    }
}

// Helper function to include the context in a request
pub(crate) fn with_ctx(
    ctx: AppContext,
) -> impl Filter<Extract = (AppContext,), Error = Infallible> + Clone {
    warp::any().map(move || ctx.clone())
}

// Size-limited JSON body extraction
pub(crate) fn json_body<T: DeserializeOwned + Send>(
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_JSON_BODY_BYTES).and(warp::body::json())
}

/// The full route table: auth flows, admin user management and a health
/// probe. CORS and rejection recovery are applied by the caller.
pub fn routes(ctx: AppContext) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let health = warp::path!("health").and(warp::get()).map(|| "OK");

    auth::routes(ctx.clone()).or(users::routes(ctx)).or(health)
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

/// Render rejections as JSON error bodies with the taxonomy's status codes
pub async fn handle_rejection(err: Rejection) -> std::result::Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Recurso no encontrado".to_string())
    } else if let Some(e) = err.find::<AuthError>() {
        if e.status() == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("Request failed: {}", e);
        }
        (e.status(), e.client_message().to_string())
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        (
            StatusCode::BAD_REQUEST,
            "Cuerpo de la solicitud inválido".to_string(),
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "Cuerpo de la solicitud demasiado grande".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Método no permitido".to_string(),
        )
    } else {
        log::error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error interno del servidor".to_string(),
        )
    };

    let body = warp::reply::json(&ErrorBody { message });
    Ok(warp::reply::with_status(body, status))
}
