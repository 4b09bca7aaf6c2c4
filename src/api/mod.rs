//! REST/JSON surface of the storefront.
//!
//! Every error body is `{"error": <message>}`. Store and internal failures
//! are logged with their detail and answered with a generic message.

mod auth;
mod orders;
mod products;

use std::any::Any;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::auth::{AdminId, SessionAuthority};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::Error;
use crate::orders::OrderService;

/// Services shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub sessions: SessionAuthority,
    pub catalog: Catalog,
    pub orders: OrderService,
}

impl AppState {
    /// State with default session lifetime and order policy.
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            sessions: SessionAuthority::new(conn.clone()),
            catalog: Catalog::new(conn.clone()),
            orders: OrderService::new(conn),
        }
    }

    pub fn from_config(conn: DatabaseConnection, config: &Config) -> Self {
        Self {
            sessions: SessionAuthority::new(conn.clone()).with_ttl(config.session_ttl),
            catalog: Catalog::new(conn.clone()),
            orders: OrderService::new(conn).with_policy(config.order_policy),
        }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/products/public", get(products::list_public))
        .route("/api/products", get(products::list_all).post(products::create))
        .route(
            "/api/products/{id}",
            put(products::update).delete(products::delete),
        )
        .route("/api/orders", get(orders::list_all).post(orders::place))
        .route("/api/orders/{id}/items", get(orders::items))
        .route("/api/orders/{id}/status", put(orders::update_status))
        .fallback(not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "message": "Backend API running" }))
}

async fn not_found() -> ApiError {
    Error::NotFound("Route").into()
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "unhandled error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "Internal server error",
        }),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct Success {
    success: bool,
}

pub(crate) fn success() -> Json<Success> {
    Json(Success { success: true })
}

/// An [`Error`] on its way to the client, plus the message shown in place
/// of internal details.
#[derive(Debug)]
pub struct ApiError {
    error: Error,
    public_message: &'static str,
}

impl ApiError {
    pub fn error(&self) -> &Error {
        &self.error
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self {
            error,
            public_message: "Internal server error",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text()).into()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Error::Validation(rejection.body_text()).into()
    }
}

/// Maps a service error, replacing internal detail with `message`.
pub(crate) fn fail(message: &'static str) -> impl FnOnce(Error) -> ApiError {
    move |error| ApiError {
        error,
        public_message: message,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let message = if self.error.is_internal() {
            error!(error = %self.error, "{}", self.public_message);
            self.public_message.to_owned()
        } else {
            self.error.to_string()
        };
        (status, Json(ErrorBody { error: &message })).into_response()
    }
}

/// `Json` whose rejections render as `{"error": ...}` with status 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Path` whose rejections render as `{"error": ...}` with status 400.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Extracts and validates the bearer token of the current request.
#[derive(Debug, Clone, Copy)]
pub struct Admin(pub AdminId);

impl FromRequestParts<AppState> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(Error::Unauthorized)?;
        let admin = state
            .sessions
            .validate(token)
            .await
            .map_err(fail("Failed to validate session"))?;
        Ok(Admin(admin))
    }
}

/// Token from an `Authorization: Bearer <token>` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
