//! Client-side facade over the storefront API.
//!
//! [`ApiClient`] turns every call into an [`ApiResult`] instead of an error:
//! callers read `data` or `error` and never have to handle a failure type.
//! It speaks to any `tower::Service` carrying HTTP requests, so the same
//! client drives an in-process [`axum::Router`] or a real HTTP connection.
//!
//! The admin session is not global state. [`SessionKeeper`] owns it
//! explicitly, mirrors it into a [`SessionStorage`] under
//! [`SESSION_STORAGE_KEY`], and only restores it while it is unexpired.

use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Mutex;
use std::{fs, io};

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, Response};
use chrono::Utc;
use sea_orm::prelude::Uuid;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower::{Service, ServiceExt};
use tracing::warn;

use crate::auth::AdminSession;
use crate::catalog::ProductInput;
use crate::entity::{order, order_item, product};
use crate::orders::OrderInput;

/// Key under which the current admin session is persisted.
pub const SESSION_STORAGE_KEY: &str = "admin_session";

const MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

/// Outcome of a facade call: exactly one of the fields is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (Some(data), None) => Ok(data),
            (_, Some(error)) => Err(error),
            (None, None) => Err("Request failed".to_owned()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdBody {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct SuccessBody {
    #[allow(dead_code)]
    success: bool,
}

/// Storefront API client over an HTTP `tower::Service`.
///
/// Paths are sent as-is unless a base URL is set. An in-process router
/// needs none; a network client service needs the server's origin.
#[derive(Debug, Clone)]
pub struct ApiClient<S> {
    service: S,
    base_url: String,
}

impl<S> ApiClient<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send,
    S::Error: Display,
    S::Future: Send,
{
    pub fn new(service: S) -> Self {
        Self {
            service,
            base_url: String::new(),
        }
    }

    /// Prefixes every request path with `base_url`, e.g.
    /// `http://localhost:3001`. A trailing slash is ignored.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends one request and decodes the JSON answer.
    ///
    /// Non-success statuses yield the server's `error` message, or
    /// `"Request failed"` when the body carries none. Transport failures
    /// yield `fallback`.
    async fn request<T>(
        &self,
        method: Method,
        path: &str,
        session: Option<&AdminSession>,
        body: Option<serde_json::Value>,
        fallback: &str,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let mut builder = Request::builder()
            .method(method)
            .uri(self.url(path))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(session) = session {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", session.session_token),
            );
        }

        let body = match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        };
        let request = match builder.body(body) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, path, "could not build request");
                return ApiResult::err(fallback);
            }
        };

        let response = match self.service.clone().oneshot(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, path, "transport failure");
                return ApiResult::err(fallback);
            }
        };

        let status = response.status();
        let bytes = match to_bytes(response.into_body(), MAX_RESPONSE_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, path, "could not read response body");
                return ApiResult::err(fallback);
            }
        };

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| "Request failed".to_owned());
            return ApiResult::err(message);
        }

        match serde_json::from_slice(&bytes) {
            Ok(data) => ApiResult::ok(data),
            Err(e) => {
                warn!(error = %e, path, "undecodable response body");
                ApiResult::err(fallback)
            }
        }
    }

    pub async fn authenticate_admin(&self, username: &str, password: &str) -> ApiResult<AdminSession> {
        self.request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": username, "password": password })),
            "Authentication failed",
        )
        .await
    }

    pub async fn logout(&self, session: &AdminSession) -> ApiResult<()> {
        let result: ApiResult<SuccessBody> = self
            .request(
                Method::POST,
                "/api/auth/logout",
                None,
                Some(json!({ "token": session.session_token })),
                "Logout failed",
            )
            .await;
        unit(result)
    }

    pub async fn get_public_products(&self) -> ApiResult<Vec<product::Model>> {
        self.request(
            Method::GET,
            "/api/products/public",
            None,
            None,
            "Failed to fetch products",
        )
        .await
    }

    pub async fn get_all_products(
        &self,
        session: Option<&AdminSession>,
    ) -> ApiResult<Vec<product::Model>> {
        self.request(
            Method::GET,
            "/api/products",
            session,
            None,
            "Failed to fetch products",
        )
        .await
    }

    pub async fn create_product(
        &self,
        session: Option<&AdminSession>,
        input: &ProductInput,
    ) -> ApiResult<Uuid> {
        let result: ApiResult<IdBody> = self
            .request(
                Method::POST,
                "/api/products",
                session,
                serde_json::to_value(input).ok(),
                "Failed to create product",
            )
            .await;
        id(result)
    }

    pub async fn update_product(
        &self,
        session: Option<&AdminSession>,
        product_id: Uuid,
        input: &ProductInput,
    ) -> ApiResult<()> {
        let result: ApiResult<SuccessBody> = self
            .request(
                Method::PUT,
                &format!("/api/products/{product_id}"),
                session,
                serde_json::to_value(input).ok(),
                "Failed to update product",
            )
            .await;
        unit(result)
    }

    pub async fn delete_product(
        &self,
        session: Option<&AdminSession>,
        product_id: Uuid,
    ) -> ApiResult<()> {
        let result: ApiResult<SuccessBody> = self
            .request(
                Method::DELETE,
                &format!("/api/products/{product_id}"),
                session,
                None,
                "Failed to delete product",
            )
            .await;
        unit(result)
    }

    pub async fn create_order(&self, input: &OrderInput) -> ApiResult<Uuid> {
        let result: ApiResult<IdBody> = self
            .request(
                Method::POST,
                "/api/orders",
                None,
                serde_json::to_value(input).ok(),
                "Failed to create order",
            )
            .await;
        id(result)
    }

    pub async fn get_orders(&self, session: Option<&AdminSession>) -> ApiResult<Vec<order::Model>> {
        self.request(
            Method::GET,
            "/api/orders",
            session,
            None,
            "Failed to fetch orders",
        )
        .await
    }

    pub async fn get_order_items(
        &self,
        session: Option<&AdminSession>,
        order_id: Uuid,
    ) -> ApiResult<Vec<order_item::Model>> {
        self.request(
            Method::GET,
            &format!("/api/orders/{order_id}/items"),
            session,
            None,
            "Failed to fetch order items",
        )
        .await
    }

    pub async fn update_order_status(
        &self,
        session: Option<&AdminSession>,
        order_id: Uuid,
        status: &str,
    ) -> ApiResult<()> {
        let result: ApiResult<SuccessBody> = self
            .request(
                Method::PUT,
                &format!("/api/orders/{order_id}/status"),
                session,
                Some(json!({ "status": status })),
                "Failed to update order status",
            )
            .await;
        unit(result)
    }
}

fn unit(result: ApiResult<SuccessBody>) -> ApiResult<()> {
    match result.error {
        Some(error) => ApiResult::err(error),
        None => ApiResult::ok(()),
    }
}

fn id(result: ApiResult<IdBody>) -> ApiResult<Uuid> {
    ApiResult {
        data: result.data.map(|body| body.id),
        error: result.error,
    }
}

/// Durable key/value storage for client-side state.
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// Storage that lives as long as the value itself.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.entries
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?
            .remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per entry inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

/// Holds the signed-in admin session and keeps storage in sync with it.
#[derive(Debug)]
pub struct SessionKeeper<St> {
    storage: St,
    current: Option<AdminSession>,
}

impl<St: SessionStorage> SessionKeeper<St> {
    /// Loads a stored session if one exists and has not yet expired.
    /// Stale or unreadable entries are removed.
    pub fn restore(storage: St) -> Self {
        let current = storage
            .get(SESSION_STORAGE_KEY)
            .and_then(|raw| serde_json::from_str::<AdminSession>(&raw).ok())
            .filter(|session| session.expires_at.with_timezone(&Utc) > Utc::now());

        if current.is_none() {
            if let Err(e) = storage.remove(SESSION_STORAGE_KEY) {
                warn!(error = %e, "could not clear stored session");
            }
        }

        Self { storage, current }
    }

    pub fn current(&self) -> Option<&AdminSession> {
        self.current.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.session_token.as_str())
    }

    /// Makes `session` current and persists it.
    pub fn set(&mut self, session: AdminSession) {
        match serde_json::to_string(&session) {
            Ok(raw) => {
                if let Err(e) = self.storage.set(SESSION_STORAGE_KEY, &raw) {
                    warn!(error = %e, "could not persist session");
                }
            }
            Err(e) => warn!(error = %e, "could not encode session"),
        }
        self.current = Some(session);
    }

    /// Forgets the session locally and in storage.
    pub fn clear(&mut self) {
        self.current = None;
        if let Err(e) = self.storage.remove(SESSION_STORAGE_KEY) {
            warn!(error = %e, "could not clear stored session");
        }
    }

    /// Logs in through `client`; returns the error message on failure.
    pub async fn sign_in<S>(&mut self, client: &ApiClient<S>, username: &str, password: &str) -> Option<String>
    where
        S: Service<Request<Body>, Response = Response<Body>> + Clone + Send,
        S::Error: Display,
        S::Future: Send,
    {
        match client.authenticate_admin(username, password).await.into_result() {
            Ok(session) => {
                self.set(session);
                None
            }
            Err(error) => Some(error),
        }
    }

    /// Revokes the session server-side and always clears it locally,
    /// even if the server could not be reached.
    pub async fn sign_out<S>(&mut self, client: &ApiClient<S>)
    where
        S: Service<Request<Body>, Response = Response<Body>> + Clone + Send,
        S::Error: Display,
        S::Future: Send,
    {
        if let Some(session) = &self.current {
            if let Some(error) = client.logout(session).await.error {
                warn!(error = %error, "error deleting session");
            }
        }
        self.clear();
    }
}
