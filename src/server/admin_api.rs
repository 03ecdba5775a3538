//! Admin REST API used by the web panel.
//!
//! Every route requires the `X-Admin-Password` header. Status changes go through
//! the same transition logic as the bot, so the buyer is notified either way.
//!
//! The panel is served from another origin, so CORS preflights are answered
//! before the password check.

use crate::{
    core::{order, order::OrderStatus, product},
    errors::Error,
    server::AppState,
};
use axum::{
    Json, Router,
    extract::{Path, Request, State, rejection::JsonRejection},
    http::{HeaderName, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

/// Header carrying the admin password.
pub const PASSWORD_HEADER: &str = "x-admin-password";

/// Cross-origin access for the web panel.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(PASSWORD_HEADER)])
}

/// Admin routes, guarded by [`require_password`] inside the CORS layer.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/orders", get(list_orders))
        .route("/admin/orders/{id}", put(update_order).delete(delete_order))
        .route("/admin/products", get(list_products).post(create_product))
        .route(
            "/admin/products/{id}",
            put(update_product).delete(delete_product),
        )
        .route_layer(middleware::from_fn_with_state(state, require_password))
        .layer(cors())
}

/// Middleware rejecting requests without the configured password.
///
/// An empty configured password rejects everything.
pub async fn require_password(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = !state.admin_password.is_empty()
        && request
            .headers()
            .get(PASSWORD_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|password| password == &*state.admin_password);

    if authorized {
        next.run(request).await
    } else {
        warn!(path = %request.uri().path(), "rejected admin API request");
        ApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
    }
}

/// JSON error body with a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    const fn invalid_request() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid request")
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            e if e.is_not_found() => Self::new(StatusCode::NOT_FOUND, "Not found"),
            Error::InvalidStatus { .. } | Error::InvalidPrice { .. } | Error::Config { .. } => {
                Self::invalid_request()
            }
            other => {
                error!(error = %other, "admin API request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection, "rejected admin API body");
        Self::invalid_request()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult = std::result::Result<Json<Value>, ApiError>;

fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

/// Body for PUT /admin/orders/{id}; exactly one field must be present.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderUpdate {
    /// New status value
    pub status: Option<String>,
    /// Person fulfilling the order; blank clears it
    pub executor: Option<String>,
    /// New ready-by date (RFC 3339)
    pub end_date: Option<DateTime<Utc>>,
}

/// Body for POST /admin/products and PUT /admin/products/{id}.
#[derive(Debug, Deserialize)]
pub struct ProductInput {
    /// Display name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Whole-unit price
    pub price: i64,
    /// Catalog emoji
    #[serde(default)]
    pub emoji: String,
}

/// GET /admin/orders: every order, newest first.
pub async fn list_orders(State(state): State<AppState>) -> ApiResult {
    let orders = order::list_all_orders(&state.bot.database).await?;
    Ok(Json(json!({ "orders": orders })))
}

/// PUT /admin/orders/{id}
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: std::result::Result<Json<OrderUpdate>, JsonRejection>,
) -> ApiResult {
    let Json(update) = payload?;
    let db = &state.bot.database;

    match (update.status, update.executor, update.end_date) {
        (Some(status), None, None) => {
            let status: OrderStatus = status.parse()?;
            let updated = order::transition_status(
                db,
                id,
                status,
                state.bot.config.orders.ready_by_days,
                Utc::now(),
            )
            .await?;
            info!(order_number = %updated.order_number, %status, "order status changed via admin API");
            state.bot.notify_buyer(&updated).await;
        }
        (None, Some(executor), None) => {
            order::update_order_executor(db, id, Some(executor)).await?;
        }
        (None, None, Some(end_date)) => {
            order::update_order_end_date(db, id, end_date).await?;
        }
        _ => return Err(ApiError::invalid_request()),
    }
    Ok(success())
}

/// DELETE /admin/orders/{id}
pub async fn delete_order(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult {
    order::delete_order(&state.bot.database, id).await?;
    info!(order_id = id, "order deleted via admin API");
    Ok(success())
}

/// GET /admin/products: the catalog by id.
pub async fn list_products(State(state): State<AppState>) -> ApiResult {
    let products = product::list_products(&state.bot.database).await?;
    Ok(Json(json!({ "products": products })))
}

/// POST /admin/products
pub async fn create_product(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = payload?;
    let created = product::create_product(
        &state.bot.database,
        &input.name,
        &input.description,
        input.price,
        &input.emoji,
    )
    .await?;
    info!(product_id = created.id, "product created via admin API");
    Ok(Json(json!({ "success": true, "id": created.id })))
}

/// PUT /admin/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: std::result::Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = payload?;
    product::update_product(
        &state.bot.database,
        id,
        &input.name,
        &input.description,
        input.price,
        &input.emoji,
    )
    .await?;
    Ok(success())
}

/// DELETE /admin/products/{id}
pub async fn delete_product(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult {
    product::delete_product(&state.bot.database, id).await?;
    info!(product_id = id, "product deleted via admin API");
    Ok(success())
}
