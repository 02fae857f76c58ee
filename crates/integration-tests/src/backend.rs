//! In-process mock of the Sale Tracker backend.
//!
//! Decodes the identity header the same way the real service does and keeps
//! per-user sale records in memory, so client tests exercise the full
//! request path over real HTTP.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use api::{AuthHeaderPayload, DashboardData, DashboardStats, RecentSale, SaleCreate, SaleItem, SaleUpdate, UserInfo};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;
use uuid::Uuid;

/// Response served from the authentication status endpoint.
pub struct AuthResponse {
    /// HTTP status to answer with.
    pub status: u16,
    /// JSON body of the response.
    pub body: Value,
}

impl Default for AuthResponse {
    fn default() -> Self {
        Self {
            status: 401,
            body: json!({ "error": "unauthorized" }),
        }
    }
}

#[derive(Default)]
pub struct BackendState {
    sales: DashMap<String, SaleItem>,
    auth_response: Mutex<AuthResponse>,
    dashboard_override: Mutex<Option<(u16, String)>>,
}

/// A running mock backend bound to an ephemeral local port.
pub struct MockBackend {
    address: SocketAddr,
    state: Arc<BackendState>,
}

impl MockBackend {
    /// Boot the mock on 127.0.0.1 with an OS-assigned port.
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock backend");
        let address = listener.local_addr().expect("mock backend has no local address");

        let state = Arc::new(BackendState::default());
        let app = router(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend failed");
        });

        Self { address, state }
    }

    /// Base address of the running mock.
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.address)).expect("mock backend address is a valid URL")
    }

    /// Configure the authentication status endpoint's answer.
    pub fn set_auth_response(&self, status: u16, body: Value) {
        *self.state.auth_response.lock().expect("auth response lock poisoned") = AuthResponse { status, body };
    }

    /// Serve every dashboard route with a fixed status and raw text body.
    pub fn override_dashboard(&self, status: u16, body: &str) {
        *self
            .state
            .dashboard_override
            .lock()
            .expect("dashboard override lock poisoned") = Some((status, body.to_string()));
    }

    /// Number of sale records currently stored, across all users.
    pub fn sale_count(&self) -> usize {
        self.state.sales.len()
    }
}

fn router(state: Arc<BackendState>) -> Router {
    Router::new()
        .route("/.auth/me", get(auth_me))
        .route("/health", get(health))
        .route("/api/user", get(user_info))
        .route("/api/sales/", get(list_sales).post(create_sale))
        .route("/api/sales/{id}", get(get_sale).put(update_sale).delete(delete_sale))
        .route("/api/dashboard/", get(dashboard))
        .route("/api/dashboard/stats", get(dashboard_stats))
        .route("/api/dashboard/recent", get(recent_sales))
        .with_state(state)
}

/// Decode the identity header the way the real backend does: base64 of a
/// JSON principal, rejected with a 401 detail body when absent or invalid.
fn require_user(headers: &HeaderMap) -> Result<AuthHeaderPayload, Response> {
    let Some(value) = headers.get(api::IDENTITY_HEADER) else {
        return Err(unauthorized("Authentication required. No client principal found."));
    };

    let encoded = value
        .to_str()
        .map_err(|_| unauthorized("Invalid authentication data"))?;

    let payload = AuthHeaderPayload::decode(encoded).ok_or_else(|| unauthorized("Invalid authentication data"))?;

    if payload.user_id.is_empty() {
        return Err(unauthorized("Invalid authentication. User ID not found."));
    }

    Ok(payload)
}

fn unauthorized(detail: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": detail, "status_code": 401 })),
    )
        .into_response()
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "detail": "Sale not found", "status_code": 404 })),
    )
        .into_response()
}

fn now() -> String {
    jiff::Timestamp::now().to_string()
}

async fn auth_me(State(state): State<Arc<BackendState>>) -> Response {
    let response = state.auth_response.lock().expect("auth response lock poisoned");
    let status = StatusCode::from_u16(response.status).expect("configured auth status is valid");

    (status, Json(response.body.clone())).into_response()
}

async fn health() -> Response {
    Json(json!({ "status": "healthy", "service": "sale-tracker-api" })).into_response()
}

async fn user_info(headers: HeaderMap) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    Json(UserInfo {
        user_id: user.user_id,
        user_details: user.user_details,
        provider: user.identity_provider,
    })
    .into_response()
}

fn user_sales(state: &BackendState, user_id: &str) -> Vec<SaleItem> {
    let mut sales: Vec<SaleItem> = state
        .sales
        .iter()
        .filter(|entry| entry.value().user_id == user_id)
        .map(|entry| entry.value().clone())
        .collect();

    sales.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    sales
}

async fn list_sales(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    Json(user_sales(&state, &user.user_id)).into_response()
}

async fn create_sale(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(sale): Json<SaleCreate>,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let timestamp = now();
    let item = SaleItem {
        id: Uuid::new_v4().to_string(),
        user_id: user.user_id,
        product_name: sale.product_name,
        amount: sale.amount,
        sale_date: sale.sale_date,
        customer_name: sale.customer_name,
        platform: sale.platform,
        created_at: timestamp.clone(),
        updated_at: timestamp,
    };

    state.sales.insert(item.id.clone(), item.clone());

    (StatusCode::CREATED, Json(item)).into_response()
}

async fn get_sale(State(state): State<Arc<BackendState>>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.sales.get(&id) {
        Some(entry) if entry.value().user_id == user.user_id => Json(entry.value().clone()).into_response(),
        _ => not_found(),
    }
}

async fn update_sale(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(update): Json<SaleUpdate>,
) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let Some(mut entry) = state.sales.get_mut(&id) else {
        return not_found();
    };

    if entry.value().user_id != user.user_id {
        return not_found();
    }

    let item = entry.value_mut();

    if let Some(product_name) = update.product_name {
        item.product_name = product_name;
    }
    if let Some(amount) = update.amount {
        item.amount = amount;
    }
    if let Some(sale_date) = update.sale_date {
        item.sale_date = sale_date;
    }
    if let Some(customer_name) = update.customer_name {
        item.customer_name = Some(customer_name);
    }
    if let Some(platform) = update.platform {
        item.platform = platform;
    }
    item.updated_at = now();

    Json(item.clone()).into_response()
}

async fn delete_sale(State(state): State<Arc<BackendState>>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let owned = state
        .sales
        .get(&id)
        .is_some_and(|entry| entry.value().user_id == user.user_id);

    if !owned {
        return not_found();
    }

    state.sales.remove(&id);
    StatusCode::NO_CONTENT.into_response()
}

fn dashboard_override(state: &BackendState) -> Option<Response> {
    let value = state
        .dashboard_override
        .lock()
        .expect("dashboard override lock poisoned");

    value.as_ref().map(|(status, body)| {
        let status = StatusCode::from_u16(*status).expect("configured override status is valid");
        (status, body.clone()).into_response()
    })
}

fn stats_for(sales: &[SaleItem]) -> DashboardStats {
    let total_sales: f64 = sales.iter().map(|sale| sale.amount).sum();
    let total_items = sales.len() as u64;
    let month_prefix = jiff::Timestamp::now().strftime("%Y-%m").to_string();
    let this_month = sales
        .iter()
        .filter(|sale| sale.sale_date.starts_with(&month_prefix))
        .map(|sale| sale.amount)
        .sum();
    let avg_price = if total_items == 0 {
        0.0
    } else {
        total_sales / total_items as f64
    };

    DashboardStats {
        total_sales,
        total_items,
        this_month,
        avg_price,
    }
}

fn recent_for(sales: &[SaleItem], limit: usize) -> Vec<RecentSale> {
    let mut sorted: Vec<&SaleItem> = sales.iter().collect();
    sorted.sort_by(|a, b| b.sale_date.cmp(&a.sale_date));

    sorted
        .into_iter()
        .take(limit.min(20))
        .map(|sale| RecentSale {
            id: sale.id.clone(),
            product_name: sale.product_name.clone(),
            amount: sale.amount,
            sale_date: sale.sale_date.clone(),
            platform: sale.platform,
            customer_name: sale.customer_name.clone(),
        })
        .collect()
}

async fn dashboard_stats(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if let Some(response) = dashboard_override(&state) {
        return response;
    }

    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    Json(stats_for(&user_sales(&state, &user.user_id))).into_response()
}

#[derive(Deserialize)]
struct RecentQuery {
    limit: Option<usize>,
}

async fn recent_sales(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Query(query): Query<RecentQuery>,
) -> Response {
    if let Some(response) = dashboard_override(&state) {
        return response;
    }

    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let sales = user_sales(&state, &user.user_id);
    Json(recent_for(&sales, query.limit.unwrap_or(5))).into_response()
}

async fn dashboard(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if let Some(response) = dashboard_override(&state) {
        return response;
    }

    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let sales = user_sales(&state, &user.user_id);

    Json(DashboardData {
        stats: stats_for(&sales),
        recent_sales: recent_for(&sales, 5),
    })
    .into_response()
}
