//! 应用管理 API
//!
//! 包含 /apps/* 端点

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::error;

use crate::domain::app::{AppDetails, AppNameQuery};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 创建应用管理路由
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/apps", get(list_apps))
        .route("/apps/create", get(create_app).post(create_app))
        .route("/apps/destroy", get(destroy_app).post(destroy_app))
        .route("/apps/details", get(get_app_details))
}

/// 列出所有应用
///
/// GET /apps
/// dokku 失败时仍返回 200，失败信息在 `issues` 中
async fn list_apps(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.apps.list_apps().await)
}

/// 创建应用
///
/// GET|POST /apps/create?name=<app>
async fn create_app(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AppNameQuery>,
) -> ApiResult<StatusCode> {
    let name = require_name(&query)?;

    state.apps.create_app(name).await.map_err(|e| {
        error!(app = %name, error = %e, "Failed to create app");
        ApiError::from(e)
    })?;

    Ok(StatusCode::NO_CONTENT)
}

/// 销毁应用
///
/// GET|POST /apps/destroy?name=<app>
async fn destroy_app(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AppNameQuery>,
) -> ApiResult<StatusCode> {
    let name = require_name(&query)?;

    state.apps.destroy_app(name).await.map_err(|e| {
        error!(app = %name, error = %e, "Failed to destroy app");
        ApiError::from(e)
    })?;

    Ok(StatusCode::NO_CONTENT)
}

/// 获取应用详情
///
/// GET /apps/details?name=<app>
/// 响应形如 `{"<app>": {...}}`，部分报告失败时仍返回 200
async fn get_app_details(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AppNameQuery>,
) -> ApiResult<Json<BTreeMap<String, AppDetails>>> {
    let name = require_name(&query)?;
    let details = state.apps.app_details(name).await;

    Ok(Json(BTreeMap::from([(name.to_string(), details)])))
}

fn require_name(query: &AppNameQuery) -> ApiResult<&str> {
    query
        .app_name()
        .ok_or_else(|| ApiError::bad_request("Missing required query parameter 'name'"))
}
