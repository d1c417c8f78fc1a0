use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{UserInput, UserPage, UserService};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// POST /users - Register a user
pub async fn create(Json(payload): Json<UserInput>) -> ApiResult<User> {
    let service = UserService::new().await?;
    let user = service.create(payload).await?;
    Ok(ApiResponse::created(user))
}

/// GET /users - List all users
pub async fn list() -> ApiResult<Vec<User>> {
    let service = UserService::new().await?;
    let users = service.list().await?;
    Ok(ApiResponse::success(users))
}

/// GET /users-posts - Paginated listing with page metadata
pub async fn list_paged(Query(query): Query<PageQuery>) -> ApiResult<UserPage> {
    let service = UserService::new().await?;
    let page = service.page(query.page, query.limit).await?;
    Ok(ApiResponse::success(page))
}

/// PUT /users/:id - Overwrite a user's fields
pub async fn update(Path(id): Path<Uuid>, Json(payload): Json<UserInput>) -> ApiResult<User> {
    let service = UserService::new().await?;
    let user = service.update(id, payload).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /users/:id - Remove a user
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<()> {
    let service = UserService::new().await?;
    service.delete(id).await?;
    Ok(ApiResponse::<()>::no_content())
}
