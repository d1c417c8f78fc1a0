use axum::extract::{Path, Query};
use axum::Json;
use uuid::Uuid;

use crate::database::models::{Offer, OfferWithOwner};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{OfferFilters, OfferInput, OfferService};

/// POST /conhecimentos - Publish a knowledge offer
pub async fn create(Json(payload): Json<OfferInput>) -> ApiResult<Offer> {
    let service = OfferService::new().await?;
    let offer = service.create(payload).await?;
    Ok(ApiResponse::created(offer))
}

/// GET /conhecimentos - List offers, optionally filtered, owners joined
pub async fn list(Query(filters): Query<OfferFilters>) -> ApiResult<Vec<OfferWithOwner>> {
    let service = OfferService::new().await?;
    let offers = service.list(filters).await?;
    Ok(ApiResponse::success(offers))
}

/// PUT /conhecimentos/:id - Overwrite an offer's fields
pub async fn update(Path(id): Path<Uuid>, Json(payload): Json<OfferInput>) -> ApiResult<Offer> {
    let service = OfferService::new().await?;
    let offer = service.update(id, payload).await?;
    Ok(ApiResponse::success(offer))
}

/// DELETE /conhecimentos/:id - Remove an offer
pub async fn delete(Path(id): Path<Uuid>) -> ApiResult<()> {
    let service = OfferService::new().await?;
    service.delete(id).await?;
    Ok(ApiResponse::<()>::no_content())
}
