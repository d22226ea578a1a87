//! Store profile route handlers.

use axum::{Json, extract::State};
use faqdesk_core::StoreId;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::extract::{ApiJson, ApiPath};
use super::views::StoreView;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::services::StoreService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StoreInput {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct StoreResponse {
    pub store: StoreView,
}

pub async fn show(
    State(state): State<AppState>,
    ApiPath(store_id): ApiPath<StoreId>,
) -> Result<Json<StoreResponse>> {
    let store = StoreService::new(state.repos().stores.as_ref())
        .get(store_id)
        .await?;
    Ok(Json(StoreResponse {
        store: store.into(),
    }))
}

#[instrument(skip(state, actor, input))]
pub async fn update(
    State(state): State<AppState>,
    OptionalAuth(actor): OptionalAuth,
    ApiPath(store_id): ApiPath<StoreId>,
    ApiJson(input): ApiJson<StoreInput>,
) -> Result<Json<StoreResponse>> {
    let store = StoreService::new(state.repos().stores.as_ref())
        .rename(actor.as_ref(), store_id, &input.name)
        .await?;
    Ok(Json(StoreResponse {
        store: store.into(),
    }))
}
