//! FAQ category route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::extract::{ApiJson, ApiPath};
use super::views::{CategoryView, Message};
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::services::CategoryService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    #[serde(default, alias = "new_name")]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryList {
    pub categories: Vec<CategoryView>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub message: &'static str,
    pub category: CategoryView,
}

pub async fn index(State(state): State<AppState>) -> Result<Json<CategoryList>> {
    let categories = CategoryService::new(state.repos().categories.as_ref())
        .list()
        .await?;
    Ok(Json(CategoryList {
        categories: categories.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state, actor, input))]
pub async fn create(
    State(state): State<AppState>,
    OptionalAuth(actor): OptionalAuth,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<(StatusCode, Json<CategoryResponse>)> {
    let category = CategoryService::new(state.repos().categories.as_ref())
        .create(actor.as_ref(), &input.name)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse {
            message: "category created successfully",
            category: category.into(),
        }),
    ))
}

#[instrument(skip(state, actor, input))]
pub async fn rename(
    State(state): State<AppState>,
    OptionalAuth(actor): OptionalAuth,
    ApiPath(category): ApiPath<String>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<Json<CategoryResponse>> {
    let category = CategoryService::new(state.repos().categories.as_ref())
        .rename(actor.as_ref(), &category, &input.name)
        .await?;
    Ok(Json(CategoryResponse {
        message: "category updated successfully",
        category: category.into(),
    }))
}

/// Soft-delete a category and every FAQ under it.
#[instrument(skip(state, actor))]
pub async fn delete(
    State(state): State<AppState>,
    OptionalAuth(actor): OptionalAuth,
    ApiPath(category): ApiPath<String>,
) -> Result<Json<Message>> {
    CategoryService::new(state.repos().categories.as_ref())
        .delete(actor.as_ref(), &category)
        .await?;
    Ok(Json(Message::new("category deleted successfully")))
}
