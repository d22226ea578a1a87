//! FAQ and translation route handlers.
//!
//! The same operations are mounted twice: once under a category for global
//! FAQs and once under a store. Each handler resolves its path into a
//! [`FaqAddress`] and delegates to a shared body.

use axum::{Json, extract::State, http::StatusCode};
use faqdesk_core::models::{Faq, TranslationInput, User};
use faqdesk_core::{FaqId, Language, StoreId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::extract::{ApiJson, ApiPath};
use super::views::{FaqView, Message, TranslationView};
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::services::{FaqAddress, FaqService, FaqUpdate};
use crate::state::AppState;

/// Body for creating a store FAQ: the category plus its first translation.
#[derive(Debug, Deserialize)]
pub struct StoreFaqInput {
    #[serde(default)]
    pub category: String,
    #[serde(flatten)]
    pub translation: TranslationInput,
}

#[derive(Debug, Serialize)]
pub struct FaqList {
    pub faqs: Vec<FaqView>,
}

#[derive(Debug, Serialize)]
pub struct FaqResponse {
    pub message: &'static str,
    pub faq: FaqView,
}

#[derive(Debug, Serialize)]
pub struct TranslationList {
    pub id: FaqId,
    pub category: String,
    pub default_language: Language,
    pub translations: Vec<TranslationView>,
}

impl From<Faq> for TranslationList {
    fn from(faq: Faq) -> Self {
        Self {
            id: faq.id,
            category: faq.category.name,
            default_language: faq.default_language,
            translations: faq.translations.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TranslationResponse {
    pub message: &'static str,
    pub translation: TranslationView,
}

async fn list(state: &AppState, at: FaqAddress<'_>) -> Result<Json<FaqList>> {
    let faqs = FaqService::new(state.repos()).list(at).await?;
    Ok(Json(FaqList {
        faqs: faqs.into_iter().map(Into::into).collect(),
    }))
}

async fn create(
    state: &AppState,
    actor: Option<&User>,
    at: FaqAddress<'_>,
    category: &str,
    input: &TranslationInput,
) -> Result<(StatusCode, Json<FaqResponse>)> {
    let faq = FaqService::new(state.repos())
        .create(actor, at, category, input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(FaqResponse {
            message: "faq created successfully",
            faq: faq.into(),
        }),
    ))
}

async fn show(state: &AppState, at: FaqAddress<'_>, id: FaqId) -> Result<Json<FaqView>> {
    let faq = FaqService::new(state.repos()).get(at, id).await?;
    Ok(Json(faq.into()))
}

async fn update(
    state: &AppState,
    actor: Option<&User>,
    at: FaqAddress<'_>,
    id: FaqId,
    changes: FaqUpdate,
) -> Result<Json<FaqResponse>> {
    let faq = FaqService::new(state.repos())
        .update(actor, at, id, changes)
        .await?;
    Ok(Json(FaqResponse {
        message: "faq updated successfully",
        faq: faq.into(),
    }))
}

async fn delete(
    state: &AppState,
    actor: Option<&User>,
    at: FaqAddress<'_>,
    id: FaqId,
) -> Result<Json<Message>> {
    FaqService::new(state.repos()).delete(actor, at, id).await?;
    Ok(Json(Message::new("faq deleted successfully")))
}

async fn translations(
    state: &AppState,
    at: FaqAddress<'_>,
    id: FaqId,
) -> Result<Json<TranslationList>> {
    let faq = FaqService::new(state.repos()).get(at, id).await?;
    Ok(Json(faq.into()))
}

async fn add_translation(
    state: &AppState,
    actor: Option<&User>,
    at: FaqAddress<'_>,
    id: FaqId,
    input: &TranslationInput,
) -> Result<(StatusCode, Json<TranslationResponse>)> {
    let translation = FaqService::new(state.repos())
        .add_translation(actor, at, id, input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(TranslationResponse {
            message: "translation created successfully",
            translation: translation.into(),
        }),
    ))
}

async fn show_translation(
    state: &AppState,
    at: FaqAddress<'_>,
    id: FaqId,
    language: &str,
) -> Result<Json<TranslationView>> {
    let translation = FaqService::new(state.repos())
        .translation(at, id, language)
        .await?;
    Ok(Json(translation.into()))
}

async fn update_translation(
    state: &AppState,
    actor: Option<&User>,
    at: FaqAddress<'_>,
    id: FaqId,
    language: &str,
    input: &TranslationInput,
) -> Result<Json<TranslationResponse>> {
    let translation = FaqService::new(state.repos())
        .update_translation(actor, at, id, language, input)
        .await?;
    Ok(Json(TranslationResponse {
        message: "translation updated successfully",
        translation: translation.into(),
    }))
}

async fn remove_translation(
    state: &AppState,
    actor: Option<&User>,
    at: FaqAddress<'_>,
    id: FaqId,
    language: &str,
) -> Result<Json<Message>> {
    FaqService::new(state.repos())
        .remove_translation(actor, at, id, language)
        .await?;
    Ok(Json(Message::new("translation deleted successfully")))
}

/// Handlers for global FAQs, addressed by category name.
pub mod global {
    use super::{
        ApiJson, ApiPath, AppState, FaqAddress, FaqId, FaqList, FaqResponse, FaqUpdate, FaqView,
        Json, Message, OptionalAuth, Result, State, StatusCode, TranslationInput, TranslationList,
        TranslationResponse, TranslationView, instrument, list,
    };

    pub async fn index(
        State(state): State<AppState>,
        ApiPath(category): ApiPath<String>,
    ) -> Result<Json<FaqList>> {
        list(&state, FaqAddress::Global(&category)).await
    }

    #[instrument(skip(state, actor, input))]
    pub async fn create(
        State(state): State<AppState>,
        OptionalAuth(actor): OptionalAuth,
        ApiPath(category): ApiPath<String>,
        ApiJson(input): ApiJson<TranslationInput>,
    ) -> Result<(StatusCode, Json<FaqResponse>)> {
        super::create(
            &state,
            actor.as_ref(),
            FaqAddress::Global(&category),
            &category,
            &input,
        )
        .await
    }

    pub async fn show(
        State(state): State<AppState>,
        ApiPath((category, id)): ApiPath<(String, FaqId)>,
    ) -> Result<Json<FaqView>> {
        super::show(&state, FaqAddress::Global(&category), id).await
    }

    #[instrument(skip(state, actor, changes))]
    pub async fn update(
        State(state): State<AppState>,
        OptionalAuth(actor): OptionalAuth,
        ApiPath((category, id)): ApiPath<(String, FaqId)>,
        ApiJson(changes): ApiJson<FaqUpdate>,
    ) -> Result<Json<FaqResponse>> {
        super::update(&state, actor.as_ref(), FaqAddress::Global(&category), id, changes).await
    }

    #[instrument(skip(state, actor))]
    pub async fn delete(
        State(state): State<AppState>,
        OptionalAuth(actor): OptionalAuth,
        ApiPath((category, id)): ApiPath<(String, FaqId)>,
    ) -> Result<Json<Message>> {
        super::delete(&state, actor.as_ref(), FaqAddress::Global(&category), id).await
    }

    pub async fn translations(
        State(state): State<AppState>,
        ApiPath((category, id)): ApiPath<(String, FaqId)>,
    ) -> Result<Json<TranslationList>> {
        super::translations(&state, FaqAddress::Global(&category), id).await
    }

    #[instrument(skip(state, actor, input))]
    pub async fn add_translation(
        State(state): State<AppState>,
        OptionalAuth(actor): OptionalAuth,
        ApiPath((category, id)): ApiPath<(String, FaqId)>,
        ApiJson(input): ApiJson<TranslationInput>,
    ) -> Result<(StatusCode, Json<TranslationResponse>)> {
        super::add_translation(&state, actor.as_ref(), FaqAddress::Global(&category), id, &input)
            .await
    }

    pub async fn show_translation(
        State(state): State<AppState>,
        ApiPath((category, id, language)): ApiPath<(String, FaqId, String)>,
    ) -> Result<Json<TranslationView>> {
        super::show_translation(&state, FaqAddress::Global(&category), id, &language).await
    }

    #[instrument(skip(state, actor, input))]
    pub async fn update_translation(
        State(state): State<AppState>,
        OptionalAuth(actor): OptionalAuth,
        ApiPath((category, id, language)): ApiPath<(String, FaqId, String)>,
        ApiJson(input): ApiJson<TranslationInput>,
    ) -> Result<Json<TranslationResponse>> {
        super::update_translation(
            &state,
            actor.as_ref(),
            FaqAddress::Global(&category),
            id,
            &language,
            &input,
        )
        .await
    }

    #[instrument(skip(state, actor))]
    pub async fn remove_translation(
        State(state): State<AppState>,
        OptionalAuth(actor): OptionalAuth,
        ApiPath((category, id, language)): ApiPath<(String, FaqId, String)>,
    ) -> Result<Json<Message>> {
        super::remove_translation(
            &state,
            actor.as_ref(),
            FaqAddress::Global(&category),
            id,
            &language,
        )
        .await
    }
}

/// Handlers for a store's own FAQs.
pub mod store {
    use super::{
        ApiJson, ApiPath, AppState, FaqAddress, FaqId, FaqList, FaqResponse, FaqUpdate, FaqView,
        Json, Message, OptionalAuth, Result, State, StatusCode, StoreFaqInput, StoreId,
        TranslationInput, TranslationList, TranslationResponse, TranslationView, instrument, list,
    };

    pub async fn index(
        State(state): State<AppState>,
        ApiPath(store): ApiPath<StoreId>,
    ) -> Result<Json<FaqList>> {
        list(&state, FaqAddress::Store(store)).await
    }

    #[instrument(skip(state, actor, input))]
    pub async fn create(
        State(state): State<AppState>,
        OptionalAuth(actor): OptionalAuth,
        ApiPath(store): ApiPath<StoreId>,
        ApiJson(input): ApiJson<StoreFaqInput>,
    ) -> Result<(StatusCode, Json<FaqResponse>)> {
        super::create(
            &state,
            actor.as_ref(),
            FaqAddress::Store(store),
            &input.category,
            &input.translation,
        )
        .await
    }

    pub async fn show(
        State(state): State<AppState>,
        ApiPath((store, id)): ApiPath<(StoreId, FaqId)>,
    ) -> Result<Json<FaqView>> {
        super::show(&state, FaqAddress::Store(store), id).await
    }

    #[instrument(skip(state, actor, changes))]
    pub async fn update(
        State(state): State<AppState>,
        OptionalAuth(actor): OptionalAuth,
        ApiPath((store, id)): ApiPath<(StoreId, FaqId)>,
        ApiJson(changes): ApiJson<FaqUpdate>,
    ) -> Result<Json<FaqResponse>> {
        super::update(&state, actor.as_ref(), FaqAddress::Store(store), id, changes).await
    }

    #[instrument(skip(state, actor))]
    pub async fn delete(
        State(state): State<AppState>,
        OptionalAuth(actor): OptionalAuth,
        ApiPath((store, id)): ApiPath<(StoreId, FaqId)>,
    ) -> Result<Json<Message>> {
        super::delete(&state, actor.as_ref(), FaqAddress::Store(store), id).await
    }

    pub async fn translations(
        State(state): State<AppState>,
        ApiPath((store, id)): ApiPath<(StoreId, FaqId)>,
    ) -> Result<Json<TranslationList>> {
        super::translations(&state, FaqAddress::Store(store), id).await
    }

    #[instrument(skip(state, actor, input))]
    pub async fn add_translation(
        State(state): State<AppState>,
        OptionalAuth(actor): OptionalAuth,
        ApiPath((store, id)): ApiPath<(StoreId, FaqId)>,
        ApiJson(input): ApiJson<TranslationInput>,
    ) -> Result<(StatusCode, Json<TranslationResponse>)> {
        super::add_translation(&state, actor.as_ref(), FaqAddress::Store(store), id, &input).await
    }

    pub async fn show_translation(
        State(state): State<AppState>,
        ApiPath((store, id, language)): ApiPath<(StoreId, FaqId, String)>,
    ) -> Result<Json<TranslationView>> {
        super::show_translation(&state, FaqAddress::Store(store), id, &language).await
    }

    #[instrument(skip(state, actor, input))]
    pub async fn update_translation(
        State(state): State<AppState>,
        OptionalAuth(actor): OptionalAuth,
        ApiPath((store, id, language)): ApiPath<(StoreId, FaqId, String)>,
        ApiJson(input): ApiJson<TranslationInput>,
    ) -> Result<Json<TranslationResponse>> {
        super::update_translation(
            &state,
            actor.as_ref(),
            FaqAddress::Store(store),
            id,
            &language,
            &input,
        )
        .await
    }

    #[instrument(skip(state, actor))]
    pub async fn remove_translation(
        State(state): State<AppState>,
        OptionalAuth(actor): OptionalAuth,
        ApiPath((store, id, language)): ApiPath<(StoreId, FaqId, String)>,
    ) -> Result<Json<Message>> {
        super::remove_translation(&state, actor.as_ref(), FaqAddress::Store(store), id, &language)
            .await
    }
}
