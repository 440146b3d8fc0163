//! Versioned topic analyses.

use axum::extract::{Path, State};
use domains::models::*;
use domains::query::Page;

use crate::extract::{AuthUser, Body, Params};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Params(query): Params<AnalysisQuery>,
) -> ApiResult<Page<Analysis>> {
    Ok(ApiResponse::ok(state.services.analyses.list(&caller, query).await?))
}

pub async fn my(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Params(query): Params<AnalysisQuery>,
) -> ApiResult<Page<Analysis>> {
    Ok(ApiResponse::ok(state.services.analyses.my(&caller, query).await?))
}

pub async fn detail(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Analysis> {
    Ok(ApiResponse::ok(state.services.analyses.detail(&caller, &id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Body(input): Body<CreateAnalysis>,
) -> ApiResult<Analysis> {
    Ok(ApiResponse::ok(state.services.analyses.create(&caller, input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Body(input): Body<UpdateAnalysis>,
) -> ApiResult<Analysis> {
    Ok(ApiResponse::ok(state.services.analyses.update(&caller, input).await?))
}

/// Bulk delete. Returns how many versions were removed.
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Body(input): Body<IdList>,
) -> ApiResult<usize> {
    Ok(ApiResponse::ok(state.services.analyses.delete(&caller, &input.ids).await?))
}

pub async fn current(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Params(TopicModelRef { topic_id, model_id }): Params<TopicModelRef>,
) -> ApiResult<Analysis> {
    let a = state.services.analyses.current(&caller, &topic_id, &model_id).await?;
    Ok(ApiResponse::ok(a))
}

pub async fn latest(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Params(TopicRef { topic_id }): Params<TopicRef>,
) -> ApiResult<Analysis> {
    Ok(ApiResponse::ok(state.services.analyses.latest(&caller, &topic_id).await?))
}

pub async fn by_topic(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(topic_id): Path<String>,
) -> ApiResult<Vec<Analysis>> {
    Ok(ApiResponse::ok(state.services.analyses.by_topic(&caller, &topic_id).await?))
}

pub async fn history(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((topic_id, model_id)): Path<(String, String)>,
) -> ApiResult<AnalysisHistory> {
    let history = state.services.analyses.history(&caller, &topic_id, &model_id).await?;
    Ok(ApiResponse::ok(history))
}

pub async fn set_current(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Body(input): Body<SetCurrentAnalysis>,
) -> ApiResult<Analysis> {
    Ok(ApiResponse::ok(state.services.analyses.set_current(&caller, input).await?))
}
