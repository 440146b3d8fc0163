use axum::extract::{Path, State};
use domains::models::*;
use domains::query::Page;

use crate::extract::{AuthUser, Body, CurrentActor, Params};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Params(query): Params<ActionQuery>,
) -> ApiResult<Page<Action>> {
    Ok(ApiResponse::ok(state.services.actions.list(&caller, query).await?))
}

pub async fn my(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Params(query): Params<ActionQuery>,
) -> ApiResult<Page<Action>> {
    Ok(ApiResponse::ok(state.services.actions.my(&caller, query).await?))
}

pub async fn detail(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Action> {
    Ok(ApiResponse::ok(state.services.actions.detail(&caller, &id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Body(input): Body<CreateAction>,
) -> ApiResult<Action> {
    Ok(ApiResponse::ok(state.services.actions.create(&caller, input).await?))
}

pub async fn create_from_analysis(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Body(input): Body<CreateActionsFromAnalysis>,
) -> ApiResult<Vec<Action>> {
    let created = state.services.actions.create_from_analysis(&caller, input).await?;
    Ok(ApiResponse::ok(created))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Body(input): Body<UpdateAction>,
) -> ApiResult<Action> {
    Ok(ApiResponse::ok(state.services.actions.update(&caller, &id, input).await?))
}

/// Bulk delete. Returns how many actions were removed.
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Body(input): Body<IdList>,
) -> ApiResult<usize> {
    Ok(ApiResponse::ok(state.services.actions.delete(&caller, &input.ids).await?))
}

pub async fn update_completion(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Body(input): Body<UpdateCompletion>,
) -> ApiResult<Action> {
    let a = state.services.actions.update_completion(&caller, &id, input).await?;
    Ok(ApiResponse::ok(a))
}

pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Body(input): Body<UpdateActionStatus>,
) -> ApiResult<Action> {
    Ok(ApiResponse::ok(state.services.actions.update_status(&caller, &id, input).await?))
}

pub async fn complete(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Action> {
    Ok(ApiResponse::ok(state.services.actions.complete(&caller, &id).await?))
}

pub async fn cancel(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Action> {
    Ok(ApiResponse::ok(state.services.actions.cancel(&caller, &id).await?))
}

pub async fn add_follow_up(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Body(input): Body<AddFollowUp>,
) -> ApiResult<FollowUp> {
    Ok(ApiResponse::ok(state.services.actions.add_follow_up(&actor, &id, input).await?))
}

pub async fn follow_ups(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<FollowUp>> {
    Ok(ApiResponse::ok(state.services.actions.follow_ups(&caller, &id).await?))
}

pub async fn by_topic(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(topic_id): Path<String>,
) -> ApiResult<Vec<Action>> {
    Ok(ApiResponse::ok(state.services.actions.by_topic(&caller, &topic_id).await?))
}

pub async fn by_analysis(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(analysis_id): Path<String>,
) -> ApiResult<Vec<Action>> {
    let rows = state.services.actions.by_analysis(&caller, &analysis_id).await?;
    Ok(ApiResponse::ok(rows))
}

pub async fn statistics(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<ActionStatistics> {
    Ok(ApiResponse::ok(state.services.actions.statistics(&caller).await?))
}
