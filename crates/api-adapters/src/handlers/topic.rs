use axum::extract::{Path, State};
use domains::models::*;
use domains::query::Page;

use crate::extract::{AuthUser, Body, Params};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Params(query): Params<TopicQuery>,
) -> ApiResult<Page<Topic>> {
    Ok(ApiResponse::ok(state.services.topics.list(&caller, query).await?))
}

pub async fn my(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Params(query): Params<TopicQuery>,
) -> ApiResult<Page<Topic>> {
    Ok(ApiResponse::ok(state.services.topics.my(&caller, query).await?))
}

pub async fn detail(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Topic> {
    Ok(ApiResponse::ok(state.services.topics.detail(&caller, &id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Body(input): Body<CreateTopic>,
) -> ApiResult<Topic> {
    Ok(ApiResponse::ok(state.services.topics.create(&caller, input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Body(input): Body<UpdateTopic>,
) -> ApiResult<Topic> {
    Ok(ApiResponse::ok(state.services.topics.update(&caller, &id, input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Body(input): Body<IdList>,
) -> ApiResult<usize> {
    Ok(ApiResponse::ok(state.services.topics.delete(&caller, &input.ids).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Body(input): Body<UpdateTopicStatus>,
) -> ApiResult<Topic> {
    Ok(ApiResponse::ok(state.services.topics.update_status(&caller, &id, input).await?))
}

pub async fn select_model(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Body(input): Body<SelectModel>,
) -> ApiResult<Topic> {
    Ok(ApiResponse::ok(state.services.topics.select_model(&caller, &id, input).await?))
}

pub async fn remove_model(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Topic> {
    Ok(ApiResponse::ok(state.services.topics.remove_model(&caller, &id).await?))
}

pub async fn complete(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Topic> {
    Ok(ApiResponse::ok(state.services.topics.complete(&caller, &id).await?))
}

pub async fn archive(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Topic> {
    Ok(ApiResponse::ok(state.services.topics.archive(&caller, &id).await?))
}

pub async fn reopen(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Topic> {
    Ok(ApiResponse::ok(state.services.topics.reopen(&caller, &id).await?))
}

pub async fn statistics(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<TopicStatistics> {
    Ok(ApiResponse::ok(state.services.topics.statistics(&caller).await?))
}
