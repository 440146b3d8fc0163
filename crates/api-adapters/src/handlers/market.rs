//! The thinking-model market and its categories.

use axum::extract::{Path, State};
use domains::models::*;
use domains::query::Page;

use crate::extract::{AdminUser, AuthUser, Body, CurrentActor, MaybeUser, Params};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Params(query): Params<ModelQuery>,
) -> ApiResult<Page<ThinkingModel>> {
    let viewer = viewer.as_ref().map(|p| p.user_id.as_str());
    Ok(ApiResponse::ok(state.services.market.list(query, viewer).await?))
}

pub async fn my(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Params(query): Params<ModelQuery>,
) -> ApiResult<Page<ThinkingModel>> {
    Ok(ApiResponse::ok(state.services.market.my(&caller, query).await?))
}

pub async fn recommended(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Params(query): Params<RecommendedQuery>,
) -> ApiResult<Vec<ThinkingModel>> {
    let viewer = viewer.as_ref().map(|p| p.user_id.as_str());
    Ok(ApiResponse::ok(state.services.market.recommended(query, viewer).await?))
}

pub async fn detail(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<ThinkingModel> {
    Ok(ApiResponse::ok(state.services.market.detail(&id, viewer.as_ref()).await?))
}

pub async fn by_code(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(code): Path<String>,
) -> ApiResult<ThinkingModel> {
    Ok(ApiResponse::ok(state.services.market.by_code(&code, viewer.as_ref()).await?))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Body(input): Body<CreateModel>,
) -> ApiResult<ThinkingModel> {
    Ok(ApiResponse::ok(state.services.market.create(&actor, input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Body(input): Body<UpdateModel>,
) -> ApiResult<ThinkingModel> {
    Ok(ApiResponse::ok(state.services.market.update(&caller, &id, input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.services.market.delete(&caller, &id).await?;
    Ok(ApiResponse::ok(()))
}

pub async fn publish(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Body(ModelRef { id }): Body<ModelRef>,
) -> ApiResult<ThinkingModel> {
    Ok(ApiResponse::ok(state.services.market.publish(&caller, &id).await?))
}

pub async fn unpublish(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<ThinkingModel> {
    Ok(ApiResponse::ok(state.services.market.unpublish(&caller, &id).await?))
}

pub async fn adopt(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<OperationResult> {
    Ok(ApiResponse::ok(state.services.market.adopt(&caller.user_id, &id).await?))
}

pub async fn purchase(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<OperationResult> {
    Ok(ApiResponse::ok(state.services.market.purchase(&caller.user_id, &id).await?))
}

pub async fn fork(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> ApiResult<ThinkingModel> {
    Ok(ApiResponse::ok(state.services.market.fork(&actor, &id).await?))
}

pub async fn like(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<ModelLikeState> {
    Ok(ApiResponse::ok(state.services.market.toggle_like(&caller.user_id, &id).await?))
}

pub async fn categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::ok(state.services.market.categories().await?))
}

pub async fn category_tree(State(state): State<AppState>) -> ApiResult<Vec<CategoryNode>> {
    Ok(ApiResponse::ok(state.services.market.category_tree().await?))
}

pub async fn category_children(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::ok(state.services.market.category_children(&id).await?))
}

pub async fn category_path(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::ok(state.services.market.category_path(&id).await?))
}

pub async fn move_category(
    State(state): State<AppState>,
    AdminUser(caller): AdminUser,
    Body(input): Body<MoveCategory>,
) -> ApiResult<Category> {
    Ok(ApiResponse::ok(state.services.market.move_category(&caller, input).await?))
}

pub async fn category(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Category> {
    Ok(ApiResponse::ok(state.services.market.category(&id).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(caller): AdminUser,
    Body(input): Body<CreateCategory>,
) -> ApiResult<Category> {
    Ok(ApiResponse::ok(state.services.market.create_category(&caller, input).await?))
}

pub async fn update_category(
    State(state): State<AppState>,
    AdminUser(caller): AdminUser,
    Path(id): Path<String>,
    Body(input): Body<UpdateCategory>,
) -> ApiResult<Category> {
    let c = state.services.market.update_category(&caller, &id, input).await?;
    Ok(ApiResponse::ok(c))
}

pub async fn delete_category(
    State(state): State<AppState>,
    AdminUser(caller): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.services.market.delete_category(&caller, &id).await?;
    Ok(ApiResponse::ok(()))
}
