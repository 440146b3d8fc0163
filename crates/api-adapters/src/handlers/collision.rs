//! The collision area: discussions and their comments, offline meetups and
//! paid expert consultations.

use axum::extract::{Path, State};
use domains::models::*;
use domains::query::Page;

use crate::extract::{AuthUser, Body, CurrentActor, MaybeUser, Params};
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

fn viewer(user: &MaybeUser) -> Option<&str> {
    user.0.as_ref().map(|p| p.user_id.as_str())
}

// Discussions

pub async fn list_discussions(
    State(state): State<AppState>,
    user: MaybeUser,
    Params(query): Params<DiscussionQuery>,
) -> ApiResult<Page<Discussion>> {
    let page = state.services.discussions.list(query, viewer(&user)).await?;
    Ok(ApiResponse::ok(page))
}

pub async fn discussion_detail(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<Discussion> {
    let d = state.services.discussions.detail(&id, viewer(&user)).await?;
    Ok(ApiResponse::ok(d))
}

pub async fn create_discussion(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Body(input): Body<CreateDiscussion>,
) -> ApiResult<Discussion> {
    Ok(ApiResponse::ok(state.services.discussions.create(&actor, input).await?))
}

pub async fn update_discussion(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Body(input): Body<UpdateDiscussion>,
) -> ApiResult<Discussion> {
    Ok(ApiResponse::ok(state.services.discussions.update(&actor, &id, input).await?))
}

pub async fn delete_discussion(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.services.discussions.delete(&actor, &id).await?;
    Ok(ApiResponse::ok(()))
}

pub async fn like_discussion(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<LikeState> {
    let liked = state.services.discussions.toggle_like(&caller.user_id, &id).await?;
    Ok(ApiResponse::ok(liked))
}

pub async fn favorite_discussion(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<FavoriteState> {
    let favorited = state.services.discussions.toggle_favorite(&caller.user_id, &id).await?;
    Ok(ApiResponse::ok(favorited))
}

pub async fn list_comments(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<String>,
    Params(query): Params<CommentQuery>,
) -> ApiResult<Page<Comment>> {
    let page = state.services.discussions.comments(&id, query, viewer(&user)).await?;
    Ok(ApiResponse::ok(page))
}

pub async fn create_comment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Body(input): Body<CreateComment>,
) -> ApiResult<Comment> {
    let c = state.services.discussions.create_comment(&actor, &id, input).await?;
    Ok(ApiResponse::ok(c))
}

pub async fn like_comment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<LikeState> {
    let liked = state.services.discussions.toggle_comment_like(&caller.user_id, &id).await?;
    Ok(ApiResponse::ok(liked))
}

pub async fn hot_tags(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(ApiResponse::ok(state.services.discussions.hot_tags().await?))
}

pub async fn active_users(State(state): State<AppState>) -> ApiResult<Vec<UserInfo>> {
    Ok(ApiResponse::ok(state.services.discussions.active_users().await?))
}

// Meetups

pub async fn list_meetups(
    State(state): State<AppState>,
    user: MaybeUser,
    Params(query): Params<MeetupQuery>,
) -> ApiResult<Page<Meetup>> {
    Ok(ApiResponse::ok(state.services.meetups.list(query, viewer(&user)).await?))
}

pub async fn meetup_detail(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<Meetup> {
    Ok(ApiResponse::ok(state.services.meetups.detail(&id, viewer(&user)).await?))
}

pub async fn create_meetup(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Body(input): Body<CreateMeetup>,
) -> ApiResult<Meetup> {
    Ok(ApiResponse::ok(state.services.meetups.create(&actor, input).await?))
}

pub async fn toggle_interest(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<InterestState> {
    let interest = state.services.meetups.toggle_interest(&caller.user_id, &id).await?;
    Ok(ApiResponse::ok(interest))
}

pub async fn apply_meetup(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Body(input): Body<ApplyMeetup>,
) -> ApiResult<MeetupApplication> {
    Ok(ApiResponse::ok(state.services.meetups.apply(&actor, &id, input).await?))
}

pub async fn meetup_applications(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<MeetupApplication>> {
    Ok(ApiResponse::ok(state.services.meetups.applications(&caller, &id).await?))
}

pub async fn review_application(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Body(input): Body<ReviewApplication>,
) -> ApiResult<MeetupApplication> {
    Ok(ApiResponse::ok(state.services.meetups.review(&caller, &id, input).await?))
}

pub async fn update_meetup_status(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Body(input): Body<UpdateMeetupStatus>,
) -> ApiResult<Meetup> {
    Ok(ApiResponse::ok(state.services.meetups.update_status(&caller, &id, input).await?))
}

pub async fn meetup_cities(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(ApiResponse::ok(state.services.meetups.cities().await?))
}

// Consultations

pub async fn list_consultations(
    State(state): State<AppState>,
    Params(query): Params<ConsultationQuery>,
) -> ApiResult<Page<Consultation>> {
    Ok(ApiResponse::ok(state.services.consultations.list(query).await?))
}

pub async fn consultation_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Consultation> {
    Ok(ApiResponse::ok(state.services.consultations.detail(&id).await?))
}

pub async fn create_consultation(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Body(input): Body<CreateConsultation>,
) -> ApiResult<Consultation> {
    Ok(ApiResponse::ok(state.services.consultations.create(&actor, input).await?))
}

pub async fn apply_consultation(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Body(input): Body<ApplyConsultation>,
) -> ApiResult<ConsultationApplication> {
    let application = state.services.consultations.apply(&actor, &id, input).await?;
    Ok(ApiResponse::ok(application))
}

pub async fn consultation_applications(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<ConsultationApplication>> {
    Ok(ApiResponse::ok(state.services.consultations.applications(&id).await?))
}

pub async fn select_expert(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Body(input): Body<SelectExpert>,
) -> ApiResult<Consultation> {
    let c = state.services.consultations.select_expert(&caller, &id, input).await?;
    Ok(ApiResponse::ok(c))
}

pub async fn update_consultation_status(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Body(input): Body<UpdateConsultationStatus>,
) -> ApiResult<Consultation> {
    let c = state.services.consultations.update_status(&caller, &id, input).await?;
    Ok(ApiResponse::ok(c))
}

pub async fn recommended_experts(
    State(state): State<AppState>,
    Params(query): Params<ExpertQuery>,
) -> ApiResult<Vec<Expert>> {
    Ok(ApiResponse::ok(state.services.consultations.recommended_experts(query).await?))
}

pub async fn consultation_stats(State(state): State<AppState>) -> ApiResult<ConsultationStats> {
    Ok(ApiResponse::ok(state.services.consultations.stats().await?))
}
