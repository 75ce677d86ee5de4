//! API service routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_extra::extract::WithRejection;
use common::response::ApiResponse;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    extractors::{AuthUser, JsonBody, MaybeAuthUser, PathParam, QueryParams},
    models::{
        CreateCommentRequest, CreateForumRequest, DeleteCommentQuery, ForumQuery, PageQuery,
        UpdateForumRequest,
    },
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/forums", get(list_forums).post(create_forum))
        .route(
            "/forums/:id",
            get(get_forum).patch(update_forum).delete(delete_forum),
        )
        .route("/forums/:id/likes", get(get_likes).post(toggle_like))
        .route(
            "/comments/:forum_id",
            get(list_comments)
                .post(create_comment)
                .delete(delete_comment),
        )
        .route("/profile/forums", get(profile_forums))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = state.content_service.health_check().await.unwrap_or(false);
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "unavailable" },
            "service": "api-service"
        })),
    )
}

/// List forums, newest first
pub async fn list_forums(
    State(state): State<AppState>,
    WithRejection(Query(query), _): QueryParams<ForumQuery>,
) -> ApiResult<impl IntoResponse> {
    let (forums, pagination) = state.content_service.list_forums(&query).await?;

    Ok(Json(ApiResponse::page(forums, pagination)))
}

/// Create a forum owned by the caller
pub async fn create_forum(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(payload), _): JsonBody<CreateForumRequest>,
) -> ApiResult<impl IntoResponse> {
    let forum = state.content_service.create_forum(user.id, &payload).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(forum))))
}

/// Forum with comments and like state
pub async fn get_forum(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    WithRejection(Path(id), _): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let forum = state.content_service.get_forum(id, viewer.id()).await?;

    Ok(Json(ApiResponse::ok(forum)))
}

pub async fn update_forum(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): PathParam<Uuid>,
    WithRejection(Json(payload), _): JsonBody<UpdateForumRequest>,
) -> ApiResult<impl IntoResponse> {
    let forum = state
        .content_service
        .update_forum(user.id, id, &payload)
        .await?;

    Ok(Json(ApiResponse::ok(forum)))
}

pub async fn delete_forum(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.content_service.delete_forum(user.id, id).await?;

    Ok(Json(ApiResponse::empty()))
}

pub async fn get_likes(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    WithRejection(Path(id), _): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let status = state.content_service.like_status(id, viewer.id()).await?;

    Ok(Json(ApiResponse::ok(status)))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(id), _): PathParam<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let status = state.content_service.toggle_like(user.id, id).await?;

    Ok(Json(ApiResponse::ok(status)))
}

pub async fn list_comments(
    State(state): State<AppState>,
    WithRejection(Path(forum_id), _): PathParam<Uuid>,
    WithRejection(Query(query), _): QueryParams<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let (comments, pagination) = state
        .content_service
        .list_comments(forum_id, query.page, query.limit)
        .await?;

    Ok(Json(ApiResponse::page(comments, pagination)))
}

pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(forum_id), _): PathParam<Uuid>,
    WithRejection(Json(payload), _): JsonBody<CreateCommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let comment = state
        .content_service
        .create_comment(user.id, forum_id, &payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(comment))))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(forum_id), _): PathParam<Uuid>,
    WithRejection(Query(query), _): QueryParams<DeleteCommentQuery>,
) -> ApiResult<impl IntoResponse> {
    state
        .content_service
        .delete_comment(user.id, forum_id, query.comment_id)
        .await?;

    Ok(Json(ApiResponse::empty()))
}

/// The caller's own forums
pub async fn profile_forums(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let forums = state.content_service.profile_forums(user.id).await?;

    Ok(Json(ApiResponse::ok(forums)))
}
