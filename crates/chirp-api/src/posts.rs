use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use tracing::{error, warn};

use chirp_db::models::PostRow;
use chirp_types::api::{Claims, CreatePostRequest, FeedResponse, FieldError, PostResponse};
use chirp_types::models::Post;

use crate::auth::AppState;
use crate::error::ApiError;

pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let length = req.content.chars().count();
    if length == 0 || length > 280 {
        return Err(ApiError::Validation(vec![FieldError {
            field: "content".to_string(),
            message: "Post content must be between 1 and 280 characters".to_string(),
        }]));
    }

    // The author identity comes from the verified claims, never the body.
    let author_id = claims.sub;

    // Run the blocking insert off the async runtime
    let db = state.clone();
    let content = req.content.clone();
    let post_id = tokio::task::spawn_blocking(move || db.db.insert_post(author_id, &content))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Storage(anyhow::anyhow!("task join error: {}", e))
        })??;

    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            success: true,
            message: "Post created successfully".to_string(),
            post: Post {
                id: post_id,
                author_id,
                content: req.content,
                created_at: Utc::now(),
                username: claims.username,
            },
        }),
    ))
}

pub async fn all_posts(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_posts())
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Storage(anyhow::anyhow!("task join error: {}", e))
        })??;

    Ok(Json(FeedResponse {
        success: true,
        posts: rows.into_iter().map(row_to_post).collect(),
    }))
}

pub async fn posts_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_posts_by_user(user_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Storage(anyhow::anyhow!("task join error: {}", e))
        })??;

    Ok(Json(FeedResponse {
        success: true,
        posts: rows.into_iter().map(row_to_post).collect(),
    }))
}

fn row_to_post(row: PostRow) -> Post {
    let created_at = row
        .created_at
        .parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without a
            // timezone. Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!(
                "Corrupt created_at '{}' on post {}: {}",
                row.created_at, row.id, e
            );
            DateTime::default()
        });

    Post {
        id: row.id,
        author_id: row.author_id,
        content: row.content,
        created_at,
        username: row.author_username,
    }
}
