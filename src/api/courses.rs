use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentPrincipal};
use crate::api::pagination::{default_limit, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db;
use crate::repositories;
use crate::schemas::course::{CourseCreate, CourseResponse, CourseUpdate};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/:course_id", get(get_course).patch(update_course).delete(delete_course))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

#[derive(Debug, Deserialize)]
struct DeleteQuery {
    #[serde(default)]
    force: bool,
}

async fn list_courses(
    State(state): State<AppState>,
    _principal: CurrentPrincipal,
    Query(query): Query<ListQuery>,
) -> Result<Json<PaginatedResponse<CourseResponse>>, ApiError> {
    let limit = query.limit.clamp(1, 500);
    let skip = query.skip.max(0);
    let q = query.q.as_deref().filter(|q| !q.is_empty());

    let courses = repositories::courses::list(state.db(), q, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;
    let total_count = repositories::courses::count(state.db(), q)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count courses"))?;

    Ok(Json(PaginatedResponse {
        items: courses.into_iter().map(CourseResponse::from_db).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn create_course(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Json(payload): Json<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = primitive_now_utc();
    let course = repositories::courses::create(
        state.db(),
        repositories::courses::CreateCourse {
            id: &Uuid::new_v4().to_string(),
            nama: payload.nama.trim(),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| {
        if db::is_unique_violation(&e) {
            ApiError::Conflict("Course with this name already exists".to_string())
        } else {
            ApiError::internal(e, "Failed to create course")
        }
    })?;

    Ok((StatusCode::CREATED, Json(CourseResponse::from_db(course))))
}

async fn get_course(
    State(state): State<AppState>,
    _principal: CurrentPrincipal,
    Path(course_id): Path<String>,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    Ok(Json(CourseResponse::from_db(course)))
}

async fn update_course(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Path(course_id): Path<String>,
    Json(payload): Json<CourseUpdate>,
) -> Result<Json<CourseResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let existing = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load course"))?;
    if existing.is_none() {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    repositories::courses::update(
        state.db(),
        &course_id,
        repositories::courses::UpdateCourse {
            nama: payload.nama.map(|nama| nama.trim().to_string()),
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        if db::is_unique_violation(&e) {
            ApiError::Conflict("Course with this name already exists".to_string())
        } else {
            ApiError::internal(e, "Failed to update course")
        }
    })?;

    let course = repositories::courses::fetch_one_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to reload course"))?;

    Ok(Json(CourseResponse::from_db(course)))
}

async fn delete_course(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Path(course_id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode, ApiError> {
    let enrollments = repositories::courses::count_enrollments(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count enrollments"))?;

    if enrollments > 0 && !query.force {
        return Err(ApiError::Conflict(format!(
            "Course has {enrollments} enrollments; pass force=true to delete anyway"
        )));
    }

    let deleted = repositories::courses::delete_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete course"))?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
