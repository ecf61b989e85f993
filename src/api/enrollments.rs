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
use crate::api::guards::{require_enrollment_access, CurrentPrincipal, CurrentStudent};
use crate::api::pagination::{default_limit, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db;
use crate::db::types::{ItemKind, ItemStatus};
use crate::repositories;
use crate::schemas::enrollment::{
    EnrollmentCreate, EnrollmentDetailResponse, EnrollmentResponse, EnrollmentSummaryResponse,
};
use crate::schemas::item::{ItemResponse, QuizItemCreate};
use crate::services::item_generation;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_enrollments).post(create_enrollment))
        .route("/:enrollment_id", get(get_enrollment).delete(delete_enrollment))
        .route("/:enrollment_id/items", get(list_items).post(create_quiz_item))
}

async fn create_enrollment(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Json(payload): Json<EnrollmentCreate>,
) -> Result<(StatusCode, Json<EnrollmentDetailResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let course = repositories::courses::find_by_id(state.db(), &payload.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load course"))?;
    if course.is_none() {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    let existing = repositories::enrollments::exists_for_student_course(
        state.db(),
        &student.id,
        &payload.course_id,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to check existing enrollment"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Already enrolled in this course".to_string()));
    }

    let deadlines = repositories::session_windows::deadline_map(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load session windows"))?;

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let enrollment = repositories::enrollments::create(
        &mut tx,
        repositories::enrollments::CreateEnrollment {
            id: &Uuid::new_v4().to_string(),
            student_id: &student.id,
            course_id: &payload.course_id,
            created_at: now,
        },
    )
    .await
    .map_err(|e| {
        if db::is_unique_violation(&e) {
            ApiError::Conflict("Already enrolled in this course".to_string())
        } else {
            ApiError::internal(e, "Failed to create enrollment")
        }
    })?;

    let mut items = Vec::new();
    for (jenis, sesi) in item_generation::generation_plan(&payload.quiz_sesi) {
        let item = repositories::items::create(
            &mut tx,
            repositories::items::CreateItem {
                id: &Uuid::new_v4().to_string(),
                enrollment_id: &enrollment.id,
                jenis,
                sesi,
                deskripsi: None,
                deadline_at: deadlines.get(&(jenis, sesi)).copied(),
                created_at: now,
                updated_at: now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create item"))?;
        items.push(item);
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit enrollment"))?;

    let response = EnrollmentDetailResponse {
        enrollment: EnrollmentResponse::from_db(enrollment),
        items: items.into_iter().map(ItemResponse::from_db).collect(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    #[serde(alias = "studentId")]
    student_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "courseId")]
    course_id: Option<String>,
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

async fn list_enrollments(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Query(query): Query<ListQuery>,
) -> Result<Json<PaginatedResponse<EnrollmentSummaryResponse>>, ApiError> {
    let limit = query.limit.clamp(1, 500);
    let skip = query.skip.max(0);

    let (rows, total_count) = match &principal {
        CurrentPrincipal::Student(student) => {
            let rows = repositories::enrollments::list_for_student(state.db(), &student.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to list enrollments"))?;
            let total = rows.len() as i64;
            (rows, total)
        }
        CurrentPrincipal::Admin(_) => {
            let filter = repositories::enrollments::EnrollmentFilter {
                student_id: query.student_id.as_deref(),
                course_id: query.course_id.as_deref(),
            };
            let rows = repositories::enrollments::list_all(state.db(), &filter, skip, limit)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to list enrollments"))?;
            let total = repositories::enrollments::count_all(state.db(), &filter)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to count enrollments"))?;
            (rows, total)
        }
    };

    Ok(Json(PaginatedResponse {
        items: rows.into_iter().map(EnrollmentSummaryResponse::from_row).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn get_enrollment(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(enrollment_id): Path<String>,
) -> Result<Json<EnrollmentDetailResponse>, ApiError> {
    let enrollment = require_enrollment_access(&state, &principal, &enrollment_id).await?;

    let items = repositories::items::list_for_enrollment(
        state.db(),
        &enrollment.id,
        repositories::items::ItemFilter { jenis: None, sesi: None, status: None },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list items"))?;

    Ok(Json(EnrollmentDetailResponse {
        enrollment: EnrollmentResponse::from_db(enrollment),
        items: items.into_iter().map(ItemResponse::from_db).collect(),
    }))
}

#[derive(Debug, Deserialize)]
struct DeleteQuery {
    #[serde(default)]
    force: bool,
}

async fn delete_enrollment(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(enrollment_id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode, ApiError> {
    let enrollment = require_enrollment_access(&state, &principal, &enrollment_id).await?;

    let completed = repositories::enrollments::count_completed_items(state.db(), &enrollment.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count completed items"))?;

    let admin_force = matches!(principal, CurrentPrincipal::Admin(_)) && query.force;
    if completed > 0 && !admin_force {
        return Err(ApiError::Conflict(format!(
            "Enrollment has {completed} completed items; an admin can pass force=true"
        )));
    }

    repositories::enrollments::delete_by_id(state.db(), &enrollment.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete enrollment"))?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct ItemListQuery {
    #[serde(default)]
    jenis: Option<ItemKind>,
    #[serde(default)]
    sesi: Option<i16>,
    #[serde(default)]
    status: Option<ItemStatus>,
}

async fn list_items(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(enrollment_id): Path<String>,
    Query(query): Query<ItemListQuery>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let enrollment = require_enrollment_access(&state, &principal, &enrollment_id).await?;

    let items = repositories::items::list_for_enrollment(
        state.db(),
        &enrollment.id,
        repositories::items::ItemFilter {
            jenis: query.jenis,
            sesi: query.sesi,
            status: query.status,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list items"))?;

    Ok(Json(items.into_iter().map(ItemResponse::from_db).collect()))
}

/// Only quizzes can be added after generation; the mandatory items are
/// fixed by the enrollment itself.
async fn create_quiz_item(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(enrollment_id): Path<String>,
    Json(payload): Json<QuizItemCreate>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let enrollment = require_enrollment_access(&state, &principal, &enrollment_id).await?;

    let existing = repositories::items::exists_for_enrollment(
        state.db(),
        &enrollment.id,
        ItemKind::Quiz,
        payload.sesi,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to check existing item"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Quiz for this session already exists".to_string()));
    }

    let deadline_at = match payload.deadline_at {
        Some(deadline) => Some(deadline),
        None => {
            let deadlines = repositories::session_windows::deadline_map(state.db())
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load session windows"))?;
            deadlines.get(&(ItemKind::Quiz, payload.sesi)).copied()
        }
    };

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let item = repositories::items::create(
        &mut tx,
        repositories::items::CreateItem {
            id: &Uuid::new_v4().to_string(),
            enrollment_id: &enrollment.id,
            jenis: ItemKind::Quiz,
            sesi: payload.sesi,
            deskripsi: payload.deskripsi,
            deadline_at,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| {
        if db::is_unique_violation(&e) {
            ApiError::Conflict("Quiz for this session already exists".to_string())
        } else {
            ApiError::internal(e, "Failed to create item")
        }
    })?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit item"))?;

    Ok((StatusCode::CREATED, Json(ItemResponse::from_db(item))))
}
