use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentStudent};
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::repositories;
use crate::schemas::dashboard::{
    AdminDashboardResponse, AdminTotalsResponse, CourseCompletionResponse,
    StudentDashboardResponse, UpcomingItem,
};
use crate::services::progress;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/me", get(student_dashboard)).route("/admin", get(admin_dashboard))
}

async fn student_dashboard(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Result<Json<StudentDashboardResponse>, ApiError> {
    let rows = repositories::dashboard::progress_for_student(state.db(), &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load progress"))?;

    let upcoming = repositories::dashboard::upcoming_for_student(
        state.db(),
        &student.id,
        primitive_now_utc(),
        state.settings().tuton().upcoming_deadline_limit,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to load upcoming deadlines"))?;

    Ok(Json(StudentDashboardResponse {
        courses: progress::group_progress(rows),
        upcoming: upcoming
            .into_iter()
            .map(|row| UpcomingItem {
                item_id: row.item_id,
                course_nama: row.course_nama,
                jenis: row.jenis,
                sesi: row.sesi,
                deadline_at: format_primitive(row.deadline_at),
            })
            .collect(),
    }))
}

async fn admin_dashboard(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
) -> Result<Json<AdminDashboardResponse>, ApiError> {
    let totals = repositories::dashboard::admin_totals(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load totals"))?;

    let per_course = repositories::dashboard::completion_per_course(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load course completion"))?;

    Ok(Json(AdminDashboardResponse {
        totals: AdminTotalsResponse {
            students: totals.students,
            courses: totals.courses,
            enrollments: totals.enrollments,
            items: totals.items,
            items_selesai: totals.items_selesai,
        },
        courses: per_course
            .into_iter()
            .map(|row| CourseCompletionResponse {
                course_id: row.course_id,
                course_nama: row.course_nama,
                enrollments: row.enrollments,
                items: row.items,
                items_selesai: row.items_selesai,
                completion_percent: progress::completion_percent(row.items_selesai, row.items),
            })
            .collect(),
    }))
}
