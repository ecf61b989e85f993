use axum::{
    extract::{Query, State},
    http::header::{self, HeaderValue},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::core::state::AppState;
use crate::repositories;
use crate::services::report_csv;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/progress.csv", get(progress_csv))
}

#[derive(Debug, Deserialize)]
struct ReportQuery {
    #[serde(default)]
    #[serde(alias = "courseId")]
    course_id: Option<String>,
}

async fn progress_csv(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = repositories::dashboard::report_rows(state.db(), query.course_id.as_deref())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load report rows"))?;

    let body = report_csv::render_report(&rows)
        .map_err(|e| ApiError::internal(e, "Failed to render report"))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static("attachment; filename=\"progress.csv\""),
            ),
        ],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    use crate::core::security::PrincipalKind;
    use crate::db::types::{ItemKind, ItemStatus};
    use crate::test_support;

    #[tokio::test]
    async fn report_requires_admin() {
        let ctx = test_support::setup_test_context().await;
        let student =
            test_support::insert_student(ctx.state.db(), "041234567", "Budi", "rahasia-123").await;
        let token =
            test_support::bearer_token(&student.id, PrincipalKind::Student, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/reports/progress.csv",
                Some(&token),
                None,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn report_contains_enrollment_rows() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db(), "ops", "Ops", "rahasia-123").await;
        let student =
            test_support::insert_student(ctx.state.db(), "041234567", "Budi", "rahasia-123").await;
        let course = test_support::insert_course(ctx.state.db(), "Statistika").await;
        let enrollment =
            test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;
        test_support::insert_item(
            ctx.state.db(),
            &enrollment.id,
            ItemKind::Diskusi,
            1,
            ItemStatus::Selesai,
        )
        .await;
        let token =
            test_support::bearer_token(&admin.id, PrincipalKind::Admin, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/reports/progress.csv",
                Some(&token),
                None,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").and_then(|v| v.to_str().ok()),
            Some("text/csv; charset=utf-8")
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let text = String::from_utf8(body.to_vec()).expect("utf8");
        assert!(text.lines().count() >= 2);
        assert!(text.contains("041234567"));
        assert!(text.contains("Statistika"));
    }

    #[tokio::test]
    async fn report_filters_by_course() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db(), "ops", "Ops", "rahasia-123").await;
        let student =
            test_support::insert_student(ctx.state.db(), "041234567", "Budi", "rahasia-123").await;
        let stats = test_support::insert_course(ctx.state.db(), "Statistika").await;
        let akuntansi = test_support::insert_course(ctx.state.db(), "Akuntansi").await;
        test_support::insert_enrollment(ctx.state.db(), &student.id, &stats.id).await;
        test_support::insert_enrollment(ctx.state.db(), &student.id, &akuntansi.id).await;
        let token =
            test_support::bearer_token(&admin.id, PrincipalKind::Admin, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                &format!("/api/v1/reports/progress.csv?courseId={}", stats.id),
                Some(&token),
                None,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let text = String::from_utf8(body.to_vec()).expect("utf8");
        assert!(text.contains("Statistika"));
        assert!(!text.contains("Akuntansi"));
    }
}
