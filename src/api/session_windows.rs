use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::session_windows::WindowFilter;
use crate::schemas::session_window::{
    ApplyDeadlinesRequest, ApplyDeadlinesResponse, ShiftDeadlinesRequest, ShiftDeadlinesResponse,
    WindowBatchRequest, WindowResponse,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_windows).put(upsert_windows))
        .route("/apply", post(apply_deadlines))
        .route("/shift", post(shift_deadlines))
}

async fn list_windows(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
) -> Result<Json<Vec<WindowResponse>>, ApiError> {
    let windows = repositories::session_windows::list_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list session windows"))?;

    Ok(Json(windows.into_iter().map(WindowResponse::from_db).collect()))
}

/// Batch upsert keyed on (jenis, sesi). All rows land or none do.
async fn upsert_windows(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Json(payload): Json<WindowBatchRequest>,
) -> Result<Json<Vec<WindowResponse>>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    for window in &payload.windows {
        if window.end_at <= window.start_at {
            return Err(ApiError::BadRequest(format!(
                "end_at must be after start_at for {} sesi {}",
                window.jenis.as_str(),
                window.sesi
            )));
        }
    }

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let mut saved = Vec::with_capacity(payload.windows.len());
    for window in payload.windows {
        let row = repositories::session_windows::upsert(
            &mut tx,
            repositories::session_windows::UpsertWindow {
                id: &Uuid::new_v4().to_string(),
                jenis: window.jenis,
                sesi: window.sesi,
                start_at: window.start_at,
                end_at: window.end_at,
                now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to upsert session window"))?;
        saved.push(row);
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit session windows"))?;

    Ok(Json(saved.into_iter().map(WindowResponse::from_db).collect()))
}

/// Copies each matching window's end time into item deadlines. Windows are
/// processed one by one; a failure on one window does not abort the rest.
async fn apply_deadlines(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Json(payload): Json<ApplyDeadlinesRequest>,
) -> Result<Json<ApplyDeadlinesResponse>, ApiError> {
    let filter = WindowFilter { jenis: payload.jenis, sesi: payload.sesi };
    let windows = repositories::session_windows::list_filtered(state.db(), &filter)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list session windows"))?;

    let now = primitive_now_utc();
    let mut items_updated = 0u64;
    let mut windows_failed = 0usize;

    for window in &windows {
        match repositories::session_windows::apply_window_deadline(
            state.db(),
            window,
            payload.only_missing,
            now,
        )
        .await
        {
            Ok(count) => items_updated += count,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    jenis = window.jenis.as_str(),
                    sesi = window.sesi,
                    "Failed to apply window deadline"
                );
                windows_failed += 1;
            }
        }
    }

    Ok(Json(ApplyDeadlinesResponse {
        windows_processed: windows.len() - windows_failed,
        items_updated,
        windows_failed,
    }))
}

/// Moves matching windows and item deadlines by the same delta, atomically.
async fn shift_deadlines(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Json(payload): Json<ShiftDeadlinesRequest>,
) -> Result<Json<ShiftDeadlinesResponse>, ApiError> {
    if payload.delta_minutes == 0 {
        return Err(ApiError::BadRequest("delta_minutes must be non-zero".to_string()));
    }

    let filter = WindowFilter { jenis: payload.jenis, sesi: payload.sesi };
    let now = primitive_now_utc();

    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let windows_shifted = repositories::session_windows::shift_windows(
        &mut tx,
        &filter,
        payload.delta_minutes,
        now,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to shift session windows"))?;

    let items_shifted = repositories::session_windows::shift_item_deadlines(
        &mut tx,
        &filter,
        payload.delta_minutes,
        now,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to shift item deadlines"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit deadline shift"))?;

    Ok(Json(ShiftDeadlinesResponse { windows_shifted, items_shifted }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    use crate::core::security::PrincipalKind;
    use crate::db::types::{ItemKind, ItemStatus};
    use crate::test_support;

    #[tokio::test]
    async fn upsert_is_keyed_on_jenis_and_sesi() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db(), "ops", "Ops", "rahasia-123").await;
        let token =
            test_support::bearer_token(&admin.id, PrincipalKind::Admin, ctx.state.settings());

        let body = serde_json::json!({
            "windows": [{
                "jenis": "diskusi",
                "sesi": 1,
                "startAt": "2026-03-01T00:00",
                "endAt": "2026-03-14T23:59"
            }]
        });
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PUT,
                "/api/v1/session-windows",
                Some(&token),
                Some(body),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        // Same key again replaces instead of duplicating.
        let body = serde_json::json!({
            "windows": [{
                "jenis": "diskusi",
                "sesi": 1,
                "startAt": "2026-03-02T00:00",
                "endAt": "2026-03-15T23:59"
            }]
        });
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PUT,
                "/api/v1/session-windows",
                Some(&token),
                Some(body),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/session-windows",
                Some(&token),
                None,
            ))
            .await
            .expect("response");
        let json = test_support::read_json(response).await;
        let windows = json.as_array().expect("windows");
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0]["end_at"], "2026-03-15T23:59:00Z");
    }

    #[tokio::test]
    async fn students_cannot_read_windows() {
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
                "/api/v1/session-windows",
                Some(&token),
                None,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn upsert_rejects_inverted_window() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db(), "ops", "Ops", "rahasia-123").await;
        let token =
            test_support::bearer_token(&admin.id, PrincipalKind::Admin, ctx.state.settings());

        let body = serde_json::json!({
            "windows": [{
                "jenis": "tugas",
                "sesi": 3,
                "startAt": "2026-03-14T00:00",
                "endAt": "2026-03-01T00:00"
            }]
        });
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PUT,
                "/api/v1/session-windows",
                Some(&token),
                Some(body),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn apply_copies_deadlines_onto_items() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db(), "ops", "Ops", "rahasia-123").await;
        let student =
            test_support::insert_student(ctx.state.db(), "041234567", "Budi", "rahasia-123").await;
        let course = test_support::insert_course(ctx.state.db(), "Statistika").await;
        let enrollment =
            test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;
        let item = test_support::insert_item(
            ctx.state.db(),
            &enrollment.id,
            ItemKind::Diskusi,
            1,
            ItemStatus::Belum,
        )
        .await;
        test_support::insert_window(
            ctx.state.db(),
            ItemKind::Diskusi,
            1,
            "2026-03-01T00:00:00Z",
            "2026-03-14T23:59:00Z",
        )
        .await;
        let token =
            test_support::bearer_token(&admin.id, PrincipalKind::Admin, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/session-windows/apply",
                Some(&token),
                Some(serde_json::json!({})),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = test_support::read_json(response).await;
        assert_eq!(json["items_updated"], 1);
        assert_eq!(json["windows_failed"], 0);

        let reloaded = crate::repositories::items::fetch_one_by_id(ctx.state.db(), &item.id)
            .await
            .expect("item");
        assert!(reloaded.deadline_at.is_some());
    }

    #[tokio::test]
    async fn apply_only_missing_skips_existing_deadlines() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db(), "ops", "Ops", "rahasia-123").await;
        let student =
            test_support::insert_student(ctx.state.db(), "041234567", "Budi", "rahasia-123").await;
        let course = test_support::insert_course(ctx.state.db(), "Statistika").await;
        let enrollment =
            test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;
        let item = test_support::insert_item(
            ctx.state.db(),
            &enrollment.id,
            ItemKind::Diskusi,
            1,
            ItemStatus::Belum,
        )
        .await;
        test_support::set_item_deadline(ctx.state.db(), &item.id, "2026-05-01T00:00:00Z").await;
        test_support::insert_window(
            ctx.state.db(),
            ItemKind::Diskusi,
            1,
            "2026-03-01T00:00:00Z",
            "2026-03-14T23:59:00Z",
        )
        .await;
        let token =
            test_support::bearer_token(&admin.id, PrincipalKind::Admin, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/session-windows/apply",
                Some(&token),
                Some(serde_json::json!({ "onlyMissing": true })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = test_support::read_json(response).await;
        assert_eq!(json["items_updated"], 0);
    }

    #[tokio::test]
    async fn shift_moves_windows_and_deadlines_together() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db(), "ops", "Ops", "rahasia-123").await;
        let student =
            test_support::insert_student(ctx.state.db(), "041234567", "Budi", "rahasia-123").await;
        let course = test_support::insert_course(ctx.state.db(), "Statistika").await;
        let enrollment =
            test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;
        let item = test_support::insert_item(
            ctx.state.db(),
            &enrollment.id,
            ItemKind::Diskusi,
            1,
            ItemStatus::Belum,
        )
        .await;
        test_support::set_item_deadline(ctx.state.db(), &item.id, "2026-03-14T23:59:00Z").await;
        test_support::insert_window(
            ctx.state.db(),
            ItemKind::Diskusi,
            1,
            "2026-03-01T00:00:00Z",
            "2026-03-14T23:59:00Z",
        )
        .await;
        let token =
            test_support::bearer_token(&admin.id, PrincipalKind::Admin, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/session-windows/shift",
                Some(&token),
                Some(serde_json::json!({ "deltaMinutes": 1440 })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = test_support::read_json(response).await;
        assert_eq!(json["windows_shifted"], 1);
        assert_eq!(json["items_shifted"], 1);

        let reloaded = crate::repositories::items::fetch_one_by_id(ctx.state.db(), &item.id)
            .await
            .expect("item");
        let deadline = reloaded.deadline_at.expect("deadline");
        assert_eq!(deadline.to_string(), "2026-03-15 23:59:00.0");
    }

    #[tokio::test]
    async fn shift_rejects_zero_delta() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db(), "ops", "Ops", "rahasia-123").await;
        let token =
            test_support::bearer_token(&admin.id, PrincipalKind::Admin, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/session-windows/shift",
                Some(&token),
                Some(serde_json::json!({ "deltaMinutes": 0 })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
