use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::api::guards::{require_item_access, CurrentAdmin, CurrentPrincipal};
use crate::api::pagination::{default_limit, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::ReminderStatus;
use crate::repositories;
use crate::schemas::reminder::{
    GenerateRemindersRequest, GenerateRemindersResponse, ReminderResponse, ReminderUpdate,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reminders))
        .route("/:reminder_id", get(get_reminder).patch(update_reminder))
        .route("/generate", post(generate_reminders))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    status: Option<ReminderStatus>,
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

async fn list_reminders(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Query(query): Query<ListQuery>,
) -> Result<Json<PaginatedResponse<ReminderResponse>>, ApiError> {
    let limit = query.limit.clamp(1, 500);
    let skip = query.skip.max(0);

    let (reminders, total_count) = match &principal {
        CurrentPrincipal::Student(student) => {
            let rows = repositories::reminders::list_for_student(
                state.db(),
                &student.id,
                query.status,
                skip,
                limit,
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list reminders"))?;
            let total =
                repositories::reminders::count_for_student(state.db(), &student.id, query.status)
                    .await
                    .map_err(|e| ApiError::internal(e, "Failed to count reminders"))?;
            (rows, total)
        }
        CurrentPrincipal::Admin(_) => {
            let rows = repositories::reminders::list_all(state.db(), query.status, skip, limit)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to list reminders"))?;
            let total = repositories::reminders::count_all(state.db(), query.status)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to count reminders"))?;
            (rows, total)
        }
    };

    Ok(Json(PaginatedResponse {
        items: reminders.into_iter().map(ReminderResponse::from_db).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn get_reminder(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(reminder_id): Path<String>,
) -> Result<Json<ReminderResponse>, ApiError> {
    let reminder = repositories::reminders::find_by_id(state.db(), &reminder_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load reminder"))?
        .ok_or_else(|| ApiError::NotFound("Reminder not found".to_string()))?;

    require_item_access(&state, &principal, &reminder.item_id).await?;

    Ok(Json(ReminderResponse::from_db(reminder)))
}

/// A reminder only moves out of `pending`, either to `sent` or `canceled`.
async fn update_reminder(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(reminder_id): Path<String>,
    Json(payload): Json<ReminderUpdate>,
) -> Result<Json<ReminderResponse>, ApiError> {
    let reminder = repositories::reminders::find_by_id(state.db(), &reminder_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load reminder"))?
        .ok_or_else(|| ApiError::NotFound("Reminder not found".to_string()))?;

    require_item_access(&state, &principal, &reminder.item_id).await?;

    if payload.status == ReminderStatus::Pending {
        return Err(ApiError::BadRequest("Cannot transition back to pending".to_string()));
    }
    if reminder.status != ReminderStatus::Pending {
        return Err(ApiError::Conflict("Reminder is no longer pending".to_string()));
    }

    repositories::reminders::update_status(
        state.db(),
        &reminder.id,
        payload.status,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update reminder"))?;

    let reloaded = repositories::reminders::find_by_id(state.db(), &reminder.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to reload reminder"))?
        .ok_or_else(|| ApiError::NotFound("Reminder not found".to_string()))?;

    Ok(Json(ReminderResponse::from_db(reloaded)))
}

/// Bulk backfill: every incomplete item with a deadline and no pending
/// reminder gets one at the requested (or default) offset.
async fn generate_reminders(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Json(payload): Json<GenerateRemindersRequest>,
) -> Result<Json<GenerateRemindersResponse>, ApiError> {
    let offset_minutes = payload
        .offset_minutes
        .unwrap_or(state.settings().tuton().default_reminder_offset_minutes);
    if offset_minutes <= 0 {
        return Err(ApiError::BadRequest("offset_minutes must be positive".to_string()));
    }

    let created = repositories::reminders::generate_missing(
        state.db(),
        offset_minutes,
        payload.channel,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to generate reminders"))?;

    Ok(Json(GenerateRemindersResponse { created }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    use crate::core::security::PrincipalKind;
    use crate::db::types::{ItemKind, ItemStatus};
    use crate::test_support;

    #[tokio::test]
    async fn student_sees_only_own_reminders() {
        let ctx = test_support::setup_test_context().await;
        let owner =
            test_support::insert_student(ctx.state.db(), "041234567", "Budi", "rahasia-123").await;
        let other =
            test_support::insert_student(ctx.state.db(), "049876543", "Siti", "rahasia-123").await;
        let course = test_support::insert_course(ctx.state.db(), "Statistika").await;

        let enrollment =
            test_support::insert_enrollment(ctx.state.db(), &owner.id, &course.id).await;
        let item = test_support::insert_item(
            ctx.state.db(),
            &enrollment.id,
            ItemKind::Diskusi,
            1,
            ItemStatus::Belum,
        )
        .await;
        test_support::set_item_deadline(ctx.state.db(), &item.id, "2026-04-01T12:00:00Z").await;
        test_support::insert_reminder(ctx.state.db(), &item.id, 60).await;

        let token =
            test_support::bearer_token(&other.id, PrincipalKind::Student, ctx.state.settings());
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/reminders",
                Some(&token),
                None,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = test_support::read_json(response).await;
        assert_eq!(json["total_count"], 0);
    }

    #[tokio::test]
    async fn list_reports_full_total_across_pages() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db(), "ops", "Ops", "rahasia-123").await;
        let student =
            test_support::insert_student(ctx.state.db(), "041234567", "Budi", "rahasia-123").await;
        let course = test_support::insert_course(ctx.state.db(), "Statistika").await;
        let enrollment =
            test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;
        for sesi in 1..=3 {
            let item = test_support::insert_item(
                ctx.state.db(),
                &enrollment.id,
                ItemKind::Diskusi,
                sesi,
                ItemStatus::Belum,
            )
            .await;
            test_support::set_item_deadline(ctx.state.db(), &item.id, "2026-04-01T12:00:00Z")
                .await;
            test_support::insert_reminder(ctx.state.db(), &item.id, 60).await;
        }

        let admin_token =
            test_support::bearer_token(&admin.id, PrincipalKind::Admin, ctx.state.settings());
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/reminders?limit=2",
                Some(&admin_token),
                None,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = test_support::read_json(response).await;
        assert_eq!(json["items"].as_array().expect("items").len(), 2);
        assert_eq!(json["total_count"], 3);

        let student_token =
            test_support::bearer_token(&student.id, PrincipalKind::Student, ctx.state.settings());
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/reminders?limit=1&skip=2",
                Some(&student_token),
                None,
            ))
            .await
            .expect("response");

        let json = test_support::read_json(response).await;
        assert_eq!(json["items"].as_array().expect("items").len(), 1);
        assert_eq!(json["total_count"], 3);
    }

    #[tokio::test]
    async fn pending_reminder_can_be_canceled_once() {
        let ctx = test_support::setup_test_context().await;
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
        test_support::set_item_deadline(ctx.state.db(), &item.id, "2026-04-01T12:00:00Z").await;
        let reminder = test_support::insert_reminder(ctx.state.db(), &item.id, 60).await;
        let token =
            test_support::bearer_token(&student.id, PrincipalKind::Student, ctx.state.settings());

        let uri = format!("/api/v1/reminders/{}", reminder.id);
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &uri,
                Some(&token),
                Some(serde_json::json!({ "status": "canceled" })),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = test_support::read_json(response).await;
        assert_eq!(json["status"], "canceled");

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &uri,
                Some(&token),
                Some(serde_json::json!({ "status": "sent" })),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn generate_backfills_items_with_deadlines() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db(), "ops", "Ops", "rahasia-123").await;
        let student =
            test_support::insert_student(ctx.state.db(), "041234567", "Budi", "rahasia-123").await;
        let course = test_support::insert_course(ctx.state.db(), "Statistika").await;
        let enrollment =
            test_support::insert_enrollment(ctx.state.db(), &student.id, &course.id).await;

        let with_deadline = test_support::insert_item(
            ctx.state.db(),
            &enrollment.id,
            ItemKind::Diskusi,
            1,
            ItemStatus::Belum,
        )
        .await;
        test_support::set_item_deadline(
            ctx.state.db(),
            &with_deadline.id,
            "2026-04-01T12:00:00Z",
        )
        .await;
        // No deadline, should be skipped.
        test_support::insert_item(
            ctx.state.db(),
            &enrollment.id,
            ItemKind::Absen,
            1,
            ItemStatus::Belum,
        )
        .await;

        let token =
            test_support::bearer_token(&admin.id, PrincipalKind::Admin, ctx.state.settings());
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/reminders/generate",
                Some(&token),
                Some(serde_json::json!({})),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = test_support::read_json(response).await;
        assert_eq!(json["created"], 1);

        // Second run is a no-op: the pending reminder already exists.
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/reminders/generate",
                Some(&token),
                Some(serde_json::json!({})),
            ))
            .await
            .expect("response");
        let json = test_support::read_json(response).await;
        assert_eq!(json["created"], 0);
    }

    #[tokio::test]
    async fn generate_requires_admin() {
        let ctx = test_support::setup_test_context().await;
        let student =
            test_support::insert_student(ctx.state.db(), "041234567", "Budi", "rahasia-123").await;
        let token =
            test_support::bearer_token(&student.id, PrincipalKind::Student, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/reminders/generate",
                Some(&token),
                Some(serde_json::json!({})),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
