use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::Duration;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_item_access, CurrentPrincipal};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::{ItemKind, ItemStatus};
use crate::repositories;
use crate::schemas::item::{ItemResponse, ItemUpdate};
use crate::schemas::reminder::{ReminderCreate, ReminderResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:item_id", get(get_item).patch(update_item).delete(delete_item))
        .route("/:item_id/reminders", post(create_reminder).get(list_item_reminders))
}

async fn get_item(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(item_id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item = require_item_access(&state, &principal, &item_id).await?;
    Ok(Json(ItemResponse::from_db(item)))
}

async fn update_item(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(item_id): Path<String>,
    Json(payload): Json<ItemUpdate>,
) -> Result<Json<ItemResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let item = require_item_access(&state, &principal, &item_id).await?;

    let new_status = payload.status.unwrap_or(item.status);
    if payload.nilai.is_some() && new_status != ItemStatus::Selesai {
        return Err(ApiError::BadRequest(
            "nilai can only be set on a completed item".to_string(),
        ));
    }

    let now = primitive_now_utc();
    let completing = new_status == ItemStatus::Selesai && item.status != ItemStatus::Selesai;
    let reverting = new_status == ItemStatus::Belum && item.status == ItemStatus::Selesai;

    // Status change and reminder cancelation commit together.
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    repositories::items::update(
        &mut tx,
        &item.id,
        repositories::items::UpdateItem {
            status: payload.status,
            nilai: payload.nilai,
            deskripsi: payload.deskripsi,
            selesai_at: completing.then_some(now),
            clear_selesai_at: reverting,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update item"))?;

    if reverting {
        repositories::reminders::cancel_pending_for_item(&mut tx, &item.id, now)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to cancel reminders"))?;
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit item update"))?;

    let item = repositories::items::fetch_one_by_id(state.db(), &item.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to reload item"))?;

    Ok(Json(ItemResponse::from_db(item)))
}

async fn delete_item(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let item = require_item_access(&state, &principal, &item_id).await?;

    if item.jenis != ItemKind::Quiz {
        return Err(ApiError::BadRequest("Only quiz items can be deleted".to_string()));
    }

    repositories::items::delete_by_id(state.db(), &item.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete item"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn create_reminder(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(item_id): Path<String>,
    Json(payload): Json<ReminderCreate>,
) -> Result<(StatusCode, Json<ReminderResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let item = require_item_access(&state, &principal, &item_id).await?;

    let Some(deadline_at) = item.deadline_at else {
        return Err(ApiError::BadRequest(
            "Item has no deadline to attach a reminder to".to_string(),
        ));
    };

    let offset_minutes = payload
        .offset_minutes
        .unwrap_or(state.settings().tuton().default_reminder_offset_minutes);
    let remind_at = deadline_at - Duration::minutes(i64::from(offset_minutes));

    let reminder = repositories::reminders::create(
        state.db(),
        repositories::reminders::CreateReminder {
            id: &Uuid::new_v4().to_string(),
            item_id: &item.id,
            offset_minutes,
            channel: payload.channel,
            remind_at,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create reminder"))?;

    Ok((StatusCode::CREATED, Json(ReminderResponse::from_db(reminder))))
}

async fn list_item_reminders(
    State(state): State<AppState>,
    principal: CurrentPrincipal,
    Path(item_id): Path<String>,
) -> Result<Json<Vec<ReminderResponse>>, ApiError> {
    let item = require_item_access(&state, &principal, &item_id).await?;

    let reminders = repositories::reminders::list_for_item(state.db(), &item.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list reminders"))?;

    Ok(Json(reminders.into_iter().map(ReminderResponse::from_db).collect()))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    use crate::core::security::PrincipalKind;
    use crate::db::types::{ItemKind, ItemStatus, ReminderStatus};
    use crate::test_support;

    async fn setup_item(
        ctx: &test_support::TestContext,
        status: ItemStatus,
    ) -> (String, crate::db::models::TutonItem) {
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
            status,
        )
        .await;
        let token =
            test_support::bearer_token(&student.id, PrincipalKind::Student, ctx.state.settings());
        (token, item)
    }

    #[tokio::test]
    async fn completing_sets_selesai_at() {
        let ctx = test_support::setup_test_context().await;
        let (token, item) = setup_item(&ctx, ItemStatus::Belum).await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &format!("/api/v1/items/{}", item.id),
                Some(&token),
                Some(serde_json::json!({ "status": "selesai", "nilai": 85 })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = test_support::read_json(response).await;
        assert_eq!(json["status"], "selesai");
        assert_eq!(json["nilai"], 85);
        assert!(json["selesai_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn nilai_without_selesai_is_rejected() {
        let ctx = test_support::setup_test_context().await;
        let (token, item) = setup_item(&ctx, ItemStatus::Belum).await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &format!("/api/v1/items/{}", item.id),
                Some(&token),
                Some(serde_json::json!({ "nilai": 85 })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reverting_clears_selesai_at_and_cancels_reminders() {
        let ctx = test_support::setup_test_context().await;
        let (token, item) = setup_item(&ctx, ItemStatus::Selesai).await;
        test_support::set_item_deadline(ctx.state.db(), &item.id, "2026-04-01T12:00:00Z").await;
        let reminder = test_support::insert_reminder(ctx.state.db(), &item.id, 60).await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &format!("/api/v1/items/{}", item.id),
                Some(&token),
                Some(serde_json::json!({ "status": "belum" })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = test_support::read_json(response).await;
        assert_eq!(json["status"], "belum");
        assert!(json["selesai_at"].is_null());

        let reloaded = crate::repositories::reminders::find_by_id(ctx.state.db(), &reminder.id)
            .await
            .expect("query")
            .expect("reminder");
        assert_eq!(reloaded.status, ReminderStatus::Canceled);
    }

    #[tokio::test]
    async fn only_quiz_items_can_be_deleted() {
        let ctx = test_support::setup_test_context().await;
        let (token, item) = setup_item(&ctx, ItemStatus::Belum).await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::DELETE,
                &format!("/api/v1/items/{}", item.id),
                Some(&token),
                None,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reminder_requires_deadline() {
        let ctx = test_support::setup_test_context().await;
        let (token, item) = setup_item(&ctx, ItemStatus::Belum).await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &format!("/api/v1/items/{}/reminders", item.id),
                Some(&token),
                Some(serde_json::json!({ "offsetMinutes": 120 })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reminder_is_scheduled_before_deadline() {
        let ctx = test_support::setup_test_context().await;
        let (token, item) = setup_item(&ctx, ItemStatus::Belum).await;
        test_support::set_item_deadline(ctx.state.db(), &item.id, "2026-04-01T12:00:00Z").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &format!("/api/v1/items/{}/reminders", item.id),
                Some(&token),
                Some(serde_json::json!({ "offsetMinutes": 120 })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = test_support::read_json(response).await;
        assert_eq!(json["status"], "pending");
        assert_eq!(json["remind_at"], "2026-04-01T10:00:00Z");
    }
}
