use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_superadmin, CurrentAdmin};
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db;
use crate::repositories;
use crate::schemas::admin::{AdminCreate, AdminResponse, AdminUpdate};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_admins).post(create_admin))
        .route("/:admin_id", get(get_admin).patch(update_admin))
}

async fn list_admins(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
) -> Result<Json<Vec<AdminResponse>>, ApiError> {
    require_superadmin(&admin)?;

    let admins = repositories::admins::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list admins"))?;

    Ok(Json(admins.into_iter().map(AdminResponse::from_db).collect()))
}

async fn create_admin(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Json(payload): Json<AdminCreate>,
) -> Result<(StatusCode, Json<AdminResponse>), ApiError> {
    require_superadmin(&admin)?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    let now = primitive_now_utc();

    let created = repositories::admins::create(
        state.db(),
        repositories::admins::CreateAdmin {
            id: &Uuid::new_v4().to_string(),
            username: &payload.username,
            nama: &payload.nama,
            hashed_password,
            role: payload.role,
            is_active: payload.is_active,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| {
        if db::is_unique_violation(&e) {
            ApiError::Conflict("Admin with this username already exists".to_string())
        } else {
            ApiError::internal(e, "Failed to create admin")
        }
    })?;

    Ok((StatusCode::CREATED, Json(AdminResponse::from_db(created))))
}

async fn get_admin(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(admin_id): Path<String>,
) -> Result<Json<AdminResponse>, ApiError> {
    require_superadmin(&admin)?;

    let found = repositories::admins::find_by_id(state.db(), &admin_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load admin"))?
        .ok_or_else(|| ApiError::NotFound("Admin not found".to_string()))?;

    Ok(Json(AdminResponse::from_db(found)))
}

async fn update_admin(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(admin_id): Path<String>,
    Json(payload): Json<AdminUpdate>,
) -> Result<Json<AdminResponse>, ApiError> {
    require_superadmin(&admin)?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let existing = repositories::admins::find_by_id(state.db(), &admin_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load admin"))?;
    if existing.is_none() {
        return Err(ApiError::NotFound("Admin not found".to_string()));
    }

    let hashed_password = match payload.password.as_deref() {
        Some(password) => Some(
            security::hash_password(password)
                .map_err(|e| ApiError::internal(e, "Failed to hash password"))?,
        ),
        None => None,
    };

    repositories::admins::update(
        state.db(),
        &admin_id,
        repositories::admins::UpdateAdmin {
            nama: payload.nama,
            hashed_password,
            role: payload.role,
            is_active: payload.is_active,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update admin"))?;

    let reloaded = repositories::admins::fetch_one_by_id(state.db(), &admin_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to reload admin"))?;

    Ok(Json(AdminResponse::from_db(reloaded)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    use crate::core::security::PrincipalKind;
    use crate::db::types::AdminRole;
    use crate::test_support;

    #[tokio::test]
    async fn operator_cannot_list_admins() {
        let ctx = test_support::setup_test_context().await;
        let operator = test_support::insert_admin_with_role(
            ctx.state.db(),
            "ops",
            "Ops",
            "rahasia-123",
            AdminRole::Operator,
        )
        .await;
        let token =
            test_support::bearer_token(&operator.id, PrincipalKind::Admin, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::GET, "/api/v1/admins", Some(&token), None))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn superadmin_creates_operator() {
        let ctx = test_support::setup_test_context().await;
        let root = test_support::insert_admin_with_role(
            ctx.state.db(),
            "root",
            "Root",
            "rahasia-123",
            AdminRole::Superadmin,
        )
        .await;
        let token =
            test_support::bearer_token(&root.id, PrincipalKind::Admin, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/admins",
                Some(&token),
                Some(serde_json::json!({
                    "username": "helpdesk",
                    "nama": "Help Desk",
                    "password": "rahasia-123"
                })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = test_support::read_json(response).await;
        assert_eq!(json["role"], "operator");
    }

    #[tokio::test]
    async fn superadmin_deactivates_operator() {
        let ctx = test_support::setup_test_context().await;
        let root = test_support::insert_admin_with_role(
            ctx.state.db(),
            "root",
            "Root",
            "rahasia-123",
            AdminRole::Superadmin,
        )
        .await;
        let operator = test_support::insert_admin(ctx.state.db(), "ops", "Ops", "rahasia-123")
            .await;
        let token =
            test_support::bearer_token(&root.id, PrincipalKind::Admin, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &format!("/api/v1/admins/{}", operator.id),
                Some(&token),
                Some(serde_json::json!({ "isActive": false })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = test_support::read_json(response).await;
        assert_eq!(json["is_active"], false);
    }
}
