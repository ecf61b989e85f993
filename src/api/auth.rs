use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentPrincipal;
use crate::core::security::{self, PrincipalKind};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Admin, Student};
use crate::repositories;
use crate::schemas::admin::{AdminLogin, AdminResponse};
use crate::schemas::auth::{AdminTokenResponse, TokenResponse};
use crate::schemas::student::{StudentLogin, StudentRegister, StudentResponse};

/// Max attempts per window for auth endpoints.
const AUTH_RATE_LIMIT: u64 = 10;
/// Rate limit window in seconds.
const AUTH_RATE_WINDOW_SECONDS: u64 = 60;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/admin/login", post(admin_login))
        .route("/me", get(me))
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<StudentRegister>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let rate_key = format!("rl:register:{}", payload.nim);
    let allowed = state
        .redis()
        .rate_limit(&rate_key, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many registration attempts, try again later"));
    }

    let existing = repositories::students::exists_by_nim(state.db(), &payload.nim)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing student"))?;

    if existing.is_some() {
        return Err(ApiError::Conflict("Student with this NIM already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let now = primitive_now_utc();

    let student = repositories::students::create(
        state.db(),
        repositories::students::CreateStudent {
            id: &Uuid::new_v4().to_string(),
            nim: &payload.nim,
            nama: &payload.nama,
            no_hp: &payload.no_hp,
            hashed_password,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create student"))?;

    let token =
        security::create_access_token(&student.id, PrincipalKind::Student, state.settings(), None)
            .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    let response = TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        student: StudentResponse::from_db(student),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<StudentLogin>,
) -> Result<Json<TokenResponse>, ApiError> {
    let rate_key = format!("rl:login:{}", payload.nim);
    let allowed = state
        .redis()
        .rate_limit(&rate_key, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many login attempts, try again later"));
    }

    let student = fetch_student_by_nim(&state, &payload.nim).await?;

    let verified = security::verify_password(&payload.password, &student.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Incorrect NIM or password"))?;

    if !verified {
        return Err(ApiError::Unauthorized("Incorrect NIM or password"));
    }

    if !student.is_active {
        return Err(ApiError::BadRequest("Inactive student".to_string()));
    }

    let token =
        security::create_access_token(&student.id, PrincipalKind::Student, state.settings(), None)
            .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        student: StudentResponse::from_db(student),
    }))
}

async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLogin>,
) -> Result<Json<AdminTokenResponse>, ApiError> {
    let rate_key = format!("rl:admin-login:{}", payload.username);
    let allowed = state
        .redis()
        .rate_limit(&rate_key, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many login attempts, try again later"));
    }

    let admin = fetch_admin_by_username(&state, &payload.username).await?;

    let verified = security::verify_password(&payload.password, &admin.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Incorrect username or password"))?;

    if !verified {
        return Err(ApiError::Unauthorized("Incorrect username or password"));
    }

    if !admin.is_active {
        return Err(ApiError::BadRequest("Inactive admin".to_string()));
    }

    let token =
        security::create_access_token(&admin.id, PrincipalKind::Admin, state.settings(), None)
            .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok(Json(AdminTokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        admin: AdminResponse::from_db(admin),
    }))
}

async fn me(principal: CurrentPrincipal) -> Result<Json<serde_json::Value>, ApiError> {
    let profile = match principal {
        CurrentPrincipal::Student(student) => {
            serde_json::to_value(StudentResponse::from_db(student))
        }
        CurrentPrincipal::Admin(admin) => serde_json::to_value(AdminResponse::from_db(admin)),
    }
    .map_err(|e| ApiError::internal(e, "Failed to serialize profile"))?;

    Ok(Json(profile))
}

async fn fetch_student_by_nim(state: &AppState, nim: &str) -> Result<Student, ApiError> {
    repositories::students::find_by_nim(state.db(), nim)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load student"))?
        .ok_or(ApiError::Unauthorized("Incorrect NIM or password"))
}

async fn fetch_admin_by_username(state: &AppState, username: &str) -> Result<Admin, ApiError> {
    repositories::admins::find_by_username(state.db(), username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load admin"))?
        .ok_or(ApiError::Unauthorized("Incorrect username or password"))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    use crate::core::security::PrincipalKind;
    use crate::test_support;

    #[tokio::test]
    async fn login_attempts_are_rate_limited_per_nim() {
        let ctx = test_support::setup_test_context().await;

        let body = serde_json::json!({ "nim": "041234567", "password": "wrong-password" });
        for _ in 0..super::AUTH_RATE_LIMIT {
            let response = ctx
                .app
                .clone()
                .oneshot(test_support::json_request(
                    Method::POST,
                    "/api/v1/auth/login",
                    None,
                    Some(body.clone()),
                ))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(body),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn register_creates_student_and_returns_token() {
        let ctx = test_support::setup_test_context().await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(serde_json::json!({
                    "nim": "041234567",
                    "nama": "Budi Santoso",
                    "noHp": "081234567890",
                    "password": "rahasia-123"
                })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = test_support::read_json(response).await;
        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["student"]["nim"], "041234567");
        assert!(json["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn register_rejects_bad_nim() {
        let ctx = test_support::setup_test_context().await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(serde_json::json!({
                    "nim": "12345",
                    "nama": "Budi",
                    "noHp": "081234567890",
                    "password": "rahasia-123"
                })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_duplicate_nim_conflicts() {
        let ctx = test_support::setup_test_context().await;
        test_support::insert_student(ctx.state.db(), "041234567", "Budi", "password-1").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(serde_json::json!({
                    "nim": "041234567",
                    "nama": "Budi Dua",
                    "noHp": "081234567890",
                    "password": "rahasia-123"
                })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn login_returns_token_for_valid_credentials() {
        let ctx = test_support::setup_test_context().await;
        test_support::insert_student(ctx.state.db(), "041234567", "Budi", "rahasia-123").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({ "nim": "041234567", "password": "rahasia-123" })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let ctx = test_support::setup_test_context().await;
        test_support::insert_student(ctx.state.db(), "041234567", "Budi", "rahasia-123").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({ "nim": "041234567", "password": "salah-semua" })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_login_and_me_roundtrip() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db(), "ops", "Operator", "rahasia-123")
            .await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/admin/login",
                None,
                Some(serde_json::json!({ "username": "ops", "password": "rahasia-123" })),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = test_support::read_json(response).await;
        assert_eq!(json["admin"]["username"], "ops");

        let token =
            test_support::bearer_token(&admin.id, PrincipalKind::Admin, ctx.state.settings());
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/auth/me",
                Some(&token),
                None,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = test_support::read_json(response).await;
        assert_eq!(json["username"], "ops");
    }

    #[tokio::test]
    async fn me_without_token_is_unauthorized() {
        let ctx = test_support::setup_test_context().await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::GET, "/api/v1/auth/me", None, None))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
