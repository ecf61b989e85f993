use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::security::{self, PrincipalKind};
use crate::core::state::AppState;
use crate::db::models::{Admin, Enrollment, Student};
use crate::db::types::AdminRole;
use crate::repositories;

pub(crate) struct CurrentStudent(pub(crate) Student);
pub(crate) struct CurrentAdmin(pub(crate) Admin);

/// Either side of the auth model; used where both students and admins
/// may call the endpoint.
pub(crate) enum CurrentPrincipal {
    Student(Student),
    Admin(Admin),
}

fn extract_claims(parts: &Parts, state: &AppState) -> Result<security::Claims, ApiError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

    security::verify_token(token, state.settings())
        .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let claims = extract_claims(parts, &app_state)?;
        if claims.kind != PrincipalKind::Student {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        let student = repositories::students::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load student"))?;

        let Some(student) = student else {
            return Err(ApiError::Unauthorized("Student not found"));
        };

        if !student.is_active {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        Ok(CurrentStudent(student))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let claims = extract_claims(parts, &app_state)?;
        if claims.kind != PrincipalKind::Admin {
            return Err(ApiError::Forbidden("Admin access required"));
        }

        let admin = repositories::admins::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load admin"))?;

        let Some(admin) = admin else {
            return Err(ApiError::Unauthorized("Admin not found"));
        };

        if !admin.is_active {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        Ok(CurrentAdmin(admin))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let claims = extract_claims(parts, &app_state)?;
        match claims.kind {
            PrincipalKind::Student => {
                let CurrentStudent(student) =
                    CurrentStudent::from_request_parts(parts, state).await?;
                Ok(CurrentPrincipal::Student(student))
            }
            PrincipalKind::Admin => {
                let CurrentAdmin(admin) = CurrentAdmin::from_request_parts(parts, state).await?;
                Ok(CurrentPrincipal::Admin(admin))
            }
        }
    }
}

pub(crate) fn require_superadmin(admin: &Admin) -> Result<(), ApiError> {
    if admin.role == AdminRole::Superadmin {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Superadmin access required"))
    }
}

/// Loads an enrollment and checks the caller may touch it. Admins see
/// everything, students only their own enrollments.
pub(crate) async fn require_enrollment_access(
    state: &AppState,
    principal: &CurrentPrincipal,
    enrollment_id: &str,
) -> Result<Enrollment, ApiError> {
    let enrollment = repositories::enrollments::find_by_id(state.db(), enrollment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load enrollment"))?
        .ok_or_else(|| ApiError::NotFound("Enrollment not found".to_string()))?;

    match principal {
        CurrentPrincipal::Admin(_) => Ok(enrollment),
        CurrentPrincipal::Student(student) if student.id == enrollment.student_id => Ok(enrollment),
        CurrentPrincipal::Student(_) => {
            Err(ApiError::Forbidden("Not enough permissions for this enrollment"))
        }
    }
}

/// Same check, entered through an item id.
pub(crate) async fn require_item_access(
    state: &AppState,
    principal: &CurrentPrincipal,
    item_id: &str,
) -> Result<crate::db::models::TutonItem, ApiError> {
    let item = repositories::items::find_by_id(state.db(), item_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load item"))?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    require_enrollment_access(state, principal, &item.enrollment_id).await?;
    Ok(item)
}
