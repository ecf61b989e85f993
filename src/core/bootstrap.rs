use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::AdminRole;
use crate::repositories;

pub(crate) async fn ensure_superadmin(state: &AppState) -> anyhow::Result<()> {
    let admin_settings = state.settings().admin();
    if admin_settings.first_superadmin_password.is_empty() {
        tracing::warn!("FIRST_SUPERADMIN_PASSWORD not configured; skipping superadmin creation");
        return Ok(());
    }

    let username = &admin_settings.first_superadmin_username;
    let existing = repositories::admins::find_by_username(state.db(), username).await?;
    let now = primitive_now_utc();

    if let Some(admin) = existing {
        let verified =
            security::verify_password(&admin_settings.first_superadmin_password, &admin.hashed_password)
                .unwrap_or(false);

        let needs_update = !verified || admin.role != AdminRole::Superadmin || !admin.is_active;
        if !needs_update {
            tracing::info!("Default superadmin already up to date");
            return Ok(());
        }

        let hashed_password = if verified {
            admin.hashed_password.clone()
        } else {
            security::hash_password(&admin_settings.first_superadmin_password)?
        };

        sqlx::query(
            "UPDATE admins
             SET hashed_password = $1, role = $2, is_active = TRUE, updated_at = $3
             WHERE id = $4",
        )
        .bind(hashed_password)
        .bind(AdminRole::Superadmin)
        .bind(now)
        .bind(admin.id)
        .execute(state.db())
        .await?;

        tracing::info!("Updated default superadmin {username}");
        return Ok(());
    }

    let hashed_password = security::hash_password(&admin_settings.first_superadmin_password)?;

    repositories::admins::create(
        state.db(),
        repositories::admins::CreateAdmin {
            id: &Uuid::new_v4().to_string(),
            username,
            nama: "Super Admin",
            hashed_password,
            role: AdminRole::Superadmin,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    tracing::info!("Created default superadmin {username}");
    Ok(())
}
