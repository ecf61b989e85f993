use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::types::AdminRole;

#[derive(Debug, Deserialize)]
pub(crate) struct AdminLogin {
    pub(crate) username: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AdminCreate {
    #[validate(length(min = 3, message = "username must be at least 3 characters"))]
    pub(crate) username: String,
    #[validate(length(min = 1, message = "nama must not be empty"))]
    pub(crate) nama: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub(crate) password: String,
    #[serde(default = "default_role")]
    pub(crate) role: AdminRole,
    #[serde(default = "default_true")]
    #[serde(alias = "isActive")]
    pub(crate) is_active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AdminUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "nama must not be empty"))]
    pub(crate) nama: Option<String>,
    #[serde(default)]
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub(crate) password: Option<String>,
    #[serde(default)]
    pub(crate) role: Option<AdminRole>,
    #[serde(default)]
    #[serde(alias = "isActive")]
    pub(crate) is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) nama: String,
    pub(crate) role: AdminRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl AdminResponse {
    pub(crate) fn from_db(admin: crate::db::models::Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            nama: admin.nama,
            role: admin.role,
            is_active: admin.is_active,
            created_at: format_primitive(admin.created_at),
            updated_at: format_primitive(admin.updated_at),
        }
    }
}

fn default_role() -> AdminRole {
    AdminRole::Operator
}

fn default_true() -> bool {
    true
}
