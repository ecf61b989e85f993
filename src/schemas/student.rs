use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::validation::{validate_nim, validate_no_hp};
use crate::core::time::format_primitive;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StudentRegister {
    #[validate(custom(function = validate_nim))]
    pub(crate) nim: String,
    #[validate(length(min = 1, message = "nama must not be empty"))]
    pub(crate) nama: String,
    #[serde(alias = "noHp")]
    #[validate(custom(function = validate_no_hp))]
    pub(crate) no_hp: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentLogin {
    pub(crate) nim: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AdminStudentCreate {
    #[validate(custom(function = validate_nim))]
    pub(crate) nim: String,
    #[validate(length(min = 1, message = "nama must not be empty"))]
    pub(crate) nama: String,
    #[serde(alias = "noHp")]
    #[validate(custom(function = validate_no_hp))]
    pub(crate) no_hp: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub(crate) password: String,
    #[serde(default = "default_true")]
    #[serde(alias = "isActive")]
    pub(crate) is_active: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AdminStudentUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "nama must not be empty"))]
    pub(crate) nama: Option<String>,
    #[serde(default)]
    #[serde(alias = "noHp")]
    pub(crate) no_hp: Option<String>,
    #[serde(default)]
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub(crate) password: Option<String>,
    #[serde(default)]
    #[serde(alias = "isActive")]
    pub(crate) is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentResponse {
    pub(crate) id: String,
    pub(crate) nim: String,
    pub(crate) nama: String,
    pub(crate) no_hp: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl StudentResponse {
    pub(crate) fn from_db(student: crate::db::models::Student) -> Self {
        Self {
            id: student.id,
            nim: student.nim,
            nama: student.nama,
            no_hp: student.no_hp,
            is_active: student.is_active,
            created_at: format_primitive(student.created_at),
            updated_at: format_primitive(student.updated_at),
        }
    }
}

fn default_true() -> bool {
    true
}
