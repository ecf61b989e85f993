use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::types::{ItemKind, ItemStatus};
use crate::schemas::session_window::deserialize_option_primitive_flexible;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuizItemCreate {
    #[validate(range(min = 1, max = 8, message = "sesi must be between 1 and 8"))]
    pub(crate) sesi: i16,
    #[serde(default)]
    pub(crate) deskripsi: Option<String>,
    #[serde(
        default,
        alias = "deadlineAt",
        deserialize_with = "deserialize_option_primitive_flexible"
    )]
    pub(crate) deadline_at: Option<time::PrimitiveDateTime>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ItemUpdate {
    #[serde(default)]
    pub(crate) status: Option<ItemStatus>,
    #[serde(default)]
    #[validate(range(min = 0, max = 100, message = "nilai must be between 0 and 100"))]
    pub(crate) nilai: Option<i32>,
    #[serde(default)]
    pub(crate) deskripsi: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ItemResponse {
    pub(crate) id: String,
    pub(crate) enrollment_id: String,
    pub(crate) jenis: ItemKind,
    pub(crate) sesi: i16,
    pub(crate) status: ItemStatus,
    pub(crate) nilai: Option<i32>,
    pub(crate) deskripsi: Option<String>,
    pub(crate) deadline_at: Option<String>,
    pub(crate) selesai_at: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ItemResponse {
    pub(crate) fn from_db(item: crate::db::models::TutonItem) -> Self {
        Self {
            id: item.id,
            enrollment_id: item.enrollment_id,
            jenis: item.jenis,
            sesi: item.sesi,
            status: item.status,
            nilai: item.nilai,
            deskripsi: item.deskripsi,
            deadline_at: item.deadline_at.map(format_primitive),
            selesai_at: item.selesai_at.map(format_primitive),
            created_at: format_primitive(item.created_at),
            updated_at: format_primitive(item.updated_at),
        }
    }
}
