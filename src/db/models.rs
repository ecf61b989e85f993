use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{AdminRole, ItemKind, ItemStatus, ReminderChannel, ReminderStatus};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Student {
    pub(crate) id: String,
    pub(crate) nim: String,
    pub(crate) nama: String,
    pub(crate) no_hp: String,
    pub(crate) hashed_password: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Admin {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) nama: String,
    pub(crate) hashed_password: String,
    pub(crate) role: AdminRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Course {
    pub(crate) id: String,
    pub(crate) nama: String,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Enrollment {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TutonItem {
    pub(crate) id: String,
    pub(crate) enrollment_id: String,
    pub(crate) jenis: ItemKind,
    pub(crate) sesi: i16,
    pub(crate) status: ItemStatus,
    pub(crate) nilai: Option<i32>,
    pub(crate) deskripsi: Option<String>,
    pub(crate) deadline_at: Option<PrimitiveDateTime>,
    pub(crate) selesai_at: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct SessionWindow {
    pub(crate) id: String,
    pub(crate) jenis: ItemKind,
    pub(crate) sesi: i16,
    pub(crate) start_at: PrimitiveDateTime,
    pub(crate) end_at: PrimitiveDateTime,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Reminder {
    pub(crate) id: String,
    pub(crate) item_id: String,
    pub(crate) offset_minutes: i32,
    pub(crate) channel: ReminderChannel,
    pub(crate) status: ReminderStatus,
    pub(crate) remind_at: PrimitiveDateTime,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}
