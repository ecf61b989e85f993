use serde::Serialize;

use crate::db::types::ItemKind;

#[derive(Debug, Serialize)]
pub(crate) struct JenisProgress {
    pub(crate) jenis: ItemKind,
    pub(crate) total: i64,
    pub(crate) selesai: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseProgress {
    pub(crate) enrollment_id: String,
    pub(crate) course_id: String,
    pub(crate) course_nama: String,
    pub(crate) by_jenis: Vec<JenisProgress>,
    pub(crate) total: i64,
    pub(crate) selesai: i64,
    pub(crate) completion_percent: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpcomingItem {
    pub(crate) item_id: String,
    pub(crate) course_nama: String,
    pub(crate) jenis: ItemKind,
    pub(crate) sesi: i16,
    pub(crate) deadline_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentDashboardResponse {
    pub(crate) courses: Vec<CourseProgress>,
    pub(crate) upcoming: Vec<UpcomingItem>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminTotalsResponse {
    pub(crate) students: i64,
    pub(crate) courses: i64,
    pub(crate) enrollments: i64,
    pub(crate) items: i64,
    pub(crate) items_selesai: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseCompletionResponse {
    pub(crate) course_id: String,
    pub(crate) course_nama: String,
    pub(crate) enrollments: i64,
    pub(crate) items: i64,
    pub(crate) items_selesai: i64,
    pub(crate) completion_percent: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminDashboardResponse {
    pub(crate) totals: AdminTotalsResponse,
    pub(crate) courses: Vec<CourseCompletionResponse>,
}
