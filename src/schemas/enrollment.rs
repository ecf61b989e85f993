use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::validation::validate_quiz_sesi;
use crate::core::time::format_primitive;
use crate::schemas::item::ItemResponse;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct EnrollmentCreate {
    #[serde(alias = "courseId")]
    pub(crate) course_id: String,
    #[serde(default)]
    #[serde(alias = "quizSesi")]
    #[validate(custom(function = validate_quiz_sesi))]
    pub(crate) quiz_sesi: Vec<i16>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrollmentResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) created_at: String,
}

impl EnrollmentResponse {
    pub(crate) fn from_db(enrollment: crate::db::models::Enrollment) -> Self {
        Self {
            id: enrollment.id,
            student_id: enrollment.student_id,
            course_id: enrollment.course_id,
            created_at: format_primitive(enrollment.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrollmentDetailResponse {
    pub(crate) enrollment: EnrollmentResponse,
    pub(crate) items: Vec<ItemResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrollmentSummaryResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) course_nama: String,
    pub(crate) total_items: i64,
    pub(crate) selesai_items: i64,
    pub(crate) created_at: String,
}

impl EnrollmentSummaryResponse {
    pub(crate) fn from_row(row: crate::repositories::enrollments::EnrollmentSummaryRow) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            course_id: row.course_id,
            course_nama: row.course_nama,
            total_items: row.total_items,
            selesai_items: row.selesai_items,
            created_at: format_primitive(row.created_at),
        }
    }
}
