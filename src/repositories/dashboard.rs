use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::types::ItemKind;

/// One (enrollment, jenis) bucket with its completion counts.
#[derive(Debug, FromRow)]
pub(crate) struct ProgressRow {
    pub(crate) enrollment_id: String,
    pub(crate) course_id: String,
    pub(crate) course_nama: String,
    pub(crate) jenis: ItemKind,
    pub(crate) total: i64,
    pub(crate) selesai: i64,
}

pub(crate) async fn progress_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<ProgressRow>, sqlx::Error> {
    sqlx::query_as::<_, ProgressRow>(
        "SELECT e.id AS enrollment_id, c.id AS course_id, c.nama AS course_nama,
                i.jenis,
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE i.status = 'selesai') AS selesai
         FROM enrollments e
         JOIN courses c ON c.id = e.course_id
         JOIN tuton_items i ON i.enrollment_id = e.id
         WHERE e.student_id = $1
         GROUP BY e.id, c.id, c.nama, i.jenis
         ORDER BY c.nama, i.jenis",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}

/// An incomplete item with a deadline, joined with its course for display.
#[derive(Debug, FromRow)]
pub(crate) struct UpcomingRow {
    pub(crate) item_id: String,
    pub(crate) course_nama: String,
    pub(crate) jenis: ItemKind,
    pub(crate) sesi: i16,
    pub(crate) deadline_at: PrimitiveDateTime,
}

pub(crate) async fn upcoming_for_student(
    pool: &PgPool,
    student_id: &str,
    after: PrimitiveDateTime,
    limit: i64,
) -> Result<Vec<UpcomingRow>, sqlx::Error> {
    sqlx::query_as::<_, UpcomingRow>(
        "SELECT i.id AS item_id, c.nama AS course_nama, i.jenis, i.sesi, i.deadline_at
         FROM tuton_items i
         JOIN enrollments e ON e.id = i.enrollment_id
         JOIN courses c ON c.id = e.course_id
         WHERE e.student_id = $1
           AND i.status = 'belum'
           AND i.deadline_at IS NOT NULL
           AND i.deadline_at >= $2
         ORDER BY i.deadline_at
         LIMIT $3",
    )
    .bind(student_id)
    .bind(after)
    .bind(limit)
    .fetch_all(pool)
    .await
}

#[derive(Debug, FromRow)]
pub(crate) struct AdminTotals {
    pub(crate) students: i64,
    pub(crate) courses: i64,
    pub(crate) enrollments: i64,
    pub(crate) items: i64,
    pub(crate) items_selesai: i64,
}

pub(crate) async fn admin_totals(pool: &PgPool) -> Result<AdminTotals, sqlx::Error> {
    sqlx::query_as::<_, AdminTotals>(
        "SELECT
            (SELECT COUNT(*) FROM students) AS students,
            (SELECT COUNT(*) FROM courses) AS courses,
            (SELECT COUNT(*) FROM enrollments) AS enrollments,
            (SELECT COUNT(*) FROM tuton_items) AS items,
            (SELECT COUNT(*) FROM tuton_items WHERE status = 'selesai') AS items_selesai",
    )
    .fetch_one(pool)
    .await
}

/// Per-course enrollment counts and item completion for the admin view.
#[derive(Debug, FromRow)]
pub(crate) struct CourseCompletionRow {
    pub(crate) course_id: String,
    pub(crate) course_nama: String,
    pub(crate) enrollments: i64,
    pub(crate) items: i64,
    pub(crate) items_selesai: i64,
}

pub(crate) async fn completion_per_course(
    pool: &PgPool,
) -> Result<Vec<CourseCompletionRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseCompletionRow>(
        "SELECT c.id AS course_id, c.nama AS course_nama,
                COUNT(DISTINCT e.id) AS enrollments,
                COUNT(i.id) AS items,
                COUNT(i.id) FILTER (WHERE i.status = 'selesai') AS items_selesai
         FROM courses c
         LEFT JOIN enrollments e ON e.course_id = c.id
         LEFT JOIN tuton_items i ON i.enrollment_id = e.id
         GROUP BY c.id, c.nama
         ORDER BY c.nama",
    )
    .fetch_all(pool)
    .await
}

/// One enrollment flattened for the progress report export.
#[derive(Debug, FromRow)]
pub(crate) struct ReportRow {
    pub(crate) nim: String,
    pub(crate) student_nama: String,
    pub(crate) course_nama: String,
    pub(crate) total: i64,
    pub(crate) selesai: i64,
    pub(crate) diskusi_selesai: i64,
    pub(crate) absen_selesai: i64,
    pub(crate) tugas_selesai: i64,
    pub(crate) quiz_selesai: i64,
}

pub(crate) async fn report_rows(
    pool: &PgPool,
    course_id: Option<&str>,
) -> Result<Vec<ReportRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT s.nim, s.nama AS student_nama, c.nama AS course_nama,
                COUNT(i.id) AS total,
                COUNT(i.id) FILTER (WHERE i.status = 'selesai') AS selesai,
                COUNT(i.id) FILTER (WHERE i.status = 'selesai' AND i.jenis = 'diskusi')
                    AS diskusi_selesai,
                COUNT(i.id) FILTER (WHERE i.status = 'selesai' AND i.jenis = 'absen')
                    AS absen_selesai,
                COUNT(i.id) FILTER (WHERE i.status = 'selesai' AND i.jenis = 'tugas')
                    AS tugas_selesai,
                COUNT(i.id) FILTER (WHERE i.status = 'selesai' AND i.jenis = 'quiz')
                    AS quiz_selesai
         FROM enrollments e
         JOIN students s ON s.id = e.student_id
         JOIN courses c ON c.id = e.course_id
         LEFT JOIN tuton_items i ON i.enrollment_id = e.id
         WHERE TRUE",
    );

    if let Some(course_id) = course_id {
        builder.push(" AND e.course_id = ");
        builder.push_bind(course_id.to_string());
    }

    builder.push(" GROUP BY e.id, s.nim, s.nama, c.nama ORDER BY s.nim, c.nama");

    builder.build_query_as::<ReportRow>().fetch_all(pool).await
}
