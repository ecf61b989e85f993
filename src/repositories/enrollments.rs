use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use time::PrimitiveDateTime;

use crate::db::models::Enrollment;

const COLUMNS: &str = "id, student_id, course_id, created_at";

pub(crate) struct CreateEnrollment<'a> {
    pub(crate) id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    tx: &mut Transaction<'_, Postgres>,
    params: CreateEnrollment<'_>,
) -> Result<Enrollment, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "INSERT INTO enrollments (id, student_id, course_id, created_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.student_id)
    .bind(params.course_id)
    .bind(params.created_at)
    .fetch_one(&mut **tx)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    enrollment_id: &str,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!("SELECT {COLUMNS} FROM enrollments WHERE id = $1"))
        .bind(enrollment_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn exists_for_student_course(
    pool: &PgPool,
    student_id: &str,
    course_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT id FROM enrollments WHERE student_id = $1 AND course_id = $2",
    )
    .bind(student_id)
    .bind(course_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, enrollment_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM enrollments WHERE id = $1")
        .bind(enrollment_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn count_completed_items(
    pool: &PgPool,
    enrollment_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM tuton_items WHERE enrollment_id = $1 AND status = 'selesai'",
    )
    .bind(enrollment_id)
    .fetch_one(pool)
    .await
}

/// One enrollment with its course name and item counts for list views.
#[derive(Debug, FromRow)]
pub(crate) struct EnrollmentSummaryRow {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) course_nama: String,
    pub(crate) total_items: i64,
    pub(crate) selesai_items: i64,
    pub(crate) created_at: PrimitiveDateTime,
}

const SUMMARY_QUERY: &str = "\
    SELECT e.id, e.student_id, e.course_id, c.nama AS course_nama,
           COUNT(i.id) AS total_items,
           COUNT(i.id) FILTER (WHERE i.status = 'selesai') AS selesai_items,
           e.created_at
    FROM enrollments e
    JOIN courses c ON c.id = e.course_id
    LEFT JOIN tuton_items i ON i.enrollment_id = e.id";

pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<EnrollmentSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, EnrollmentSummaryRow>(&format!(
        "{SUMMARY_QUERY}
         WHERE e.student_id = $1
         GROUP BY e.id, c.nama
         ORDER BY c.nama",
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct EnrollmentFilter<'a> {
    pub(crate) student_id: Option<&'a str>,
    pub(crate) course_id: Option<&'a str>,
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &EnrollmentFilter<'_>) {
    if let Some(student_id) = filter.student_id {
        builder.push(" AND e.student_id = ");
        builder.push_bind(student_id.to_string());
    }
    if let Some(course_id) = filter.course_id {
        builder.push(" AND e.course_id = ");
        builder.push_bind(course_id.to_string());
    }
}

pub(crate) async fn list_all(
    pool: &PgPool,
    filter: &EnrollmentFilter<'_>,
    skip: i64,
    limit: i64,
) -> Result<Vec<EnrollmentSummaryRow>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("{SUMMARY_QUERY} WHERE TRUE"));
    push_filter(&mut builder, filter);

    builder.push(" GROUP BY e.id, c.nama ORDER BY e.created_at DESC OFFSET ");
    builder.push_bind(skip);
    builder.push(" LIMIT ");
    builder.push_bind(limit);

    builder.build_query_as::<EnrollmentSummaryRow>().fetch_all(pool).await
}

pub(crate) async fn count_all(
    pool: &PgPool,
    filter: &EnrollmentFilter<'_>,
) -> Result<i64, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM enrollments e WHERE TRUE");
    push_filter(&mut builder, filter);

    builder.build_query_scalar::<i64>().fetch_one(pool).await
}
