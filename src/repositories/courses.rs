use sqlx::PgPool;

use crate::db::models::Course;

const COLUMNS: &str = "id, nama, created_at, updated_at";

pub(crate) struct CreateCourse<'a> {
    pub(crate) id: &'a str,
    pub(crate) nama: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateCourse<'_>) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (id, nama, created_at, updated_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.nama)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    course_id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn fetch_one_by_id(pool: &PgPool, course_id: &str) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn list(
    pool: &PgPool,
    q: Option<&str>,
    skip: i64,
    limit: i64,
) -> Result<Vec<Course>, sqlx::Error> {
    match q {
        Some(q) => {
            sqlx::query_as::<_, Course>(&format!(
                "SELECT {COLUMNS} FROM courses
                 WHERE nama ILIKE '%' || $1 || '%'
                 ORDER BY nama
                 OFFSET $2 LIMIT $3",
            ))
            .bind(q)
            .bind(skip)
            .bind(limit)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Course>(&format!(
                "SELECT {COLUMNS} FROM courses ORDER BY nama OFFSET $1 LIMIT $2",
            ))
            .bind(skip)
            .bind(limit)
            .fetch_all(pool)
            .await
        }
    }
}

pub(crate) async fn count(pool: &PgPool, q: Option<&str>) -> Result<i64, sqlx::Error> {
    match q {
        Some(q) => {
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM courses WHERE nama ILIKE '%' || $1 || '%'",
            )
            .bind(q)
            .fetch_one(pool)
            .await
        }
        None => sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses").fetch_one(pool).await,
    }
}

pub(crate) struct UpdateCourse {
    pub(crate) nama: Option<String>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    course_id: &str,
    params: UpdateCourse,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE courses SET
            nama = COALESCE($1, nama),
            updated_at = $2
         WHERE id = $3",
    )
    .bind(params.nama)
    .bind(params.updated_at)
    .bind(course_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete_by_id(pool: &PgPool, course_id: &str) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM courses WHERE id = $1").bind(course_id).execute(pool).await?;
    Ok(result.rows_affected())
}

pub(crate) async fn count_enrollments(pool: &PgPool, course_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
        .bind(course_id)
        .fetch_one(pool)
        .await
}
