use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::Student;

const COLUMNS: &str =
    "id, nim, nama, no_hp, hashed_password, is_active, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_nim(pool: &PgPool, nim: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE nim = $1"))
        .bind(nim)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn exists_by_nim(pool: &PgPool, nim: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM students WHERE nim = $1")
        .bind(nim)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateStudent<'a> {
    pub(crate) id: &'a str,
    pub(crate) nim: &'a str,
    pub(crate) nama: &'a str,
    pub(crate) no_hp: &'a str,
    pub(crate) hashed_password: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateStudent<'_>,
) -> Result<Student, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "INSERT INTO students (
            id, nim, nama, no_hp, hashed_password, is_active, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.nim)
    .bind(params.nama)
    .bind(params.no_hp)
    .bind(params.hashed_password)
    .bind(params.is_active)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct StudentFilter<'a> {
    pub(crate) q: Option<&'a str>,
    pub(crate) nim: Option<&'a str>,
    pub(crate) is_active: Option<bool>,
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &StudentFilter<'_>) {
    if let Some(q) = filter.q {
        builder.push(" AND (nim ILIKE '%' || ");
        builder.push_bind(q.to_string());
        builder.push(" || '%' OR nama ILIKE '%' || ");
        builder.push_bind(q.to_string());
        builder.push(" || '%')");
    }
    if let Some(nim) = filter.nim {
        builder.push(" AND nim = ");
        builder.push_bind(nim.to_string());
    }
    if let Some(is_active) = filter.is_active {
        builder.push(" AND is_active = ");
        builder.push_bind(is_active);
    }
}

pub(crate) async fn list(
    pool: &PgPool,
    filter: &StudentFilter<'_>,
    skip: i64,
    limit: i64,
) -> Result<Vec<Student>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM students WHERE TRUE"));
    push_filter(&mut builder, filter);

    builder.push(" ORDER BY nim OFFSET ");
    builder.push_bind(skip);
    builder.push(" LIMIT ");
    builder.push_bind(limit);

    builder.build_query_as::<Student>().fetch_all(pool).await
}

pub(crate) async fn count(
    pool: &PgPool,
    filter: &StudentFilter<'_>,
) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM students WHERE TRUE");
    push_filter(&mut builder, filter);

    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub(crate) struct UpdateStudent {
    pub(crate) nama: Option<String>,
    pub(crate) no_hp: Option<String>,
    pub(crate) hashed_password: Option<String>,
    pub(crate) is_active: Option<bool>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateStudent,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE students SET
            nama = COALESCE($1, nama),
            no_hp = COALESCE($2, no_hp),
            hashed_password = COALESCE($3, hashed_password),
            is_active = COALESCE($4, is_active),
            updated_at = $5
         WHERE id = $6",
    )
    .bind(params.nama)
    .bind(params.no_hp)
    .bind(params.hashed_password)
    .bind(params.is_active)
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn fetch_one_by_id(pool: &PgPool, id: &str) -> Result<Student, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM students WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected())
}
