use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::db::models::TutonItem;
use crate::db::types::{ItemKind, ItemStatus};

const COLUMNS: &str = "\
    id, enrollment_id, jenis, sesi, status, nilai, deskripsi, \
    deadline_at, selesai_at, created_at, updated_at";

pub(crate) struct CreateItem<'a> {
    pub(crate) id: &'a str,
    pub(crate) enrollment_id: &'a str,
    pub(crate) jenis: ItemKind,
    pub(crate) sesi: i16,
    pub(crate) deskripsi: Option<String>,
    pub(crate) deadline_at: Option<time::PrimitiveDateTime>,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    tx: &mut Transaction<'_, Postgres>,
    params: CreateItem<'_>,
) -> Result<TutonItem, sqlx::Error> {
    sqlx::query_as::<_, TutonItem>(&format!(
        "INSERT INTO tuton_items (
            id, enrollment_id, jenis, sesi, status, deskripsi, deadline_at, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,'belum',$5,$6,$7,$8)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.enrollment_id)
    .bind(params.jenis)
    .bind(params.sesi)
    .bind(params.deskripsi)
    .bind(params.deadline_at)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(&mut **tx)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    item_id: &str,
) -> Result<Option<TutonItem>, sqlx::Error> {
    sqlx::query_as::<_, TutonItem>(&format!("SELECT {COLUMNS} FROM tuton_items WHERE id = $1"))
        .bind(item_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn fetch_one_by_id(pool: &PgPool, item_id: &str) -> Result<TutonItem, sqlx::Error> {
    sqlx::query_as::<_, TutonItem>(&format!("SELECT {COLUMNS} FROM tuton_items WHERE id = $1"))
        .bind(item_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn exists_for_enrollment(
    pool: &PgPool,
    enrollment_id: &str,
    jenis: ItemKind,
    sesi: i16,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT id FROM tuton_items WHERE enrollment_id = $1 AND jenis = $2 AND sesi = $3",
    )
    .bind(enrollment_id)
    .bind(jenis)
    .bind(sesi)
    .fetch_optional(pool)
    .await
}

pub(crate) struct ItemFilter {
    pub(crate) jenis: Option<ItemKind>,
    pub(crate) sesi: Option<i16>,
    pub(crate) status: Option<ItemStatus>,
}

pub(crate) async fn list_for_enrollment(
    pool: &PgPool,
    enrollment_id: &str,
    filter: ItemFilter,
) -> Result<Vec<TutonItem>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT {COLUMNS} FROM tuton_items WHERE enrollment_id = "
    ));
    builder.push_bind(enrollment_id);

    if let Some(jenis) = filter.jenis {
        builder.push(" AND jenis = ");
        builder.push_bind(jenis);
    }
    if let Some(sesi) = filter.sesi {
        builder.push(" AND sesi = ");
        builder.push_bind(sesi);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY jenis, sesi");

    builder.build_query_as::<TutonItem>().fetch_all(pool).await
}

pub(crate) struct UpdateItem {
    pub(crate) status: Option<ItemStatus>,
    pub(crate) nilai: Option<i32>,
    pub(crate) deskripsi: Option<String>,
    pub(crate) selesai_at: Option<time::PrimitiveDateTime>,
    pub(crate) clear_selesai_at: bool,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn update(
    tx: &mut Transaction<'_, Postgres>,
    item_id: &str,
    params: UpdateItem,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE tuton_items SET
            status = COALESCE($1, status),
            nilai = COALESCE($2, nilai),
            deskripsi = COALESCE($3, deskripsi),
            selesai_at = CASE WHEN $4 THEN NULL ELSE COALESCE($5, selesai_at) END,
            updated_at = $6
         WHERE id = $7",
    )
    .bind(params.status)
    .bind(params.nilai)
    .bind(params.deskripsi)
    .bind(params.clear_selesai_at)
    .bind(params.selesai_at)
    .bind(params.updated_at)
    .bind(item_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub(crate) async fn delete_by_id(pool: &PgPool, item_id: &str) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM tuton_items WHERE id = $1").bind(item_id).execute(pool).await?;
    Ok(result.rows_affected())
}
