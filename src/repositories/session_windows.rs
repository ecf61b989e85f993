use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::db::models::SessionWindow;
use crate::db::types::ItemKind;

const COLUMNS: &str = "id, jenis, sesi, start_at, end_at, created_at, updated_at";

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<SessionWindow>, sqlx::Error> {
    sqlx::query_as::<_, SessionWindow>(&format!(
        "SELECT {COLUMNS} FROM session_windows ORDER BY jenis, sesi",
    ))
    .fetch_all(pool)
    .await
}

pub(crate) struct UpsertWindow<'a> {
    pub(crate) id: &'a str,
    pub(crate) jenis: ItemKind,
    pub(crate) sesi: i16,
    pub(crate) start_at: time::PrimitiveDateTime,
    pub(crate) end_at: time::PrimitiveDateTime,
    pub(crate) now: time::PrimitiveDateTime,
}

pub(crate) async fn upsert(
    tx: &mut Transaction<'_, Postgres>,
    params: UpsertWindow<'_>,
) -> Result<SessionWindow, sqlx::Error> {
    sqlx::query_as::<_, SessionWindow>(&format!(
        "INSERT INTO session_windows (id, jenis, sesi, start_at, end_at, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$6)
         ON CONFLICT (jenis, sesi)
         DO UPDATE SET start_at = EXCLUDED.start_at,
                       end_at = EXCLUDED.end_at,
                       updated_at = EXCLUDED.updated_at
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.jenis)
    .bind(params.sesi)
    .bind(params.start_at)
    .bind(params.end_at)
    .bind(params.now)
    .fetch_one(&mut **tx)
    .await
}

pub(crate) struct WindowFilter {
    pub(crate) jenis: Option<ItemKind>,
    pub(crate) sesi: Option<i16>,
}

pub(crate) async fn list_filtered(
    pool: &PgPool,
    filter: &WindowFilter,
) -> Result<Vec<SessionWindow>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM session_windows WHERE TRUE"));

    if let Some(jenis) = filter.jenis {
        builder.push(" AND jenis = ");
        builder.push_bind(jenis);
    }
    if let Some(sesi) = filter.sesi {
        builder.push(" AND sesi = ");
        builder.push_bind(sesi);
    }

    builder.push(" ORDER BY jenis, sesi");

    builder.build_query_as::<SessionWindow>().fetch_all(pool).await
}

/// Copy one window's end time into the deadlines of every matching item.
/// Returns the number of rows touched.
pub(crate) async fn apply_window_deadline(
    pool: &PgPool,
    window: &SessionWindow,
    only_missing: bool,
    updated_at: time::PrimitiveDateTime,
) -> Result<u64, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new("UPDATE tuton_items SET deadline_at = ");
    builder.push_bind(window.end_at);
    builder.push(", updated_at = ");
    builder.push_bind(updated_at);
    builder.push(" WHERE jenis = ");
    builder.push_bind(window.jenis);
    builder.push(" AND sesi = ");
    builder.push_bind(window.sesi);
    if only_missing {
        builder.push(" AND deadline_at IS NULL");
    }

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

/// Shift the filtered windows by `delta_minutes`. Returns rows touched.
pub(crate) async fn shift_windows(
    tx: &mut Transaction<'_, Postgres>,
    filter: &WindowFilter,
    delta_minutes: i32,
    updated_at: time::PrimitiveDateTime,
) -> Result<u64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "UPDATE session_windows SET start_at = start_at + make_interval(mins => ",
    );
    builder.push_bind(delta_minutes);
    builder.push("), end_at = end_at + make_interval(mins => ");
    builder.push_bind(delta_minutes);
    builder.push("), updated_at = ");
    builder.push_bind(updated_at);
    builder.push(" WHERE TRUE");

    if let Some(jenis) = filter.jenis {
        builder.push(" AND jenis = ");
        builder.push_bind(jenis);
    }
    if let Some(sesi) = filter.sesi {
        builder.push(" AND sesi = ");
        builder.push_bind(sesi);
    }

    let result = builder.build().execute(&mut **tx).await?;
    Ok(result.rows_affected())
}

/// Shift the deadlines of items matching the filter by `delta_minutes`.
/// Items without a deadline are left alone. Returns rows touched.
pub(crate) async fn shift_item_deadlines(
    tx: &mut Transaction<'_, Postgres>,
    filter: &WindowFilter,
    delta_minutes: i32,
    updated_at: time::PrimitiveDateTime,
) -> Result<u64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "UPDATE tuton_items SET deadline_at = deadline_at + make_interval(mins => ",
    );
    builder.push_bind(delta_minutes);
    builder.push("), updated_at = ");
    builder.push_bind(updated_at);
    builder.push(" WHERE deadline_at IS NOT NULL");

    if let Some(jenis) = filter.jenis {
        builder.push(" AND jenis = ");
        builder.push_bind(jenis);
    }
    if let Some(sesi) = filter.sesi {
        builder.push(" AND sesi = ");
        builder.push_bind(sesi);
    }

    let result = builder.build().execute(&mut **tx).await?;
    Ok(result.rows_affected())
}

/// Deadline template lookup used during item generation. Keyed by (jenis, sesi).
pub(crate) async fn deadline_map(
    pool: &PgPool,
) -> Result<std::collections::HashMap<(ItemKind, i16), time::PrimitiveDateTime>, sqlx::Error> {
    let windows = list_all(pool).await?;
    Ok(windows.into_iter().map(|w| ((w.jenis, w.sesi), w.end_at)).collect())
}
