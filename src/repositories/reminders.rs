use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::db::models::Reminder;
use crate::db::types::{ReminderChannel, ReminderStatus};

const COLUMNS: &str =
    "id, item_id, offset_minutes, channel, status, remind_at, created_at, updated_at";

pub(crate) struct CreateReminder<'a> {
    pub(crate) id: &'a str,
    pub(crate) item_id: &'a str,
    pub(crate) offset_minutes: i32,
    pub(crate) channel: ReminderChannel,
    pub(crate) remind_at: time::PrimitiveDateTime,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateReminder<'_>,
) -> Result<Reminder, sqlx::Error> {
    sqlx::query_as::<_, Reminder>(&format!(
        "INSERT INTO reminders (
            id, item_id, offset_minutes, channel, status, remind_at, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,'pending',$5,$6,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.item_id)
    .bind(params.offset_minutes)
    .bind(params.channel)
    .bind(params.remind_at)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    reminder_id: &str,
) -> Result<Option<Reminder>, sqlx::Error> {
    sqlx::query_as::<_, Reminder>(&format!("SELECT {COLUMNS} FROM reminders WHERE id = $1"))
        .bind(reminder_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_item(
    pool: &PgPool,
    item_id: &str,
) -> Result<Vec<Reminder>, sqlx::Error> {
    sqlx::query_as::<_, Reminder>(&format!(
        "SELECT {COLUMNS} FROM reminders WHERE item_id = $1 ORDER BY remind_at",
    ))
    .bind(item_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_all(
    pool: &PgPool,
    status: Option<ReminderStatus>,
    skip: i64,
    limit: i64,
) -> Result<Vec<Reminder>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM reminders WHERE TRUE"));

    if let Some(status) = status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY remind_at OFFSET ");
    builder.push_bind(skip);
    builder.push(" LIMIT ");
    builder.push_bind(limit);

    builder.build_query_as::<Reminder>().fetch_all(pool).await
}

pub(crate) async fn count_all(
    pool: &PgPool,
    status: Option<ReminderStatus>,
) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM reminders WHERE TRUE");

    if let Some(status) = status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }

    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

/// Reminders attached to any of one student's items.
pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: &str,
    status: Option<ReminderStatus>,
    skip: i64,
    limit: i64,
) -> Result<Vec<Reminder>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT r.id, r.item_id, r.offset_minutes, r.channel, r.status,
                r.remind_at, r.created_at, r.updated_at
         FROM reminders r
         JOIN tuton_items i ON i.id = r.item_id
         JOIN enrollments e ON e.id = i.enrollment_id
         WHERE e.student_id = ",
    );
    builder.push_bind(student_id);

    if let Some(status) = status {
        builder.push(" AND r.status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY r.remind_at OFFSET ");
    builder.push_bind(skip);
    builder.push(" LIMIT ");
    builder.push_bind(limit);

    builder.build_query_as::<Reminder>().fetch_all(pool).await
}

pub(crate) async fn count_for_student(
    pool: &PgPool,
    student_id: &str,
    status: Option<ReminderStatus>,
) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*)
         FROM reminders r
         JOIN tuton_items i ON i.id = r.item_id
         JOIN enrollments e ON e.id = i.enrollment_id
         WHERE e.student_id = ",
    );
    builder.push_bind(student_id);

    if let Some(status) = status {
        builder.push(" AND r.status = ");
        builder.push_bind(status);
    }

    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub(crate) async fn update_status(
    pool: &PgPool,
    reminder_id: &str,
    status: ReminderStatus,
    updated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE reminders SET status = $1, updated_at = $2 WHERE id = $3")
        .bind(status)
        .bind(updated_at)
        .bind(reminder_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Cancels every pending reminder of an item. Used when an item is completed
/// or loses its deadline. Returns rows touched.
pub(crate) async fn cancel_pending_for_item(
    tx: &mut Transaction<'_, Postgres>,
    item_id: &str,
    updated_at: time::PrimitiveDateTime,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE reminders SET status = 'canceled', updated_at = $1
         WHERE item_id = $2 AND status = 'pending'",
    )
    .bind(updated_at)
    .bind(item_id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected())
}

/// Bulk-creates pending reminders for every incomplete item that has a
/// deadline and no pending reminder yet. Returns the number created.
pub(crate) async fn generate_missing(
    pool: &PgPool,
    offset_minutes: i32,
    channel: ReminderChannel,
    now: time::PrimitiveDateTime,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO reminders (
            id, item_id, offset_minutes, channel, status, remind_at, created_at, updated_at
         )
         SELECT gen_random_uuid()::text, i.id, $1, $2, 'pending',
                i.deadline_at - make_interval(mins => $1), $3, $3
         FROM tuton_items i
         WHERE i.deadline_at IS NOT NULL
           AND i.status = 'belum'
           AND NOT EXISTS (
               SELECT 1 FROM reminders r
               WHERE r.item_id = i.id AND r.status = 'pending'
           )",
    )
    .bind(offset_minutes)
    .bind(channel)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
