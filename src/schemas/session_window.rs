use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};
use validator::Validate;

use crate::core::time::{format_primitive, to_primitive_utc};
use crate::db::types::ItemKind;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub(crate) struct WindowUpsert {
    pub(crate) jenis: ItemKind,
    #[validate(range(min = 1, max = 8, message = "sesi must be between 1 and 8"))]
    pub(crate) sesi: i16,
    #[serde(alias = "startAt", deserialize_with = "deserialize_primitive_flexible")]
    pub(crate) start_at: PrimitiveDateTime,
    #[serde(alias = "endAt", deserialize_with = "deserialize_primitive_flexible")]
    pub(crate) end_at: PrimitiveDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct WindowBatchRequest {
    #[validate(length(min = 1, message = "windows must not be empty"))]
    #[validate(nested)]
    pub(crate) windows: Vec<WindowUpsert>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WindowResponse {
    pub(crate) id: String,
    pub(crate) jenis: ItemKind,
    pub(crate) sesi: i16,
    pub(crate) start_at: String,
    pub(crate) end_at: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl WindowResponse {
    pub(crate) fn from_db(window: crate::db::models::SessionWindow) -> Self {
        Self {
            id: window.id,
            jenis: window.jenis,
            sesi: window.sesi,
            start_at: format_primitive(window.start_at),
            end_at: format_primitive(window.end_at),
            created_at: format_primitive(window.created_at),
            updated_at: format_primitive(window.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplyDeadlinesRequest {
    #[serde(default)]
    pub(crate) jenis: Option<ItemKind>,
    #[serde(default)]
    pub(crate) sesi: Option<i16>,
    #[serde(default)]
    #[serde(alias = "onlyMissing")]
    pub(crate) only_missing: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApplyDeadlinesResponse {
    pub(crate) windows_processed: usize,
    pub(crate) items_updated: u64,
    pub(crate) windows_failed: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ShiftDeadlinesRequest {
    #[serde(alias = "deltaMinutes")]
    pub(crate) delta_minutes: i32,
    #[serde(default)]
    pub(crate) jenis: Option<ItemKind>,
    #[serde(default)]
    pub(crate) sesi: Option<i16>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ShiftDeadlinesResponse {
    pub(crate) windows_shifted: u64,
    pub(crate) items_shifted: u64,
}

fn parse_primitive_flexible(raw: &str) -> Option<PrimitiveDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(to_primitive_utc(value));
    }

    // Frontend's datetime-local often sends without timezone.
    if let Ok(value) =
        PrimitiveDateTime::parse(raw, &format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    {
        return Some(value);
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(value);
    }

    None
}

pub(crate) fn deserialize_primitive_flexible<'de, D>(
    deserializer: D,
) -> Result<PrimitiveDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_primitive_flexible(&raw)
        .ok_or_else(|| D::Error::custom(format!("invalid datetime: {raw}")))
}

pub(crate) fn deserialize_option_primitive_flexible<'de, D>(
    deserializer: D,
) -> Result<Option<PrimitiveDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(value) => parse_primitive_flexible(&value)
            .ok_or_else(|| D::Error::custom(format!("invalid datetime: {value}")))
            .map(Some),
        None => Ok(None),
    }
}
