use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::types::{ReminderChannel, ReminderStatus};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ReminderCreate {
    #[serde(default)]
    #[serde(alias = "offsetMinutes")]
    #[validate(range(min = 1, message = "offset_minutes must be positive"))]
    pub(crate) offset_minutes: Option<i32>,
    #[serde(default = "default_channel")]
    pub(crate) channel: ReminderChannel,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReminderUpdate {
    pub(crate) status: ReminderStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateRemindersRequest {
    #[serde(default)]
    #[serde(alias = "offsetMinutes")]
    pub(crate) offset_minutes: Option<i32>,
    #[serde(default = "default_channel")]
    pub(crate) channel: ReminderChannel,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRemindersResponse {
    pub(crate) created: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReminderResponse {
    pub(crate) id: String,
    pub(crate) item_id: String,
    pub(crate) offset_minutes: i32,
    pub(crate) channel: ReminderChannel,
    pub(crate) status: ReminderStatus,
    pub(crate) remind_at: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ReminderResponse {
    pub(crate) fn from_db(reminder: crate::db::models::Reminder) -> Self {
        Self {
            id: reminder.id,
            item_id: reminder.item_id,
            offset_minutes: reminder.offset_minutes,
            channel: reminder.channel,
            status: reminder.status,
            remind_at: format_primitive(reminder.remind_at),
            created_at: format_primitive(reminder.created_at),
            updated_at: format_primitive(reminder.updated_at),
        }
    }
}

fn default_channel() -> ReminderChannel {
    ReminderChannel::Whatsapp
}
