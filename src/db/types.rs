use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "adminrole", rename_all = "lowercase")]
pub(crate) enum AdminRole {
    Superadmin,
    Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "itemkind", rename_all = "lowercase")]
pub(crate) enum ItemKind {
    Diskusi,
    Absen,
    Tugas,
    Quiz,
}

impl ItemKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Diskusi => "diskusi",
            Self::Absen => "absen",
            Self::Tugas => "tugas",
            Self::Quiz => "quiz",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "itemstatus", rename_all = "lowercase")]
pub(crate) enum ItemStatus {
    Belum,
    Selesai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "reminderchannel", rename_all = "lowercase")]
pub(crate) enum ReminderChannel {
    Whatsapp,
    Telegram,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "reminderstatus", rename_all = "lowercase")]
pub(crate) enum ReminderStatus {
    Pending,
    Sent,
    Canceled,
}
