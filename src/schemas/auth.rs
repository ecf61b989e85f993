use serde::Serialize;

use crate::schemas::admin::AdminResponse;
use crate::schemas::student::StudentResponse;

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) student: StudentResponse,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminTokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) admin: AdminResponse,
}
