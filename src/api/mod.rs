pub(crate) mod admins;
pub(crate) mod auth;
pub(crate) mod courses;
pub(crate) mod dashboard;
pub(crate) mod enrollments;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod items;
pub(crate) mod pagination;
pub(crate) mod reminders;
pub(crate) mod reports;
pub(crate) mod router;
pub(crate) mod session_windows;
pub(crate) mod students;
pub(crate) mod validation;
