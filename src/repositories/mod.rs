pub(crate) mod admins;
pub(crate) mod courses;
pub(crate) mod dashboard;
pub(crate) mod enrollments;
pub(crate) mod items;
pub(crate) mod reminders;
pub(crate) mod session_windows;
pub(crate) mod students;
