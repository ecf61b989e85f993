pub(crate) mod item_generation;
pub(crate) mod progress;
pub(crate) mod report_csv;
