pub mod dataset;
pub mod events;

pub use dataset::{export, export_to_path, load, load_from_path, Dataset};
pub use events::{list_projects, month_from_file_name, EventLogReader};
