pub mod csv_import;
pub mod error;
pub mod file;

pub use csv_import::{import_csv, import_csv_str};
pub use error::LoadError;
pub use file::{load_project, parse_records, project_from_json};
