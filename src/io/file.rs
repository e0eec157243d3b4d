use std::path::Path;

use log::info;

use super::error::LoadError;
use crate::model::{Project, RecordSet};

/// Parse a JSON record set without building a project.
pub fn parse_records(json: &str) -> Result<RecordSet, LoadError> {
    Ok(serde_json::from_str(json)?)
}

/// Normalize a JSON record set into a project. A document without a single
/// usable task is rejected.
pub fn project_from_json(json: &str) -> Result<Project, LoadError> {
    let records = parse_records(json)?;
    let raw = records.tasks.len();
    let project = Project::from_records(records);
    if project.tasks.is_empty() {
        return Err(LoadError::NoTasks { skipped: raw });
    }
    Ok(project)
}

/// Load a project from a JSON record-set file.
pub fn load_project(path: &Path) -> Result<Project, LoadError> {
    let json = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let project = project_from_json(&json)?;
    info!(
        "loaded {} tasks from {}",
        project.tasks.len(),
        path.display()
    );
    Ok(project)
}
