use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use log::{info, warn};

use super::error::LoadError;
use crate::model::project::parse_instant;
use crate::model::record::{AssignmentRecord, DurationValue, ResourceRecord, TaskRecord};
use crate::model::RecordSet;

/// Schedule fields a CSV column can map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Uid,
    Name,
    Start,
    Finish,
    Duration,
    OutlineLevel,
    Summary,
    Milestone,
    PercentComplete,
    Priority,
    Predecessors,
    Resources,
    Notes,
    Wbs,
}

/// Try a few common day-first / month-first layouts when the value is not
/// already an ISO date-time.
fn normalize_date(s: &str) -> String {
    let s = s.trim();
    if s.is_empty() || parse_instant(s).is_some() {
        return s.to_string();
    }
    for fmt in &["%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.format("%Y-%m-%dT00:00:00").to_string();
        }
    }
    s.to_string()
}

fn parse_flag(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "x"
    )
}

fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim().trim_end_matches('%');
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
}

/// Split a list cell like `"3;7"` or `"3, 7"`.
fn split_list(s: &str) -> Vec<String> {
    s.split([';', ',', '|'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

/// Normalize a header string to a canonical column key.
fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_', '%'], "")
}

fn header_to_field(normalized: &str) -> Option<Field> {
    match normalized {
        "uid" | "uniqueid" | "taskuid" => Some(Field::Uid),
        "name" | "task" | "taskname" | "label" | "title" | "activity" => Some(Field::Name),
        "start" | "startdate" | "begin" | "from" => Some(Field::Start),
        "finish" | "finishdate" | "end" | "enddate" | "due" | "to" => Some(Field::Finish),
        "duration" | "work" | "hours" => Some(Field::Duration),
        "outlinelevel" | "level" | "outline" | "indent" => Some(Field::OutlineLevel),
        "summary" | "issummary" => Some(Field::Summary),
        "milestone" | "ismilestone" => Some(Field::Milestone),
        "percentcomplete" | "complete" | "progress" | "percent" => Some(Field::PercentComplete),
        "priority" | "pri" => Some(Field::Priority),
        "predecessors" | "predecessor" | "dependson" | "predecessoruids" => {
            Some(Field::Predecessors)
        }
        "resources" | "resourcenames" | "assignedto" | "resource" => Some(Field::Resources),
        "notes" | "note" | "description" | "comments" => Some(Field::Notes),
        "wbs" | "wbscode" => Some(Field::Wbs),
        _ => None,
    }
}

/// Import a flat schedule from CSV text.
///
/// Auto-detects the delimiter and matches headers loosely ("Start Date",
/// "% Complete", "Outline Level"). Only a name column is required; a missing
/// uid column numbers rows from 1. Resource names are turned into resource
/// and assignment records. Returns the record set and the number of rows
/// that were skipped.
pub fn import_csv_str(content: &str) -> Result<(RecordSet, usize), LoadError> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let col_map: Vec<Option<Field>> = headers
        .iter()
        .map(|h| header_to_field(&normalize_header(h)))
        .collect();

    if !col_map.contains(&Some(Field::Name)) {
        return Err(LoadError::MissingColumns {
            needed: "task name".to_string(),
            found: headers.iter().map(str::to_string).collect(),
        });
    }

    let mut records = RecordSet::default();
    let mut resource_uids: HashMap<String, String> = HashMap::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping CSV row {}: {}", i + 2, e);
                skipped += 1;
                continue;
            }
        };

        let mut task = TaskRecord {
            uid: (i + 1).to_string(),
            ..Default::default()
        };
        let mut resource_names = Vec::new();

        for (value, field) in row.iter().zip(col_map.iter()) {
            let Some(field) = field else { continue };
            match field {
                Field::Uid if !value.is_empty() => task.uid = value.to_string(),
                Field::Uid => {}
                Field::Name => task.name = value.to_string(),
                Field::Start => task.start = normalize_date(value),
                Field::Finish => task.finish = normalize_date(value),
                Field::Duration => task.duration = DurationValue::Text(value.to_string()),
                Field::OutlineLevel => task.outline_level = parse_int(value),
                Field::Summary => task.summary = parse_flag(value),
                Field::Milestone => task.milestone = parse_flag(value),
                Field::PercentComplete => task.percent_complete = parse_int(value),
                Field::Priority => task.priority = parse_int(value),
                Field::Predecessors => task.predecessor_uids = split_list(value),
                Field::Resources => resource_names = split_list(value),
                Field::Notes => task.notes = value.to_string(),
                Field::Wbs => task.wbs = value.to_string(),
            }
        }

        if task.name.is_empty() {
            skipped += 1;
            continue;
        }

        for name in resource_names {
            let next_uid = (resource_uids.len() + 1).to_string();
            let resource_uid = resource_uids
                .entry(name.to_lowercase())
                .or_insert_with(|| {
                    records.resources.push(ResourceRecord {
                        uid: next_uid.clone(),
                        name: name.clone(),
                        kind: "Work".to_string(),
                        ..Default::default()
                    });
                    next_uid
                })
                .clone();
            records.assignments.push(AssignmentRecord {
                uid: (records.assignments.len() + 1).to_string(),
                task_uid: task.uid.clone(),
                resource_uid,
                ..Default::default()
            });
        }
        records.tasks.push(task);
    }

    if records.tasks.is_empty() {
        return Err(LoadError::NoTasks { skipped });
    }
    Ok((records, skipped))
}

/// Import a flat schedule from a CSV file.
pub fn import_csv(path: &Path) -> Result<(RecordSet, usize), LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let (mut records, skipped) = import_csv_str(&content)?;
    info!(
        "imported {} rows from {} ({} skipped)",
        records.tasks.len(),
        path.display(),
        skipped
    );
    if let Some(stem) = path.file_stem() {
        records.project.name = stem.to_string_lossy().into_owned();
    }
    Ok((records, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Project;
    use std::io::Write;

    const SCHEDULE: &str = "\
UID;Name;Start;Finish;Outline Level;Summary;Milestone;% Complete;Predecessors;Resources
1;Groundworks;2024-04-01;2024-04-19;1;yes;no;40;;
2;Excavate;01/04/2024;05/04/2024;2;no;no;100;;Digger Crew
3;Pour slab;2024-04-08T08:00:00;2024-04-19T17:00:00;2;no;no;20%;2;Digger Crew, Ada
4;Slab signed off;2024-04-19;2024-04-19;1;no;yes;0;3;
";

    #[test]
    fn imports_semicolon_schedule() {
        let (records, skipped) = import_csv_str(SCHEDULE).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(records.tasks.len(), 4);
        assert_eq!(records.tasks[1].start, "2024-04-01T00:00:00");
        assert_eq!(records.tasks[2].percent_complete, Some(20));
        assert_eq!(records.tasks[2].predecessor_uids, vec!["2".to_string()]);
        assert!(records.tasks[0].summary);
        assert!(records.tasks[3].milestone);

        let names: Vec<&str> = records.resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Digger Crew", "Ada"]);
        assert_eq!(records.assignments.len(), 3);
    }

    #[test]
    fn imported_rows_normalize_into_a_project() {
        let (records, _) = import_csv_str(SCHEDULE).unwrap();
        let project = Project::from_records(records);
        let slab = project.task(&"3".into()).unwrap();
        assert_eq!(slab.parent, Some("1".into()));
        assert_eq!(slab.resources, vec!["Digger Crew".to_string(), "Ada".to_string()]);
    }

    #[test]
    fn uid_defaults_to_row_number() {
        let (records, skipped) = import_csv_str("Task,Start\nA,2024-01-01\n,2024-01-02\nB,\n").unwrap();
        let uids: Vec<&str> = records.tasks.iter().map(|t| t.uid.as_str()).collect();
        assert_eq!(uids, vec!["1", "3"]);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn missing_name_column_is_an_error() {
        let err = import_csv_str("Start,Finish\n2024-01-01,2024-01-02\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumns { .. }));
    }

    #[test]
    fn empty_body_has_no_tasks() {
        let err = import_csv_str("Name,Start\n").unwrap_err();
        assert!(matches!(err, LoadError::NoTasks { skipped: 0 }));
    }

    #[test]
    fn file_name_becomes_project_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warehouse.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"Name\tStart\nFit out\t2024-05-01\n").unwrap();
        let (records, _) = import_csv(&path).unwrap();
        assert_eq!(records.project.name, "warehouse");
        assert_eq!(records.tasks.len(), 1);
    }
}
