// CSV file operations for the exported task table

use crate::models::{Task, TaskStatus};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

pub const HEADER: [&str; 3] = ["ID", "Task", "Status"];

#[derive(Serialize)]
struct RowRef<'a> {
    id: u32,
    name: &'a str,
    status: TaskStatus,
}

#[derive(Deserialize)]
struct Row {
    id: u32,
    name: String,
    status: TaskStatus,
}

/// Write the header and one row per task
///
/// Fields are never quoted: a name containing a comma or a newline produces a
/// malformed row. Returns the inner writer once everything is flushed.
pub fn write_tasks<W: Write>(writer: W, tasks: &[Task]) -> Result<W> {
    let mut csv_writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(HEADER).context("Failed to write CSV header")?;

    for task in tasks {
        csv_writer
            .serialize(RowRef {
                id: task.id,
                name: &task.name,
                status: task.status(),
            })
            .wrap_err_with(|| format!("Failed to write CSV row for task {}", task.id))?;
    }

    csv_writer
        .into_inner()
        .map_err(|e| eyre!("Failed to flush CSV output: {}", e.error()))
}

/// Write tasks to a CSV file, replacing any existing file
pub fn export_csv(path: &Path, tasks: &[Task]) -> Result<()> {
    let file = File::create(path).wrap_err_with(|| format!("Failed to open {} for writing", path.display()))?;

    let file = write_tasks(file, tasks)?;
    file
        .sync_all()
        .wrap_err_with(|| format!("Failed to sync {}", path.display()))?;

    info!(file = ?path, count = tasks.len(), "Exported tasks to CSV");
    Ok(())
}

/// Read tasks from CSV produced by `write_tasks`
///
/// Ids are returned as found in the input. Rows with more than three fields are
/// assumed to carry commas inside the name and are rejoined. Unreadable rows
/// are skipped with a warning.
pub fn read_tasks<R: Read>(reader: R) -> Result<Vec<Task>> {
    let mut csv_reader = ReaderBuilder::new()
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let headers = csv_reader.headers().context("Failed to read CSV header")?.clone();
    if headers.iter().ne(HEADER) {
        warn!(header = ?headers, "Unexpected CSV header, reading rows anyway");
    }

    let mut tasks = Vec::new();
    for (row_num, result) in csv_reader.records().enumerate() {
        // Header is line 1
        let line = row_num + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = ?e, "Failed to read CSV row, skipping");
                continue;
            }
        };

        match parse_row(&record) {
            Ok(task) => tasks.push(task),
            Err(e) => {
                warn!(line, error = %e, "Failed to parse CSV row, skipping");
            }
        }
    }

    Ok(tasks)
}

/// Read tasks from a CSV file; a missing file yields no tasks
pub fn import_csv(path: &Path) -> Result<Vec<Task>> {
    if !path.exists() {
        debug!(file = ?path, "No CSV file to import");
        return Ok(Vec::new());
    }

    let file = File::open(path).wrap_err_with(|| format!("Failed to open {}", path.display()))?;
    let tasks = read_tasks(file)?;

    info!(file = ?path, count = tasks.len(), "Loaded tasks from CSV");
    Ok(tasks)
}

fn parse_row(record: &StringRecord) -> Result<Task> {
    let (id, name, status) = match record.len() {
        3 => {
            let row: Row = record.deserialize(None).context("Malformed row")?;
            (row.id, row.name, row.status)
        }
        n if n > 3 => {
            let id = record[0]
                .trim()
                .parse::<u32>()
                .wrap_err_with(|| format!("Invalid task id: {:?}", &record[0]))?;
            let status: TaskStatus = record[n - 1].parse()?;
            let name = record.iter().skip(1).take(n - 2).collect::<Vec<_>>().join(",");
            (id, name, status)
        }
        n => return Err(eyre!("Expected at least 3 fields, found {}", n)),
    };

    Ok(Task {
        id,
        name,
        completed: status == TaskStatus::Completed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task {
                id: 1,
                name: "Buy milk".to_string(),
                completed: true,
            },
            Task::new(2, "Walk dog"),
        ]
    }

    #[test]
    fn test_write_tasks_format() {
        let out = write_tasks(Vec::new(), &sample_tasks()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "ID,Task,Status\n1,Buy milk,Completed\n2,Walk dog,Pending\n");
    }

    #[test]
    fn test_write_tasks_empty_has_header() {
        let out = write_tasks(Vec::new(), &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "ID,Task,Status\n");
    }

    #[test]
    fn test_write_tasks_does_not_quote() {
        let tasks = vec![Task::new(1, "eggs, \"large\""), Task::new(2, "")];
        let out = write_tasks(Vec::new(), &tasks).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "ID,Task,Status\n1,eggs, \"large\",Pending\n2,,Pending\n");
    }

    #[test]
    fn test_export_csv_overwrites() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.csv");
        fs::write(&path, "old content that is longer than the new one\n".repeat(10)).unwrap();

        export_csv(&path, &sample_tasks()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "ID,Task,Status\n1,Buy milk,Completed\n2,Walk dog,Pending\n");
    }

    #[test]
    fn test_export_csv_unwritable_destination() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing-dir").join("tasks.csv");

        let err = export_csv(&path, &sample_tasks()).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }

    #[test]
    fn test_read_tasks() {
        let input = "ID,Task,Status\n1,Buy milk,Completed\n2,Walk dog,Pending\n";
        let tasks = read_tasks(input.as_bytes()).unwrap();
        assert_eq!(tasks, sample_tasks());
    }

    #[test]
    fn test_read_tasks_rejoins_commas_in_name() {
        let input = "ID,Task,Status\n1,eggs, milk, bread,Pending\n";
        let tasks = read_tasks(input.as_bytes()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "eggs, milk, bread");
        assert!(!tasks[0].completed);
    }

    #[test]
    fn test_read_tasks_skips_malformed_rows() {
        let input = "ID,Task,Status\n1,Valid,Pending\nnot a row\n2,Bad status,Done\nx,Bad id,Pending\n3,Also valid,Completed\n";
        let tasks = read_tasks(input.as_bytes()).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].name, "Valid");
        assert_eq!(tasks[1].name, "Also valid");
        assert!(tasks[1].completed);
    }

    #[test]
    fn test_read_tasks_keeps_quotes_in_name() {
        let tasks = vec![Task::new(1, "\"oops"), Task::new(2, "Walk dog"), Task::new(3, "\"quoted\"")];
        let out = write_tasks(Vec::new(), &tasks).unwrap();

        let read = read_tasks(out.as_slice()).unwrap();
        assert_eq!(read, tasks);
    }

    #[test]
    fn test_read_tasks_crlf() {
        let input = "ID,Task,Status\r\n1,Buy milk,Completed\r\n";
        let tasks = read_tasks(input.as_bytes()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "Buy milk");
        assert!(tasks[0].completed);
    }

    #[test]
    fn test_import_csv_nonexistent_file() {
        let temp = TempDir::new().unwrap();
        let tasks = import_csv(&temp.path().join("nonexistent.csv")).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_export_then_import() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.csv");

        export_csv(&path, &sample_tasks()).unwrap();
        let tasks = import_csv(&path).unwrap();
        assert_eq!(tasks, sample_tasks());
    }
}
