//! Task and resource readers
//!
//! Two layouts are understood:
//! - JSON: an array of records (`.json` extension), or a combined
//!   `{ "tasks": [...], "resources": [...] }` document
//! - Delimited text with a header row, `;`-separated by default
//!
//! Delimited headers are matched case-insensitively against a few aliases
//! (English names and the Portuguese names used by the legacy exports).
//! Unknown columns are ignored.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use loadsplit_core::{Resource, Task, Time};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

const TASK_ID: &[&str] = &["id", "task_id", "nota"];
const TASK_EFFORT: &[&str] = &["effort", "task_effort", "esforco"];
const TASK_DEADLINE: &[&str] = &["deadline", "prazo"];
const RESOURCE_ID: &[&str] = &["id", "resource_id", "matricula"];
const RESOURCE_NAME: &[&str] = &["name", "resource_name", "nome"];
const RESOURCE_CAPACITY: &[&str] = &["daily_capacity", "capacity", "disponibilidade"];

/// Input reading error
#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: invalid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: missing column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{}: no header row", path.display())]
    Empty { path: PathBuf },
}

/// Tasks and resources read from one JSON document
#[derive(Debug, Default, Deserialize)]
pub struct InputBundle {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

fn read_text(path: &Path) -> Result<String, InputError> {
    fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn parse_json<T: DeserializeOwned>(path: &Path, text: &str) -> Result<T, InputError> {
    serde_json::from_str(text).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a combined JSON document
pub fn read_bundle(path: &Path) -> Result<InputBundle, InputError> {
    let text = read_text(path)?;
    parse_json(path, &text)
}

/// Read tasks from a JSON array or a delimited file
pub fn read_tasks(path: &Path, separator: char) -> Result<Vec<Task>, InputError> {
    let text = read_text(path)?;
    if is_json(path) {
        return parse_json(path, &text);
    }
    parse_tasks(path, &text, separator)
}

/// Read resources from a JSON array or a delimited file
pub fn read_resources(path: &Path, separator: char) -> Result<Vec<Resource>, InputError> {
    let text = read_text(path)?;
    if is_json(path) {
        return parse_json(path, &text);
    }
    parse_resources(path, &text, separator)
}

/// Parse delimited task rows
pub fn parse_tasks(path: &Path, text: &str, separator: char) -> Result<Vec<Task>, InputError> {
    let table = Table::parse(path, text, separator)?;
    let id = table.column(TASK_ID)?;
    let effort = table.column(TASK_EFFORT)?;
    let deadline = table.column(TASK_DEADLINE)?;

    table
        .rows
        .iter()
        .map(|row| {
            Ok(Task {
                id: row.text(id, &table)?.to_string(),
                effort: row.time(effort, &table)?,
                deadline: row.time(deadline, &table)?,
            })
        })
        .collect()
}

/// Parse delimited resource rows; a missing name column falls back to the ID
pub fn parse_resources(
    path: &Path,
    text: &str,
    separator: char,
) -> Result<Vec<Resource>, InputError> {
    let table = Table::parse(path, text, separator)?;
    let id = table.column(RESOURCE_ID)?;
    let name = table.column(RESOURCE_NAME).ok();
    let capacity = table.column(RESOURCE_CAPACITY)?;

    table
        .rows
        .iter()
        .map(|row| {
            let id = row.text(id, &table)?.to_string();
            let name = match name {
                Some(col) => row.text(col, &table)?.to_string(),
                None => id.clone(),
            };
            Ok(Resource {
                id,
                name,
                daily_capacity: row.time(capacity, &table)?,
            })
        })
        .collect()
}

struct Row {
    line: usize,
    fields: Vec<String>,
}

impl Row {
    fn text<'a>(&'a self, column: Column, table: &Table) -> Result<&'a str, InputError> {
        self.fields
            .get(column.index)
            .map(String::as_str)
            .ok_or_else(|| table.error(self.line, format!("missing value for '{}'", column.name)))
    }

    /// Whole numbers; integral decimals such as `30.0` or `30,00` are accepted
    fn time(&self, column: Column, table: &Table) -> Result<Time, InputError> {
        let raw = self.text(column, table)?;
        parse_time(raw).ok_or_else(|| {
            table.error(
                self.line,
                format!("'{}' is not a whole number for '{}'", raw, column.name),
            )
        })
    }
}

/// `<int>` or `<int>.0*`, within the range of [`Time`]
fn parse_time(raw: &str) -> Option<Time> {
    let (whole, fraction) = match raw.split_once(['.', ',']) {
        Some((whole, fraction)) => (whole, fraction),
        None => (raw, ""),
    };
    if !fraction.chars().all(|c| c == '0') {
        return None;
    }
    whole.parse().ok()
}

#[derive(Clone, Copy)]
struct Column {
    index: usize,
    name: &'static str,
}

struct Table {
    path: PathBuf,
    header: HashMap<String, usize>,
    rows: Vec<Row>,
}

impl Table {
    fn parse(path: &Path, text: &str, separator: char) -> Result<Self, InputError> {
        let error = |line: usize, message: String| InputError::Parse {
            path: path.to_path_buf(),
            line,
            message,
        };

        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
            .filter(|(_, line)| !line.trim().is_empty());

        let (header_no, header_line) = lines.next().ok_or_else(|| InputError::Empty {
            path: path.to_path_buf(),
        })?;
        let header = split_fields(header_line.trim_start_matches('\u{feff}'), separator)
            .map_err(|message| error(header_no, message))?
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name.to_lowercase(), i))
            .collect();

        let rows = lines
            .map(|(line, text)| {
                split_fields(text, separator)
                    .map(|fields| Row { line, fields })
                    .map_err(|message| error(line, message))
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            path: path.to_path_buf(),
            header,
            rows,
        })
    }

    /// First header matching one of the aliases
    fn column(&self, aliases: &[&'static str]) -> Result<Column, InputError> {
        aliases
            .iter()
            .find_map(|&name| self.header.get(name).map(|&index| Column { index, name }))
            .ok_or_else(|| InputError::MissingColumn {
                path: self.path.clone(),
                column: aliases[0],
            })
    }

    fn error(&self, line: usize, message: String) -> InputError {
        InputError::Parse {
            path: self.path.clone(),
            line,
            message,
        }
    }
}

/// Split one line into trimmed fields.
///
/// A field may be wrapped in double quotes, in which case it can contain the
/// separator and `""` stands for a literal quote. Quoted content is kept
/// verbatim.
fn split_fields(line: &str, separator: char) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|&c| c != separator && c.is_whitespace()).is_some() {}

        let mut field = String::new();
        if chars.next_if_eq(&'"').is_some() {
            loop {
                match chars.next() {
                    Some('"') if chars.next_if_eq(&'"').is_some() => field.push('"'),
                    Some('"') => break,
                    Some(c) => field.push(c),
                    None => return Err("unterminated quoted field".to_string()),
                }
            }
            let mut trailing = String::new();
            while let Some(c) = chars.next_if(|&c| c != separator) {
                trailing.push(c);
            }
            if !trailing.trim().is_empty() {
                return Err(format!("unexpected text after quoted field \"{}\"", field));
            }
        } else {
            while let Some(c) = chars.next_if(|&c| c != separator) {
                field.push(c);
            }
            field = field.trim_end().to_string();
        }
        fields.push(field);

        if chars.next().is_none() {
            return Ok(fields);
        }
    }
}
