//! Delimited (CSV-style) renderer
//!
//! One row per segment, in allocation order:
//!
//! ```text
//! task_id;resource_id;resource_name;start;end;task_effort;deadline;slack;total_effort;lead_time
//! t500;r1;Ana;0;300;300;500;200;300;200
//! ```
//!
//! `total_effort` is the final effort of the segment's resource and
//! `lead_time` the margin of the segment's task.

use std::collections::HashMap;

use loadsplit_core::{Allocation, RenderError, Renderer, Time};

use crate::TimeFormat;

const COLUMNS: [&str; 10] = [
    "task_id",
    "resource_id",
    "resource_name",
    "start",
    "end",
    "task_effort",
    "deadline",
    "slack",
    "total_effort",
    "lead_time",
];

/// Delimited text renderer
#[derive(Clone, Debug)]
pub struct DelimitedRenderer {
    /// Field separator
    pub separator: char,
    /// Whether to write the header row
    pub header: bool,
    /// How `start`, `end` and `deadline` are written
    pub time_format: TimeFormat,
}

impl Default for DelimitedRenderer {
    fn default() -> Self {
        Self {
            separator: ';',
            header: true,
            time_format: TimeFormat::Units,
        }
    }
}

impl DelimitedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field separator
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Omit the header row
    pub fn no_header(mut self) -> Self {
        self.header = false;
        self
    }

    /// Set the time format
    pub fn time_format(mut self, format: TimeFormat) -> Self {
        self.time_format = format;
        self
    }

    /// Quote a field if it contains the separator, a quote or a line break
    fn escape(&self, field: &str) -> String {
        if field.contains(self.separator) || field.contains(['"', '\n', '\r']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn push_row(&self, out: &mut String, fields: &[String]) {
        let sep = self.separator.to_string();
        let row: Vec<String> = fields.iter().map(|f| self.escape(f)).collect();
        out.push_str(&row.join(&sep));
        out.push('\n');
    }
}

impl Renderer for DelimitedRenderer {
    type Output = String;

    fn render(&self, allocation: &Allocation) -> Result<String, RenderError> {
        if matches!(self.separator, '"' | '\n' | '\r') {
            return Err(RenderError::Format(format!(
                "unusable separator {:?}",
                self.separator
            )));
        }

        let totals: HashMap<&str, Time> = allocation
            .resource_loads
            .iter()
            .map(|r| (r.resource_id.as_str(), r.total_effort))
            .collect();
        let leads: HashMap<&str, Time> = allocation
            .lead_times
            .iter()
            .map(|l| (l.task_id.as_str(), l.lead_time))
            .collect();

        let mut out = String::new();
        if self.header {
            let header: Vec<String> = COLUMNS.iter().map(|c| (*c).to_string()).collect();
            self.push_row(&mut out, &header);
        }

        for segment in &allocation.segments {
            let total = totals.get(segment.resource_id.as_str()).ok_or_else(|| {
                RenderError::InvalidData(format!(
                    "segment of task '{}' references unknown resource '{}'",
                    segment.task_id, segment.resource_id
                ))
            })?;
            let lead = leads.get(segment.task_id.as_str()).ok_or_else(|| {
                RenderError::InvalidData(format!(
                    "no lead time for task '{}'",
                    segment.task_id
                ))
            })?;

            self.push_row(
                &mut out,
                &[
                    segment.task_id.clone(),
                    segment.resource_id.clone(),
                    segment.resource_name.clone(),
                    self.time_format.format(segment.start)?,
                    self.time_format.format(segment.end)?,
                    segment.task_effort.to_string(),
                    self.time_format.format(segment.deadline)?,
                    segment.slack.to_string(),
                    total.to_string(),
                    lead.to_string(),
                ],
            );
        }

        Ok(out)
    }
}
