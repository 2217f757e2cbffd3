//! Plain-text allocation report
//!
//! ```text
//! Resource r1 (Ana)  effort 300  load 0.62  tasks 1
//!   t500                 0 -> 300          lead 200
//!
//! Missed deadlines
//!   t3 on large: finished 140, deadline 60 (80 late)
//!
//! Summary
//!   tasks 3, segments 4, makespan 1560, missed 0, load spread 0.62, moves 0, passes 1
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;

use loadsplit_core::{Allocation, RenderError, Renderer, Time};

use crate::TimeFormat;

/// Human-readable report renderer
#[derive(Clone, Debug)]
pub struct TextRenderer {
    /// Width of the task ID column
    pub id_width: usize,
    /// Whether to list the rebalancing moves
    pub show_moves: bool,
    pub time_format: TimeFormat,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            id_width: 16,
            show_moves: false,
            time_format: TimeFormat::Units,
        }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include the rebalancing moves section
    pub fn with_moves(mut self) -> Self {
        self.show_moves = true;
        self
    }

    /// Set the time format
    pub fn time_format(mut self, format: TimeFormat) -> Self {
        self.time_format = format;
        self
    }

    fn write_resources(&self, out: &mut String, allocation: &Allocation) -> Result<(), RenderError> {
        let leads: HashMap<&str, Time> = allocation
            .lead_times
            .iter()
            .map(|l| (l.task_id.as_str(), l.lead_time))
            .collect();

        for load in &allocation.resource_loads {
            writeln!(
                out,
                "Resource {} ({})  effort {}  load {:.2}  tasks {}",
                load.resource_id,
                load.resource_name,
                load.total_effort,
                load.load_factor,
                load.task_count
            )
            .map_err(fmt_error)?;

            for segment in allocation.segments_for_resource(&load.resource_id) {
                let lead = leads.get(segment.task_id.as_str()).copied().unwrap_or(0);
                writeln!(
                    out,
                    "  {:<width$} {:>16} -> {:<16} lead {}",
                    segment.task_id,
                    self.time_format.format(segment.start)?,
                    self.time_format.format(segment.end)?,
                    lead,
                    width = self.id_width
                )
                .map_err(fmt_error)?;
            }
            out.push('\n');
        }
        Ok(())
    }

    fn write_missed(&self, out: &mut String, allocation: &Allocation) -> Result<(), RenderError> {
        let missed = allocation.missed_deadlines();
        if missed.is_empty() {
            return Ok(());
        }

        out.push_str("Missed deadlines\n");
        for lead in missed {
            writeln!(
                out,
                "  {} on {}: finished {}, deadline {} ({} late)",
                lead.task_id,
                lead.resource_id,
                self.time_format.format(lead.finish)?,
                self.time_format.format(lead.finish + lead.lead_time)?,
                -lead.lead_time
            )
            .map_err(fmt_error)?;
        }
        out.push('\n');
        Ok(())
    }

    fn write_moves(out: &mut String, allocation: &Allocation) -> Result<(), RenderError> {
        if allocation.moves.is_empty() {
            return Ok(());
        }

        out.push_str("Rebalancing moves\n");
        for m in &allocation.moves {
            writeln!(
                out,
                "  pass {}: {} {} -> {} (load {:.2} -> {:.2})",
                m.pass, m.task_id, m.from, m.to, m.from_load_before, m.to_load_after
            )
            .map_err(fmt_error)?;
        }
        out.push('\n');
        Ok(())
    }
}

fn fmt_error(err: std::fmt::Error) -> RenderError {
    RenderError::Format(err.to_string())
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, allocation: &Allocation) -> Result<String, RenderError> {
        let mut out = String::new();

        self.write_resources(&mut out, allocation)?;
        self.write_missed(&mut out, allocation)?;
        if self.show_moves {
            Self::write_moves(&mut out, allocation)?;
        }

        let summary = allocation.summary();
        out.push_str("Summary\n");
        writeln!(
            out,
            "  tasks {}, segments {}, makespan {}, missed {}, load spread {:.2}, moves {}, passes {}",
            summary.task_count,
            summary.segment_count,
            self.time_format.format(summary.makespan)?,
            summary.missed_deadlines,
            summary.load_spread,
            summary.moves,
            summary.passes
        )
        .map_err(fmt_error)?;

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadsplit_core::{AllocationSegment, ResourceLoad, TaskLeadTime, TaskMove};

    fn late_allocation() -> Allocation {
        Allocation {
            segments: vec![AllocationSegment {
                task_id: "t3".into(),
                resource_id: "large".into(),
                resource_name: "Large".into(),
                start: 100,
                end: 140,
                task_effort: 40,
                deadline: 60,
                slack: 20,
            }],
            lead_times: vec![TaskLeadTime {
                task_id: "t3".into(),
                resource_id: "large".into(),
                finish: 140,
                lead_time: -80,
            }],
            resource_loads: vec![ResourceLoad {
                resource_id: "large".into(),
                resource_name: "Large".into(),
                total_effort: 40,
                load_factor: 0.1,
                task_count: 1,
            }],
            moves: vec![TaskMove {
                task_id: "t3".into(),
                from: "small".into(),
                to: "large".into(),
                pass: 1,
                from_load_before: 0.8,
                to_load_after: 0.1,
            }],
            passes: 2,
        }
    }

    #[test]
    fn lists_missed_deadlines() {
        let out = TextRenderer::new().render(&late_allocation()).unwrap();
        assert!(out.contains("Resource large (Large)  effort 40  load 0.10  tasks 1"));
        assert!(out.contains("Missed deadlines"));
        assert!(out.contains("t3 on large: finished 140, deadline 60 (80 late)"));
        assert!(out.contains("missed 1"));
        assert!(!out.contains("Rebalancing moves"));
    }

    #[test]
    fn moves_section_is_optional() {
        let out = TextRenderer::new().with_moves().render(&late_allocation()).unwrap();
        assert!(out.contains("pass 1: t3 small -> large (load 0.80 -> 0.10)"));
    }

    #[test]
    fn empty_allocation_still_has_summary() {
        let out = TextRenderer::new().render(&Allocation::default()).unwrap();
        assert!(out.starts_with("Summary"));
        assert!(out.contains("tasks 0, segments 0, makespan 0"));
    }
}
