//! # loadsplit-render
//!
//! Output writers for loadsplit allocations.
//!
//! This crate provides:
//! - Delimited rows, one per segment (spreadsheet import)
//! - A plain-text report grouped by resource
//! - Optional anchoring of schedule times to a calendar origin
//!
//! ## Example
//!
//! ```rust,ignore
//! use loadsplit_core::Renderer;
//! use loadsplit_render::{DelimitedRenderer, TextRenderer};
//!
//! let rows = DelimitedRenderer::new().separator(',').render(&allocation)?;
//! let report = TextRenderer::new().render(&allocation)?;
//! ```

pub mod delimited;
pub mod text;

pub use delimited::DelimitedRenderer;
pub use text::TextRenderer;

use chrono::NaiveDateTime;
use loadsplit_core::{RenderError, Time};

/// How absolute schedule times are written
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TimeFormat {
    /// Raw scheduling units since the origin
    #[default]
    Units,
    /// Minutes added to a calendar origin, written as `YYYY-MM-DD HH:MM`
    Anchored(NaiveDateTime),
}

impl TimeFormat {
    pub fn format(&self, time: Time) -> Result<String, RenderError> {
        match self {
            TimeFormat::Units => Ok(time.to_string()),
            TimeFormat::Anchored(origin) => chrono::Duration::try_minutes(time)
                .and_then(|offset| origin.checked_add_signed(offset))
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .ok_or_else(|| {
                    RenderError::InvalidData(format!("time {} is out of calendar range", time))
                }),
        }
    }
}
