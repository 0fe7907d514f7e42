//! Report output model for headless playback runs.

use crate::headless::HeadlessOutcome;
use anyhow::Result;
use lotview_core::{AggregateCounters, RunStatus};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Component, Path};
use thiserror::Error;

/// Machine-readable result of a headless playback run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackReport {
    pub renderer: String,
    pub elapsed_frames: u64,
    /// Logical wall time delivered to the clock, in ms.
    pub elapsed_ms: f64,
    pub final_index: usize,
    pub snapshot_count: usize,
    /// Playback stopped on the last snapshot within the frame budget.
    pub finished: bool,
    /// Upstream run status, when the document carried one.
    pub run_status: Option<RunStatus>,
    pub final_stats: AggregateCounters,
}

impl PlaybackReport {
    pub fn from_outcome(renderer: &str, outcome: &HeadlessOutcome) -> Self {
        Self {
            renderer: renderer.to_string(),
            elapsed_frames: outcome.driver.frames,
            elapsed_ms: outcome.driver.elapsed_ms,
            final_index: outcome.final_index,
            snapshot_count: outcome.snapshot_count,
            finished: outcome.driver.finished,
            run_status: outcome.run_status,
            final_stats: outcome.final_stats.clone(),
        }
    }

    /// Write the report to `path`, which must stay inside the working directory.
    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        check_report_path(path)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to_writer(&mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Pretty JSON followed by a newline.
    pub fn write_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}

/// Why a report path was refused
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReportPathError {
    #[error("report path {0} is absolute; pass a relative path")]
    Absolute(String),
    #[error("report path {0} leaves the working directory")]
    Escapes(String),
}

fn check_report_path(path: &Path) -> Result<(), ReportPathError> {
    let shown = path.display().to_string();
    if path.has_root() {
        return Err(ReportPathError::Absolute(shown));
    }
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                return Err(ReportPathError::Absolute(shown))
            }
            Component::ParentDir => return Err(ReportPathError::Escapes(shown)),
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    Ok(())
}
