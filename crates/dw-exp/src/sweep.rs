//! Evaluation of every candidate of a sweep against one reference.

use std::path::{Path, PathBuf};

use dw_cache::{ErrorRecord, ResultCache};
use dw_core::codec::{encode, CanonicalName, PartialConfig};
use dw_core::config::{ExperimentConfig, SelectionMode};
use dw_core::context::SweepContext;
use dw_core::errors::{DwError, ErrorInfo};
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::pivot::{build_tables, PivotAxes, PivotTable};
use crate::table::{default_table_name, sweep_header, TableDocument};

/// Outcome of one sweep item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemStatus {
    /// Errors were read from cache or computed.
    Evaluated {
        /// True when frames were decoded for this item.
        recomputed: bool,
    },
    /// The item was skipped; the sweep went on.
    Failed(DwError),
}

/// Per-candidate entry of a [`SweepReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct SweepItem {
    /// Canonical name of the candidate run.
    pub name: CanonicalName,
    /// Fields encoded in the name.
    pub config: PartialConfig,
    /// What happened to it.
    pub status: ItemStatus,
}

/// Result of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    /// Every attempted candidate in input order.
    pub items: Vec<SweepItem>,
    /// Frame-averaged errors of the evaluated candidates.
    pub records: Vec<ErrorRecord>,
    /// Pivot axes spanned by every item, failed ones included.
    pub axes: PivotAxes,
    /// One table per context field.
    pub tables: Vec<PivotTable>,
}

impl SweepReport {
    /// Items that failed.
    pub fn failures(&self) -> impl Iterator<Item = &SweepItem> {
        self.items
            .iter()
            .filter(|item| matches!(item.status, ItemStatus::Failed(_)))
    }

    /// Configuration the sweep is about: the first item outside the
    /// unweighted and weighted baselines, else the first item.
    pub fn subject(&self) -> Option<&PartialConfig> {
        let baseline = |mode| matches!(mode, SelectionMode::Unweighted | SelectionMode::Weighted);
        self.items
            .iter()
            .find(|item| !baseline(item.config.selection_mode))
            .or_else(|| self.items.first())
            .map(|item| &item.config)
    }

    /// Result document; the header's render settings come from [`SweepReport::subject`].
    pub fn document(&self, context: &SweepContext) -> TableDocument {
        TableDocument {
            header: sweep_header(context, self.subject()),
            names: self.records.iter().map(|record| record.name.to_string()).collect(),
            tables: self.tables.clone(),
        }
    }

    /// Saves the document into `dir` under the conventional name of the subject.
    pub fn save(&self, context: &SweepContext, dir: &Path) -> Result<PathBuf, DwError> {
        let subject = self
            .subject()
            .ok_or_else(|| DwError::config("sweep-empty", "a sweep without items has no result file"))?;
        let path = dir.join(default_table_name(subject, context.fps, context.duration));
        self.document(context).save(&path)?;
        info!(path = %path.display(), "wrote sweep tables");
        Ok(path)
    }
}

/// Evaluates `items`, checking each candidate's metadata against its config.
fn evaluate(
    context: &SweepContext,
    items: impl IntoIterator<Item = (CanonicalName, PartialConfig)>,
) -> Result<SweepReport, DwError> {
    let cache = ResultCache::new(context.clone())?;
    let mut report_items = Vec::new();
    let mut records = Vec::new();
    for (name, config) in items {
        let status = match cache.get_or_compute_all(&name, Some(&config)) {
            Ok(outcome) => {
                info!(name = %name, recomputed = outcome.recomputed, "evaluated candidate");
                records.push(ErrorRecord::from_outcome(name.clone(), config.clone(), &outcome));
                ItemStatus::Evaluated {
                    recomputed: outcome.recomputed,
                }
            }
            Err(err) => {
                error!(name = %name, error = %err, "candidate skipped");
                ItemStatus::Failed(err)
            }
        };
        report_items.push(SweepItem { name, config, status });
    }
    let axes = PivotAxes::from_coordinates(report_items.iter().map(|item| item.config.table_coordinates()));
    let tables = build_tables(&context.fields, &axes, &records);
    Ok(SweepReport {
        items: report_items,
        records,
        axes,
        tables,
    })
}

/// Evaluates every configuration against the context's reference.
///
/// Candidate metadata must agree with its configuration. Per-item failures
/// are recorded in the report and do not stop the sweep.
pub fn run_sweep(context: &SweepContext, configs: &[ExperimentConfig]) -> Result<SweepReport, DwError> {
    evaluate(
        context,
        configs
            .iter()
            .map(|config| (encode(config), PartialConfig::from(config))),
    )
}

/// Candidate runs under the record root whose names decode for the context's scene.
pub fn discover_candidates(context: &SweepContext) -> Result<Vec<(CanonicalName, PartialConfig)>, DwError> {
    let prefix = format!("{}_", context.scene_name);
    let reference = context.reference_dir();
    let mut found = Vec::new();
    for entry in WalkDir::new(&context.record_root).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|err| {
            DwError::Io(
                ErrorInfo::new("discover-walk", err.to_string()).with_path(&context.record_root),
            )
        })?;
        if !entry.file_type().is_dir() || entry.path() == reference {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !name.starts_with(&prefix) {
            continue;
        }
        match CanonicalName::parse(name, &context.scene_name) {
            Ok(candidate) => found.push(candidate),
            Err(err) => debug!(name, error = %err, "ignoring undecodable directory"),
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));
    info!(count = found.len(), root = %context.record_root.display(), "discovered candidates");
    Ok(found)
}

/// Evaluates every discovered candidate.
///
/// Each candidate's metadata must agree with the fields decoded from its name.
pub fn evaluate_discovered(context: &SweepContext) -> Result<SweepReport, DwError> {
    evaluate(context, discover_candidates(context)?)
}
