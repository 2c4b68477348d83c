//! Tab-separated and LaTeX renderings of pivot tables.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Utc;
use csv::{Terminator, WriterBuilder};
use dw_core::codec::{encode_sampling, PartialConfig};
use dw_core::context::SweepContext;
use dw_core::errors::{DwError, ErrorInfo};

use crate::pivot::PivotTable;

/// Sweep result file: header, evaluated names and one section per field.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDocument {
    /// `# key: value` lines.
    pub header: Vec<(String, String)>,
    /// Canonical names of the evaluated experiments.
    pub names: Vec<String>,
    /// One table per field.
    pub tables: Vec<PivotTable>,
}

fn table_error(err: impl ToString) -> DwError {
    DwError::Io(ErrorInfo::new("table-write", err.to_string()))
}

fn cell_text(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{value:.7e}")
    }
}

impl TableDocument {
    /// Writes the document as tab-separated text.
    pub fn write_tsv<W: Write>(&self, writer: W) -> Result<(), DwError> {
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(writer);
        for (key, value) in &self.header {
            writer.write_record([format!("# {key}: {value}")]).map_err(table_error)?;
        }
        writer.write_record(["# experiments"]).map_err(table_error)?;
        for name in &self.names {
            writer.write_record([name]).map_err(table_error)?;
        }
        for table in &self.tables {
            writer
                .write_record([format!("# {}", table.field.stem())])
                .map_err(table_error)?;
            let mut columns = vec![String::new()];
            columns.extend(table.axes.midpoints().iter().map(|midpoint| midpoint.to_string()));
            writer.write_record(&columns).map_err(table_error)?;
            for (steepness, cells) in table.axes.steepness().iter().zip(&table.cells) {
                let mut row = vec![steepness.to_string()];
                row.extend(cells.iter().map(|value| cell_text(*value)));
                writer.write_record(&row).map_err(table_error)?;
            }
        }
        writer.flush().map_err(table_error)
    }

    /// Writes the tab-separated document to `path`.
    pub fn save(&self, path: &Path) -> Result<(), DwError> {
        let file = File::create(path).map_err(|err| DwError::io("table-create", path, err))?;
        self.write_tsv(BufWriter::new(file))
    }

    /// Every table as a LaTeX `tabular`, separated by blank lines.
    pub fn to_latex(&self) -> String {
        self.tables.iter().map(to_latex).collect::<Vec<_>>().join("\n")
    }
}

fn latex_axis(value: f64) -> String {
    if value == f64::INFINITY {
        "$\\infty$".to_string()
    } else {
        value.to_string()
    }
}

/// LaTeX `tabular` of one table; missing cells print as `--`.
pub fn to_latex(table: &PivotTable) -> String {
    let midpoints = table.axes.midpoints();
    let mut out = String::new();
    out.push_str(&format!("% {}\n", table.field.stem()));
    out.push_str(&format!("\\begin{{tabular}}{{r|{}}}\n", "c".repeat(midpoints.len())));
    let head: Vec<String> = midpoints.iter().map(|midpoint| latex_axis(*midpoint)).collect();
    out.push_str(&format!(" & {} \\\\\n", head.join(" & ")));
    out.push_str("\\hline\n");
    for (steepness, cells) in table.axes.steepness().iter().zip(&table.cells) {
        let row: Vec<String> = cells
            .iter()
            .map(|value| if value.is_nan() { "--".to_string() } else { format!("{value:.3e}") })
            .collect();
        out.push_str(&format!("{} & {} \\\\\n", latex_axis(*steepness), row.join(" & ")));
    }
    out.push_str("\\end{tabular}\n");
    out
}

/// `(iters,feedback[,grad_iters])`, the shape the mode encodes in names.
fn iters_text(config: &PartialConfig) -> Option<String> {
    let mut parts = vec![config.iters?.to_string()];
    parts.extend(config.feedback.map(|feedback| feedback.to_string()));
    if config.selection_mode.is_gradient_based() {
        parts.extend(config.grad_iters.map(|grad_iters| grad_iters.to_string()));
    }
    Some(format!("({})", parts.join(",")))
}

/// Header entries describing a sweep; `config` supplies the shared render settings.
pub fn sweep_header(context: &SweepContext, config: Option<&PartialConfig>) -> Vec<(String, String)> {
    let mut header = vec![("scene".to_string(), context.scene_name.clone())];
    if let Some(iters) = config.and_then(iters_text) {
        header.push(("iters".to_string(), iters));
    }
    header.push(("fps".to_string(), context.fps.to_string()));
    header.push(("duration".to_string(), context.duration.to_string()));
    if let Some(config) = config {
        header.push(("selection".to_string(), config.selection_mode.name().to_string()));
        if let Some(mode) = config.normalization_mode {
            header.push(("normalization".to_string(), mode.name().to_string()));
        }
        header.push(("sampling".to_string(), encode_sampling(&config.sampling)));
    }
    header.push(("reference".to_string(), context.reference.display().to_string()));
    header.push(("error kind".to_string(), context.error_kind.name().to_string()));
    header.push(("generated at".to_string(), Utc::now().to_rfc3339()));
    header
}

/// Conventional result file name of a sweep around `config`.
pub fn default_table_name(config: &PartialConfig, fps: u32, duration: f64) -> String {
    format!(
        "{}_iters{}_fps({fps})_t({duration})_{}_ErrorMeasure.txt",
        config.scene_name,
        iters_text(config).unwrap_or_else(|| "()".to_string()),
        config.selection_mode.name()
    )
}

#[cfg(test)]
mod tests {
    use dw_core::config::{
        ExperimentConfig, FoveaMovement, FoveaShape, FoveatedSampling, NormalizationMode, SamplingDescriptor,
        SelectionMode,
    };
    use dw_core::measure::Field;

    use super::*;
    use crate::pivot::PivotAxes;

    fn table() -> PivotTable {
        PivotTable {
            field: Field::Mean,
            axes: PivotAxes::from_coordinates([(1.0, 0.0), (f64::INFINITY, 1.0)]),
            cells: vec![vec![0.5, f64::NAN], vec![f64::NAN, 0.25]],
        }
    }

    #[test]
    fn tsv_layout() {
        let document = TableDocument {
            header: vec![("scene".to_string(), "Scene".to_string())],
            names: vec!["Scene_iters(1,0)_Alpha(0.05)".to_string()],
            tables: vec![table()],
        };
        let mut bytes = Vec::new();
        document.write_tsv(&mut bytes).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "# scene: Scene",
                "# experiments",
                "Scene_iters(1,0)_Alpha(0.05)",
                "# mean",
                "\t0\t1",
                "1\t5.0000000e-1\t",
                "inf\t\t2.5000000e-1",
            ]
        );
    }

    #[test]
    fn latex_marks_missing_cells() {
        let latex = to_latex(&table());
        assert!(latex.contains("\\begin{tabular}{r|cc}"));
        assert!(latex.contains("$\\infty$ & -- & 2.500e-1 \\\\"));
    }

    #[test]
    fn gradient_names_carry_grad_iters() {
        let config = ExperimentConfig::builder("Scene", SelectionMode::Logistic)
            .iters(2, 0)
            .grad_iters(1)
            .midpoint(0.5)
            .steepness(10.0)
            .build()
            .unwrap();
        assert_eq!(
            default_table_name(&PartialConfig::from(&config), 30, 20.0),
            "Scene_iters(2,0,1)_fps(30)_t(20)_LOGISTIC_ErrorMeasure.txt"
        );
    }

    fn entry<'a>(header: &'a [(String, String)], key: &str) -> Option<&'a str> {
        header.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn header_iters_follow_the_mode() {
        let context = SweepContext::new("Scene", "/records", "Scene_reference");
        let weighted = ExperimentConfig::builder("Scene", SelectionMode::Weighted)
            .iters(3, 1)
            .build()
            .unwrap();
        let header = sweep_header(&context, Some(&PartialConfig::from(&weighted)));
        assert_eq!(entry(&header, "iters"), Some("(3,1)"));
        assert_eq!(entry(&header, "normalization"), None);
        assert_eq!(entry(&header, "sampling"), Some("None"));

        let bare = sweep_header(&context, None);
        assert_eq!(entry(&bare, "iters"), None);
        assert_eq!(entry(&bare, "scene"), Some("Scene"));
    }

    #[test]
    fn header_records_the_full_sampling_descriptor() {
        let context = SweepContext::new("Scene", "/records", "Scene_reference");
        let config = ExperimentConfig::builder("Scene", SelectionMode::Logistic)
            .iters(2, 0)
            .grad_iters(1)
            .midpoint(0.5)
            .steepness(10.0)
            .normalization(NormalizationMode::StandardDeviation)
            .sampling(SamplingDescriptor::Foveated(FoveatedSampling {
                shape: FoveaShape::Circle,
                radius: 150.0,
                sample_count: 4.0,
                movement: FoveaMovement::MoveAndStay {
                    speed: 2.0,
                    stay_duration: 0.5,
                },
            }))
            .build()
            .unwrap();
        let header = sweep_header(&context, Some(&PartialConfig::from(&config)));
        assert_eq!(entry(&header, "iters"), Some("(2,0,1)"));
        assert_eq!(entry(&header, "normalization"), Some("STANDARD_DEVIATION"));
        assert_eq!(
            entry(&header, "sampling"),
            Some("Foveated(CIRCLE,MOVE_AND_STAY,4.0)_Radius(150.0)_MoveAndStay(2.0,0.5)")
        );
    }
}
