#![doc = "Sweep orchestration over recorded runs and aggregation of frame-averaged errors into pivot tables."]

pub mod logging;
pub mod pivot;
pub mod sweep;
pub mod table;

pub use logging::init_logging;
pub use pivot::{build_tables, PivotAxes, PivotTable};
pub use sweep::{discover_candidates, evaluate_discovered, run_sweep, ItemStatus, SweepItem, SweepReport};
pub use table::{default_table_name, sweep_header, to_latex, TableDocument};
