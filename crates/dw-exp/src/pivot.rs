//! Pivot of frame-averaged errors over (steepness, midpoint).

use dw_cache::ErrorRecord;
use dw_core::measure::Field;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Sorted distinct row (steepness) and column (midpoint) values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PivotAxes {
    steepness: Vec<f64>,
    midpoints: Vec<f64>,
}

fn sorted_distinct(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

fn position(axis: &[f64], value: f64) -> Option<usize> {
    axis.iter().position(|entry| *entry == value)
}

impl PivotAxes {
    /// Axes spanning the `(steepness, midpoint)` coordinates; NaN coordinates are skipped.
    pub fn from_coordinates(coordinates: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (steepness, midpoints): (Vec<f64>, Vec<f64>) = coordinates
            .into_iter()
            .filter(|(steepness, midpoint)| !steepness.is_nan() && !midpoint.is_nan())
            .unzip();
        Self {
            steepness: sorted_distinct(steepness),
            midpoints: sorted_distinct(midpoints),
        }
    }

    /// Row values, ascending with `+inf` last.
    pub fn steepness(&self) -> &[f64] {
        &self.steepness
    }

    /// Column values, ascending.
    pub fn midpoints(&self) -> &[f64] {
        &self.midpoints
    }

    /// `(row, column)` of the cell at `(steepness, midpoint)`.
    pub fn cell(&self, steepness: f64, midpoint: f64) -> Option<(usize, usize)> {
        Some((position(&self.steepness, steepness)?, position(&self.midpoints, midpoint)?))
    }
}

/// One field pivoted over the axes; missing cells are `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    /// Tabulated field.
    pub field: Field,
    /// Row and column values.
    pub axes: PivotAxes,
    /// Cells indexed `[row][column]`.
    pub cells: Vec<Vec<f64>>,
}

impl PivotTable {
    /// Cell at `(steepness, midpoint)`, `None` outside the axes.
    pub fn get(&self, steepness: f64, midpoint: f64) -> Option<f64> {
        let (row, column) = self.axes.cell(steepness, midpoint)?;
        Some(self.cells[row][column])
    }
}

/// One table per field. A cell claimed twice keeps its first record.
pub fn build_tables(fields: &[Field], axes: &PivotAxes, records: &[ErrorRecord]) -> Vec<PivotTable> {
    let (rows, columns) = (axes.steepness().len(), axes.midpoints().len());
    let mut owners: Vec<Vec<Option<usize>>> = vec![vec![None; columns]; rows];
    for (index, record) in records.iter().enumerate() {
        let (steepness, midpoint) = record.config.table_coordinates();
        let Some((row, column)) = axes.cell(steepness, midpoint) else {
            warn!(name = %record.name, steepness, midpoint, "record lies outside the pivot axes");
            continue;
        };
        match owners[row][column] {
            Some(first) => warn!(
                kept = %records[first].name,
                dropped = %record.name,
                steepness,
                midpoint,
                "duplicate pivot cell"
            ),
            None => owners[row][column] = Some(index),
        }
    }
    fields
        .iter()
        .map(|&field| PivotTable {
            field,
            axes: axes.clone(),
            cells: owners
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|owner| owner.map_or(f64::NAN, |index| records[index].mean(field)))
                        .collect()
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinity_sorts_last_and_nan_is_dropped() {
        let axes = PivotAxes::from_coordinates([
            (f64::INFINITY, 0.0),
            (10.0, 0.5),
            (1.0, 1.0),
            (f64::NAN, 0.25),
            (10.0, 0.0),
        ]);
        assert_eq!(axes.steepness(), &[1.0, 10.0, f64::INFINITY]);
        assert_eq!(axes.midpoints(), &[0.0, 0.5, 1.0]);
        assert_eq!(axes.cell(f64::INFINITY, 0.5), Some((2, 1)));
        assert_eq!(axes.cell(2.0, 0.5), None);
    }
}
