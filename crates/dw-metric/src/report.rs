use std::collections::BTreeMap;

use dw_core::measure::Field;
use serde::{Deserialize, Serialize};

/// Scalars extracted from one frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameReport {
    values: BTreeMap<Field, f64>,
}

impl FrameReport {
    /// Records `value` for `field`.
    pub fn insert(&mut self, field: Field, value: f64) {
        self.values.insert(field, value);
    }

    /// Value of `field`, if it was computed.
    pub fn get(&self, field: Field) -> Option<f64> {
        self.values.get(&field).copied()
    }

    /// Computed fields in report order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        self.values.iter().map(|(field, value)| (*field, *value))
    }

    /// True when every value has the same bit pattern in both reports.
    pub fn bitwise_eq(&self, other: &FrameReport) -> bool {
        self.values.len() == other.values.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|((fa, va), (fb, vb))| fa == fb && va.to_bits() == vb.to_bits())
    }
}
