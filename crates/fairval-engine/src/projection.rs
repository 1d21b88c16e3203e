use fairval_core::ProjectionPeriod;
use serde::{Serialize, Serializer};

use crate::trend::HORIZON;

/// Values for the five explicit forecast periods, furthest future first.
///
/// Index `i` belongs to `ProjectionPeriod::EXPLICIT[i]`: `+4Y`, `+3Y`, `+2Y`,
/// `+1Y`, `0Y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    values: [f64; HORIZON],
}

impl Projection {
    pub const fn from_furthest_first(values: [f64; HORIZON]) -> Self {
        Self { values }
    }

    pub const fn constant(value: f64) -> Self {
        Self {
            values: [value; HORIZON],
        }
    }

    pub const fn values(&self) -> [f64; HORIZON] {
        self.values
    }

    /// Value of an explicit period; `None` for the terminal bucket.
    pub fn get(&self, period: ProjectionPeriod) -> Option<f64> {
        ProjectionPeriod::EXPLICIT
            .iter()
            .position(|candidate| *candidate == period)
            .map(|index| self.values[index])
    }

    /// Value of the furthest explicit period (`+4Y`).
    pub const fn furthest(&self) -> f64 {
        self.values[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProjectionPeriod, f64)> + '_ {
        ProjectionPeriod::EXPLICIT
            .into_iter()
            .zip(self.values.iter().copied())
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            values: self.values.map(f),
        }
    }

    /// Period-by-period combination with another projection.
    pub fn zip_with(&self, other: &Projection, f: impl Fn(f64, f64) -> f64) -> Self {
        Self {
            values: std::array::from_fn(|index| f(self.values[index], other.values[index])),
        }
    }
}

impl Serialize for Projection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}
