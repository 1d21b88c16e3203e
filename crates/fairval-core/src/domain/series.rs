use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{PeriodEnd, ValidationError};

/// One labelled observation of a [`TimeSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub period: PeriodEnd,
    pub value: f64,
}

impl SeriesPoint {
    pub const fn new(period: PeriodEnd, value: f64) -> Self {
        Self { period, value }
    }
}

/// Historical statement line, stored most-recent period first.
///
/// Index 0 is always the newest period. Every point has a value and no period
/// appears twice. Arithmetic between two series only happens when both carry
/// the same periods in the same order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "Vec<SeriesPoint>")]
pub struct TimeSeries {
    name: &'static str,
    points: Vec<SeriesPoint>,
}

impl TimeSeries {
    /// Build a series from points in any order.
    pub fn new(
        name: &'static str,
        mut points: Vec<SeriesPoint>,
    ) -> Result<Self, ValidationError> {
        if points.is_empty() {
            return Err(ValidationError::EmptySeries { series: name });
        }
        if points.iter().any(|point| !point.value.is_finite()) {
            return Err(ValidationError::NonFiniteValue { field: name });
        }

        points.sort_by(|left, right| right.period.cmp(&left.period));
        if let Some(pair) = points.windows(2).find(|pair| pair[0].period == pair[1].period) {
            return Err(ValidationError::DuplicatePeriod {
                series: name,
                period: pair[0].period.to_string(),
            });
        }

        Ok(Self { name, points })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Relabel the series; used when a statement line is attached to its
    /// owning statement.
    pub fn renamed(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn periods(&self) -> impl Iterator<Item = PeriodEnd> + '_ {
        self.points.iter().map(|point| point.period)
    }

    /// Values, newest first.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }

    pub fn latest(&self) -> SeriesPoint {
        self.points[0]
    }

    pub fn is_aligned_with(&self, other: &TimeSeries) -> bool {
        self.points.len() == other.points.len() && self.periods().eq(other.periods())
    }

    /// Pair up the values of two aligned series period by period.
    pub fn pair_with(
        &self,
        other: &TimeSeries,
    ) -> Result<Vec<(PeriodEnd, f64, f64)>, ValidationError> {
        if !self.is_aligned_with(other) {
            return Err(ValidationError::MisalignedPeriods {
                left: self.name,
                right: other.name,
            });
        }

        Ok(self
            .points
            .iter()
            .zip(&other.points)
            .map(|(left, right)| (left.period, left.value, right.value))
            .collect())
    }

    /// Element-wise combination of two aligned series.
    pub fn zip_with(
        &self,
        other: &TimeSeries,
        name: &'static str,
        combine: impl Fn(f64, f64) -> f64,
    ) -> Result<TimeSeries, ValidationError> {
        let points = self
            .pair_with(other)?
            .into_iter()
            .map(|(period, left, right)| SeriesPoint::new(period, combine(left, right)))
            .collect();
        TimeSeries::new(name, points)
    }
}

impl TryFrom<Vec<SeriesPoint>> for TimeSeries {
    type Error = ValidationError;

    fn try_from(value: Vec<SeriesPoint>) -> Result<Self, Self::Error> {
        TimeSeries::new("series", value)
    }
}

impl<'de> Deserialize<'de> for TimeSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let points = Vec::<SeriesPoint>::deserialize(deserializer)?;
        Self::try_from(points).map_err(D::Error::custom)
    }
}

impl From<TimeSeries> for Vec<SeriesPoint> {
    fn from(value: TimeSeries) -> Self {
        value.points
    }
}
