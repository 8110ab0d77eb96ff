//! # Float sets
//! Conceptually infinite sets of real numbers, queried for their finite
//! intersection with an interval. The sampling stage walks such a set along a
//! growing spline to decide where brush tips land.

use crate::interval::Interval;

/// An infinite (or periodic) set of discrete real values.
pub trait FloatSet {
    /// The values of the set inside `interval`, ascending, without duplicates,
    /// bounded by the interval exactly (endpoint openness respected). Empty
    /// and degenerate intervals yield an empty vector.
    fn values_in(&self, interval: &Interval<f64>) -> Vec<f64>;
}

/// A periodic pattern of a finite run of equidistant values followed by a gap,
/// visually `xxxx-xxxx-xxxx-`.
///
/// The represented set is
/// `{pivot_value + k * value_distance + m * period}` for
/// `k in [0, values_per_sequence)`, `m` any integer, with
/// `period = (values_per_sequence - 1) * value_distance + sequence_distance`.
///
/// For example, `{.., -1.5, -0.5, 3.5, 4.5, 8.5, 9.5, ..}` is
/// `pivot_value: -1.5, values_per_sequence: 2, value_distance: 1,
/// sequence_distance: 4`.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicFloatSet {
    pivot_value: f64,
    values_per_sequence: usize,
    value_distance: f64,
    sequence_distance: f64,
}

impl PeriodicFloatSet {
    /// Panics if `values_per_sequence` is zero or either distance is not a
    /// positive finite number.
    pub fn new(
        pivot_value: f64,
        values_per_sequence: usize,
        value_distance: f64,
        sequence_distance: f64,
    ) -> Self {
        assert!(
            values_per_sequence > 0,
            "periodic float set requires at least one value per sequence"
        );
        assert!(
            value_distance > 0.0 && value_distance.is_finite(),
            "value distance must be positive and finite"
        );
        assert!(
            sequence_distance > 0.0 && sequence_distance.is_finite(),
            "sequence distance must be positive and finite"
        );
        Self {
            pivot_value,
            values_per_sequence,
            value_distance,
            sequence_distance,
        }
    }

    #[must_use]
    pub fn pivot_value(&self) -> f64 {
        self.pivot_value
    }
    #[must_use]
    pub fn values_per_sequence(&self) -> usize {
        self.values_per_sequence
    }
    #[must_use]
    pub fn value_distance(&self) -> f64 {
        self.value_distance
    }
    #[must_use]
    pub fn sequence_distance(&self) -> f64 {
        self.sequence_distance
    }

    /// Distance between the first values of two consecutive sequences.
    #[must_use]
    pub fn period(&self) -> f64 {
        (self.values_per_sequence - 1) as f64 * self.value_distance + self.sequence_distance
    }
}

impl FloatSet for PeriodicFloatSet {
    fn values_in(&self, interval: &Interval<f64>) -> Vec<f64> {
        if interval.is_empty() {
            return Vec::new();
        }
        let period = self.period();
        let run = (self.values_per_sequence - 1) as f64 * self.value_distance;
        // Conservative sequence index bounds; `contains` below does the exact
        // per-value filtering, the ±1 margin absorbs roundoff.
        let first = ((interval.inf() - self.pivot_value - run) / period).floor() as i64 - 1;
        let last = ((interval.sup() - self.pivot_value) / period).ceil() as i64 + 1;

        let mut values = Vec::new();
        for m in first..=last {
            let start = self.pivot_value + m as f64 * period;
            for k in 0..self.values_per_sequence {
                let value = start + k as f64 * self.value_distance;
                if interval.contains(value) {
                    values.push(value);
                }
            }
        }
        values
    }
}
