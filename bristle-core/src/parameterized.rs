//! # Parameterized objects
//! A parameterized object maps a single real parameter to a keyed set of real
//! values - think of the keys as the axes of a point in R^n. Compound objects
//! bundle one basic interpolant per key over a shared intrinsic range; the
//! factory builds them from windows of interpolatable objects.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::interpolant::{BasicParameterizedObjectFactory, PolynomialInterpolant};
use crate::interval::Interval;
use crate::property::{Interpolatable, PropertyKey};
use crate::sample::{KeyToValues, SampleValues};

/// A mapping from a scalar parametric value to `key -> value` pairs, defined
/// over an intrinsic range. Values outside the range extrapolate.
pub trait ParameterizedObject {
    /// Keys of the produced mapping, ascending by key order.
    fn parameterization_keys(&self) -> Vec<PropertyKey>;

    /// Lower bound of the intrinsic parametric range. Not greater than
    /// [`ParameterizedObject::max_parametric_value`].
    fn min_parametric_value(&self) -> f64;

    /// Upper bound of the intrinsic parametric range.
    fn max_parametric_value(&self) -> f64;

    /// The value under `key` at parametric value `t`. The key must be among
    /// [`ParameterizedObject::parameterization_keys`].
    fn value_at(&self, t: f64, key: &PropertyKey) -> f64;

    /// Batch variant of [`ParameterizedObject::value_at`].
    fn values_at(&self, ts: &[f64], key: &PropertyKey) -> Vec<f64> {
        ts.iter().map(|&t| self.value_at(t, key)).collect()
    }

    /// The full keyed mapping at `t`.
    fn mapping_at(&self, t: f64) -> BTreeMap<PropertyKey, f64> {
        self.parameterization_keys()
            .into_iter()
            .map(|key| {
                let value = self.value_at(t, &key);
                (key, value)
            })
            .collect()
    }

    /// Sample every key at every parametric value in `ts`.
    fn samples_at(&self, ts: &[f64]) -> SampleValues {
        if ts.is_empty() {
            return SampleValues::empty();
        }
        let mapping: KeyToValues = self
            .parameterization_keys()
            .into_iter()
            .map(|key| {
                let values = self.values_at(ts, &key);
                (key, values)
            })
            .collect();
        SampleValues::new(ts.to_vec(), Some(mapping))
    }

    /// The intrinsic range as a closed interval.
    fn parametric_range(&self) -> Interval<f64> {
        Interval::closed(self.min_parametric_value(), self.max_parametric_value())
    }
}

/// A set of keyed basic interpolants sharing one intrinsic parametric range.
///
/// Immutable once constructed; the owning factory creates a fresh instance per
/// control-point window.
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundParameterizedObject {
    /// Entries ascending by key; small enough that linear lookup wins.
    entries: Vec<(PropertyKey, PolynomialInterpolant)>,
}

impl CompoundParameterizedObject {
    /// Panics if `entries` is empty, unsorted by key, or its interpolants do
    /// not share one intrinsic range.
    pub fn new(entries: Vec<(PropertyKey, PolynomialInterpolant)>) -> Self {
        assert!(
            !entries.is_empty(),
            "compound parameterized object requires at least one entry"
        );
        assert!(
            entries.windows(2).all(|w| w[0].0 < w[1].0),
            "entries must be strictly ascending by key"
        );
        let (min, max) = (
            entries[0].1.min_parametric_value(),
            entries[0].1.max_parametric_value(),
        );
        assert!(
            entries
                .iter()
                .all(|(_, p)| p.min_parametric_value() == min
                    && p.max_parametric_value() == max),
            "all entries must share one intrinsic parametric range"
        );
        Self { entries }
    }

    fn interpolant_for(&self, key: &PropertyKey) -> &PolynomialInterpolant {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, p)| p)
            .unwrap_or_else(|| panic!("no parameterization for key {key}"))
    }
}

impl ParameterizedObject for CompoundParameterizedObject {
    fn parameterization_keys(&self) -> Vec<PropertyKey> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }
    fn min_parametric_value(&self) -> f64 {
        self.entries[0].1.min_parametric_value()
    }
    fn max_parametric_value(&self) -> f64 {
        self.entries[0].1.max_parametric_value()
    }
    fn value_at(&self, t: f64, key: &PropertyKey) -> f64 {
        self.interpolant_for(key).value_at(t)
    }
}

/// Builds [`CompoundParameterizedObject`]s from fixed-size windows of
/// interpolatable objects, one basic interpolant per property key common to
/// the whole window.
#[derive(Clone, Debug, Default)]
pub struct CompoundParameterizedObjectFactory<F> {
    basic: F,
}

impl<F: BasicParameterizedObjectFactory> CompoundParameterizedObjectFactory<F> {
    pub fn new(basic: F) -> Self {
        Self { basic }
    }

    /// Number of interpolatable objects a window must hold. Positive.
    #[must_use]
    pub fn required_interpolatable_objects(&self) -> usize {
        self.basic.required_values()
    }

    /// Index range into the window identifying which consecutive objects the
    /// intrinsic parametric range interpolates between.
    #[must_use]
    pub fn intrinsic_range(&self) -> Range<usize> {
        self.basic.intrinsic_range()
    }

    /// Build a compound object from exactly
    /// [`Self::required_interpolatable_objects`] objects. Any other window
    /// length is a caller bug and panics.
    pub fn object_from_interpolatables<O: Interpolatable>(
        &self,
        objects: &[O],
    ) -> CompoundParameterizedObject {
        assert_eq!(
            objects.len(),
            self.required_interpolatable_objects(),
            "parameterized object factory window length mismatch"
        );
        // Keys common to the whole window; ascending since every
        // properties_to_interpolate is.
        let mut keys = objects[0].properties_to_interpolate();
        for object in &objects[1..] {
            let theirs = object.properties_to_interpolate();
            keys.retain(|key| theirs.contains(key));
        }
        let entries = keys
            .into_iter()
            .map(|key| {
                let values: smallvec::SmallVec<[f64; 4]> =
                    objects.iter().map(|o| o.value_of(&key)).collect();
                let interpolant = self.basic.interpolant_from_values(&values);
                (key, interpolant)
            })
            .collect();
        CompoundParameterizedObject::new(entries)
    }
}
