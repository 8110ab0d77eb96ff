//! # Sample values
//! The output of a sampling pass: the parametric values that were visited and
//! the per-key values of the sampled object at them, struct-of-arrays style.

use std::collections::BTreeMap;

use crate::property::PropertyKey;

/// Mapping from property keys to one value per sampled parametric value.
pub type KeyToValues = BTreeMap<PropertyKey, Vec<f64>>;

/// Values resulting from sampling a parameterized object at a finite ordered
/// set of parametric values.
///
/// Invariants, asserted at construction: every per-key vector has the same
/// length as `parametric_values`, and the mapping is `None` iff no parametric
/// value was sampled.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SampleValues {
    parametric_values: Vec<f64>,
    mapping: Option<KeyToValues>,
}

impl SampleValues {
    /// No samples at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(parametric_values: Vec<f64>, mapping: Option<KeyToValues>) -> Self {
        match &mapping {
            None => assert!(
                parametric_values.is_empty(),
                "non-empty samples require a value mapping"
            ),
            Some(mapping) => {
                assert!(
                    !parametric_values.is_empty(),
                    "empty samples must not carry a value mapping"
                );
                assert!(
                    mapping.values().all(|v| v.len() == parametric_values.len()),
                    "every key must map to one value per parametric value"
                );
            }
        }
        Self {
            parametric_values,
            mapping,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parametric_values.is_empty()
    }
    /// Number of sampled parametric values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parametric_values.len()
    }
    #[must_use]
    pub fn parametric_values(&self) -> &[f64] {
        &self.parametric_values
    }
    #[must_use]
    pub fn mapping(&self) -> Option<&KeyToValues> {
        self.mapping.as_ref()
    }

    /// The sampled values under `key`, `None` if empty or the key is unknown.
    #[must_use]
    pub fn values_for(&self, key: &PropertyKey) -> Option<&[f64]> {
        self.mapping
            .as_ref()
            .and_then(|m| m.get(key))
            .map(Vec::as_slice)
    }
}
