//! # Spline control points
//! The immutable value objects a stroke is made of: one per incoming touch
//! sample, carrying a timestamp, a 2D location and an open map of
//! brush-specific attributes.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::property::{Interpolatable, PropertyKey};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ControlPointError {
    #[error("timestamp is not finite")]
    NonFiniteTimestamp,
    #[error("location is not finite")]
    NonFiniteLocation,
    #[error("attribute {0:?} is not finite")]
    NonFiniteAttribute(Arc<str>),
}

/// A control point of a 2D Euclidean spline.
///
/// Immutable once constructed. Its interpolatable properties are the two
/// location coordinates plus every attribute key.
#[derive(Clone, Debug, PartialEq)]
pub struct SplineControlPoint {
    timestamp: f64,
    location: [f64; 2],
    attributes: BTreeMap<Arc<str>, f64>,
}

impl SplineControlPoint {
    /// A control point without attributes.
    pub fn new(timestamp: f64, location: [f64; 2]) -> Result<Self, ControlPointError> {
        Self::with_attributes(timestamp, location, BTreeMap::new())
    }

    /// A control point carrying brush-specific attributes. All values must be
    /// finite - downstream interpolation assumes it.
    pub fn with_attributes(
        timestamp: f64,
        location: [f64; 2],
        attributes: BTreeMap<Arc<str>, f64>,
    ) -> Result<Self, ControlPointError> {
        if !timestamp.is_finite() {
            return Err(ControlPointError::NonFiniteTimestamp);
        }
        if !location.iter().all(|c| c.is_finite()) {
            return Err(ControlPointError::NonFiniteLocation);
        }
        if let Some((key, _)) = attributes.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ControlPointError::NonFiniteAttribute(key.clone()));
        }
        Ok(Self {
            timestamp,
            location,
            attributes,
        })
    }

    #[must_use]
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }
    #[must_use]
    pub fn location(&self) -> [f64; 2] {
        self.location
    }
    #[must_use]
    pub fn x(&self) -> f64 {
        self.location[0]
    }
    #[must_use]
    pub fn y(&self) -> f64 {
        self.location[1]
    }
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<Arc<str>, f64> {
        &self.attributes
    }

    /// Equality ignoring the timestamp, for deduplicating stationary input.
    #[must_use]
    pub fn eq_ignoring_timestamp(&self, other: &Self) -> bool {
        self.location == other.location && self.attributes == other.attributes
    }

    /// Euclidean distance between the locations of two control points.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.location[0] - other.location[0];
        let dy = self.location[1] - other.location[1];
        dx.hypot(dy)
    }
}

impl Interpolatable for SplineControlPoint {
    fn properties_to_interpolate(&self) -> Vec<PropertyKey> {
        let mut keys = vec![PropertyKey::PositionX, PropertyKey::PositionY];
        // BTreeMap iteration is already ascending, matching key order.
        keys.extend(
            self.attributes
                .keys()
                .map(|k| PropertyKey::Custom(k.clone())),
        );
        keys
    }

    fn value_of(&self, key: &PropertyKey) -> f64 {
        match key {
            PropertyKey::PositionX => self.location[0],
            PropertyKey::PositionY => self.location[1],
            PropertyKey::Custom(name) => *self
                .attributes
                .get(name)
                .unwrap_or_else(|| panic!("control point has no attribute {name:?}")),
        }
    }
}
