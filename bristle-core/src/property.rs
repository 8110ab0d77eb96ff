//! # Properties
//! Keys naming the per-axis values a parameterized object produces. The two
//! location axes are enumerated for cheap, allocation-free access; everything
//! else (pressure, tilt, wheels, ..) rides in the open `Custom` namespace.

use std::sync::Arc;

/// A key addressing one interpolated property of a control point, and one
/// entry of the mapping a parameterized object produces.
///
/// Ordering is `PositionX < PositionY < Custom(..)` with custom keys ordered
/// lexicographically, which fixes the iteration order of every keyed mapping
/// in the crate.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PropertyKey {
    /// x-coordinate of a control point's location.
    PositionX,
    /// y-coordinate of a control point's location.
    PositionY,
    /// A brush-specific attribute, e.g. pressure or stylus tilt.
    Custom(Arc<str>),
}

impl PropertyKey {
    /// Convenience for building a custom key from a literal.
    pub fn custom(name: &str) -> Self {
        Self::Custom(Arc::from(name))
    }
}

impl std::fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PositionX => f.write_str("position.x"),
            Self::PositionY => f.write_str("position.y"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// An object whose scalar properties can be interpolated between instances,
/// e.g. a spline control point.
pub trait Interpolatable {
    /// Keys of all interpolatable properties, ascending by key order.
    fn properties_to_interpolate(&self) -> Vec<PropertyKey>;
    /// Value of one interpolatable property. The key must be among
    /// [`Interpolatable::properties_to_interpolate`]; anything else is a
    /// caller bug and panics.
    fn value_of(&self, key: &PropertyKey) -> f64;
}
