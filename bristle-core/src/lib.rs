//! # bristle-core
//! Parameterization and sampling machinery for brush-stroke rendering:
//! intervals, float sets, spline control points, polynomial interpolants,
//! compound parameterized objects, the float-set sampler and the speed-based
//! control-point buffer. Everything here is synchronous CPU work over value
//! objects; the GPU-facing pipeline lives in the `bristle` crate.

pub mod buffer;
pub mod control_point;
pub mod float_set;
pub mod interpolant;
pub mod interval;
pub mod parameterized;
pub mod property;
pub mod sample;
pub mod sampler;
pub mod spline;

pub use buffer::SpeedBasedControlPointBuffer;
pub use control_point::{ControlPointError, SplineControlPoint};
pub use float_set::{FloatSet, PeriodicFloatSet};
pub use interval::{Inclusion, Interval};
pub use parameterized::{
    CompoundParameterizedObject, CompoundParameterizedObjectFactory, ParameterizedObject,
};
pub use property::{Interpolatable, PropertyKey};
pub use sample::SampleValues;
pub use sampler::{FloatSetSampler, FloatSetSamplerModel};
pub use spline::EuclideanSpline;
