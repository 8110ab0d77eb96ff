//! # Euclidean spline
//! An extensible parameterized object: control points go in, one spline
//! segment per completed window comes out, and the whole chain is evaluable
//! under a single, approximately arc-length parameterization. This is the
//! object the sampler consumes incrementally while a stroke grows.

use crate::control_point::SplineControlPoint;
use crate::interpolant::BasicParameterizedObjectFactory;
use crate::parameterized::{
    CompoundParameterizedObject, CompoundParameterizedObjectFactory, ParameterizedObject,
};
use crate::property::{Interpolatable, PropertyKey};

#[derive(Clone, Debug)]
struct Segment {
    object: CompoundParameterizedObject,
    /// Global parametric value at which this segment starts.
    start: f64,
    /// Parametric span: the Euclidean distance between the control points
    /// bounding the factory's intrinsic range. May be zero for stationary
    /// input.
    length: f64,
}

/// A mutable spline over 2D control points, extensible at its end.
///
/// Each consecutive window of control points contributes one segment; the
/// spline's parametric range is the concatenation of the segments' spans, so
/// parametric values approximate arc length in location space. Values outside
/// the range extrapolate through the boundary segments.
#[derive(Clone, Debug)]
pub struct EuclideanSpline<F> {
    factory: CompoundParameterizedObjectFactory<F>,
    control_points: Vec<SplineControlPoint>,
    segments: Vec<Segment>,
}

impl<F: BasicParameterizedObjectFactory> EuclideanSpline<F> {
    /// Panics unless `initial` holds at least one full factory window of
    /// control points with strictly increasing timestamps.
    pub fn new(
        factory: CompoundParameterizedObjectFactory<F>,
        initial: Vec<SplineControlPoint>,
    ) -> Self {
        assert!(
            initial.len() >= factory.required_interpolatable_objects(),
            "spline requires at least one full window of control points"
        );
        let mut spline = Self {
            factory,
            control_points: Vec::new(),
            segments: Vec::new(),
        };
        spline.push_control_points(initial);
        spline
    }

    /// Append control points at the end of the spline, creating one segment
    /// per newly completed window. Timestamps must strictly increase, also
    /// across calls.
    pub fn push_control_points(&mut self, points: Vec<SplineControlPoint>) {
        for point in points {
            if let Some(last) = self.control_points.last() {
                assert!(
                    point.timestamp() > last.timestamp(),
                    "control point timestamps must strictly increase"
                );
            }
            self.control_points.push(point);

            let window = self.factory.required_interpolatable_objects();
            if self.control_points.len() < window {
                continue;
            }
            let first = self.control_points.len() - window;
            let objects = &self.control_points[first..];
            let range = self.factory.intrinsic_range();
            let length = objects[range.start].distance_to(&objects[range.end - 1]);
            let start = self
                .segments
                .last()
                .map_or(0.0, |s| s.start + s.length);
            self.segments.push(Segment {
                object: self.factory.object_from_interpolatables(objects),
                start,
                length,
            });
        }
        log::trace!(
            "spline holds {} control points in {} segments",
            self.control_points.len(),
            self.segments.len()
        );
    }

    #[must_use]
    pub fn control_points(&self) -> &[SplineControlPoint] {
        &self.control_points
    }

    /// Number of segments; grows by one per control point once the first
    /// window is complete.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The segment whose span contains `value`, with boundary values mapping
    /// to the earlier segment and out-of-range values to the boundary
    /// segments.
    fn segment_for(&self, value: f64) -> &Segment {
        let index = self
            .segments
            .partition_point(|s| s.start + s.length < value)
            .min(self.segments.len() - 1);
        &self.segments[index]
    }
}

impl<F: BasicParameterizedObjectFactory> ParameterizedObject for EuclideanSpline<F> {
    fn parameterization_keys(&self) -> Vec<PropertyKey> {
        self.segments[0].object.parameterization_keys()
    }

    fn min_parametric_value(&self) -> f64 {
        0.0
    }

    fn max_parametric_value(&self) -> f64 {
        self.segments
            .last()
            .map_or(0.0, |s| s.start + s.length)
    }

    fn value_at(&self, t: f64, key: &PropertyKey) -> f64 {
        let segment = self.segment_for(t);
        let local = if segment.length > 0.0 {
            (t - segment.start) / segment.length
        } else {
            0.0
        };
        segment.object.value_at(local, key)
    }
}
