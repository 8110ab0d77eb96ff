//! # Float-set sampler
//! The stateful cursor of the sampling stage: walks a float set across the
//! parametric range of a growing parameterized object, never visiting the same
//! parametric value twice.

use crate::float_set::FloatSet;
use crate::interval::{Inclusion, Interval};
use crate::parameterized::ParameterizedObject;
use crate::sample::SampleValues;

/// Immutable state of a [`FloatSetSampler`], usable to create one or to
/// snapshot one mid-stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatSetSamplerModel<S> {
    float_set: S,
    interval: Interval<f64>,
}

impl<S: FloatSet + Clone> FloatSetSamplerModel<S> {
    /// The intersection of `float_set` and `interval` is the set of parametric
    /// values the sampler may ever emit.
    pub fn new(float_set: S, interval: Interval<f64>) -> Self {
        Self {
            float_set,
            interval,
        }
    }

    #[must_use]
    pub fn float_set(&self) -> &S {
        &self.float_set
    }
    #[must_use]
    pub fn interval(&self) -> Interval<f64> {
        self.interval
    }

    /// A sampler starting from this state.
    #[must_use]
    pub fn sampler(&self) -> FloatSetSampler<S> {
        FloatSetSampler {
            float_set: self.float_set.clone(),
            remaining: self.interval,
        }
    }
}

/// Samples a parameterized object at float-set values, consuming its remaining
/// interval monotonically from below.
///
/// Each call narrows the remaining interval to the complement of the consumed
/// subinterval; when that complement is disjoint, the component with the
/// greater values is kept. Calls whose interval upper bounds decrease over
/// time are unsupported - behavior is then unspecified (though memory-safe).
#[derive(Clone, Debug)]
pub struct FloatSetSampler<S> {
    float_set: S,
    remaining: Interval<f64>,
}

impl<S: FloatSet + Clone> FloatSetSampler<S> {
    /// Sample `object` at the float-set values inside
    /// `remaining ∩ object.parametric_range() ∩ constrained`, then remove the
    /// consumed subinterval from the remaining interval.
    pub fn next_samples(
        &mut self,
        object: &dyn ParameterizedObject,
        constrained: &Interval<f64>,
    ) -> SampleValues {
        let eligible = self.remaining.intersection(&object.parametric_range());
        let consumed = eligible.intersection(constrained);
        let values = self.float_set.values_in(&consumed);

        if !consumed.is_empty() {
            // Complement of the consumed interval within the remaining one,
            // keeping the higher-valued component. Intersecting afterwards
            // fixes the lower inclusion when the boundary value was never in
            // the remaining interval to begin with.
            let above = Interval::new(
                consumed.sup(),
                self.remaining.sup(),
                match consumed.sup_inclusion() {
                    Inclusion::Closed => Inclusion::Open,
                    Inclusion::Open => Inclusion::Closed,
                },
                self.remaining.sup_inclusion(),
            );
            self.remaining = above.intersection(&self.remaining);
            log::trace!(
                "sampler consumed {consumed}, remaining {}",
                self.remaining
            );
        }

        object.samples_at(&values)
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn current_model(&self) -> FloatSetSamplerModel<S> {
        FloatSetSamplerModel {
            float_set: self.float_set.clone(),
            interval: self.remaining,
        }
    }

    /// `true` once the remaining interval is exhausted; all further sampling
    /// yields empty results.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::FloatSetSamplerModel;
    use crate::control_point::SplineControlPoint;
    use crate::float_set::PeriodicFloatSet;
    use crate::interpolant::LinearInterpolantFactory;
    use crate::interval::Interval;
    use crate::parameterized::{CompoundParameterizedObjectFactory, ParameterizedObject};
    use crate::property::PropertyKey;

    /// A linear segment from (0, 0) to (1, 1) with intrinsic range [0, 1].
    fn segment() -> impl ParameterizedObject {
        let factory = CompoundParameterizedObjectFactory::new(LinearInterpolantFactory);
        factory.object_from_interpolatables(&[
            SplineControlPoint::new(0.0, [0.0, 0.0]).unwrap(),
            SplineControlPoint::new(1.0, [1.0, 1.0]).unwrap(),
        ])
    }

    fn uniform(spacing: f64) -> PeriodicFloatSet {
        PeriodicFloatSet::new(0.0, 1, spacing, spacing)
    }

    #[test]
    fn growing_intervals_never_resample() {
        let model = FloatSetSamplerModel::new(uniform(0.1), Interval::closed(0.0, 1.0));
        let mut sampler = model.sampler();
        let object = segment();

        let mut all = Vec::new();
        for sup in [0.25, 0.55, 1.0] {
            let samples = sampler.next_samples(&object, &Interval::closed(0.0, sup));
            all.extend_from_slice(samples.parametric_values());
        }
        // Strictly ascending across calls: no duplicates, no overlap.
        assert!(all.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(all.len(), 11);
        assert!((all[0] - 0.0).abs() < 1e-12);
        assert!((all[10] - 1.0).abs() < 1e-12);
        assert!(sampler.is_exhausted());
        assert!(sampler
            .next_samples(&object, &Interval::closed(0.0, 1.0))
            .is_empty());
    }

    #[test]
    fn repeating_an_interval_yields_nothing() {
        let model = FloatSetSamplerModel::new(uniform(0.1), Interval::closed(0.0, 1.0));
        let mut sampler = model.sampler();
        let object = segment();

        let first = sampler.next_samples(&object, &Interval::closed(0.0, 0.5));
        assert_eq!(first.len(), 6);
        let again = sampler.next_samples(&object, &Interval::closed(0.0, 0.5));
        assert!(again.is_empty());
    }

    #[test]
    fn disjoint_complement_keeps_higher_component() {
        let model = FloatSetSamplerModel::new(uniform(0.1), Interval::closed(0.0, 1.0));
        let mut sampler = model.sampler();
        let object = segment();

        // Consume the middle; the lower leftovers are forfeited.
        let middle = sampler.next_samples(&object, &Interval::closed(0.25, 0.5));
        assert!(!middle.is_empty());
        let rest = sampler.next_samples(&object, &Interval::closed(0.0, 1.0));
        assert!(rest.parametric_values().iter().all(|&v| v > 0.5));
    }

    #[test]
    fn object_range_constrains_sampling() {
        let model = FloatSetSamplerModel::new(uniform(0.1), Interval::closed(0.0, 10.0));
        let mut sampler = model.sampler();
        let object = segment();

        // The object only spans [0, 1]; the caller interval reaches further.
        let samples = sampler.next_samples(&object, &Interval::closed(0.0, 10.0));
        assert_eq!(samples.len(), 11);
        // Values beyond the object's range stay available for later objects.
        let model = sampler.current_model();
        assert!(model.interval().contains(1.5));
    }

    #[test]
    fn windows_of_a_five_point_stroke_sample_strictly_increasing_x() {
        use crate::buffer::SpeedBasedControlPointBuffer;
        use crate::interpolant::CatmullRomInterpolantFactory;

        // Five control points with linearly increasing x, as a touch stream
        // would deliver them through the buffer.
        let mut buffer = SpeedBasedControlPointBuffer::default();
        let points: Vec<_> = (0..5)
            .map(|i| SplineControlPoint::new(i as f64 * 0.05, [i as f64, 0.0]).unwrap())
            .collect();
        let mut released = buffer.process(points, false);
        released.extend(buffer.process(Vec::new(), true));
        assert_eq!(released.len(), 5);

        // A 4-point factory yields one object per valid window: two in total.
        let factory = CompoundParameterizedObjectFactory::new(CatmullRomInterpolantFactory);
        for window in released.windows(factory.required_interpolatable_objects()) {
            let object = factory.object_from_interpolatables(window);
            let mut sampler = FloatSetSamplerModel::new(uniform(0.01), object.parametric_range())
                .sampler();
            let samples = sampler.next_samples(&object, &object.parametric_range());

            let xs = samples.values_for(&PropertyKey::PositionX).unwrap();
            assert!(xs.windows(2).all(|w| w[0] < w[1]));
            // The sampled x-values span the window's inner coordinate range.
            let inner = factory.intrinsic_range();
            assert!((xs.first().unwrap() - window[inner.start].x()).abs() < 1e-9);
            assert!((xs.last().unwrap() - window[inner.end - 1].x()).abs() < 1e-9);
        }
    }

    #[test]
    fn samples_carry_object_values() {
        let model = FloatSetSamplerModel::new(uniform(0.5), Interval::closed(0.0, 1.0));
        let mut sampler = model.sampler();
        let samples = sampler.next_samples(&segment(), &Interval::closed(0.0, 1.0));
        assert_eq!(samples.parametric_values(), [0.0, 0.5, 1.0]);
        assert_eq!(
            samples.values_for(&PropertyKey::PositionX),
            Some([0.0, 0.5, 1.0].as_slice())
        );
    }
}
