//! # Control-point buffering
//! A speed-adaptive FIFO that withholds freshly arrived control points until
//! enough time has passed relative to their motion speed, so that re-sampling
//! of the spline tail happens at a smooth cadence instead of on every jittery
//! input event.

use std::collections::VecDeque;

use crate::control_point::SplineControlPoint;
use crate::interval::Interval;

/// Default maximum speed, in location units per second.
pub const DEFAULT_MAX_SPEED: f64 = 5000.0;
/// Default buffering-delay range, in seconds.
pub const DEFAULT_TIME_INTERVALS: (f64, f64) = (1.0 / 120.0, 1.0 / 20.0);

/// FIFO queue buffering spline control points based on timestamp and speed.
///
/// Each processed point's speed (displacement over time delta against the
/// previously processed point) is mapped to `[0, 1]` by dividing by
/// `max_speed` and clamping; that factor linearly interpolates the allowed
/// buffering delay across `time_intervals`. A point is released once the
/// latest processed timestamp has moved past its own timestamp by at least the
/// allowed delay, or unconditionally on flush. Points are always released in
/// insertion order.
///
/// Timestamps must be strictly increasing, also across calls; a violation is a
/// caller bug and panics.
#[derive(Clone, Debug)]
pub struct SpeedBasedControlPointBuffer {
    /// Buffered points, each with the speed it arrived at.
    buffered: VecDeque<(SplineControlPoint, f64)>,
    /// Most recently processed point, kept for speed computation even after
    /// its release.
    last_processed: Option<SplineControlPoint>,
    max_speed: f64,
    time_intervals: Interval<f64>,
}

impl Default for SpeedBasedControlPointBuffer {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_SPEED,
            Interval::closed(DEFAULT_TIME_INTERVALS.0, DEFAULT_TIME_INTERVALS.1),
        )
    }
}

impl SpeedBasedControlPointBuffer {
    /// Panics unless `max_speed` is positive and `time_intervals` is a
    /// non-empty interval of non-negative delays.
    pub fn new(max_speed: f64, time_intervals: Interval<f64>) -> Self {
        assert!(
            max_speed > 0.0 && max_speed.is_finite(),
            "max speed must be positive and finite"
        );
        assert!(
            !time_intervals.is_empty() && time_intervals.inf() >= 0.0,
            "time intervals must be a non-empty range of non-negative delays"
        );
        Self {
            buffered: VecDeque::new(),
            last_processed: None,
            max_speed,
            time_intervals,
        }
    }

    #[must_use]
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }
    #[must_use]
    pub fn time_intervals(&self) -> Interval<f64> {
        self.time_intervals
    }

    /// The currently withheld points, oldest first.
    pub fn buffered_control_points(&self) -> impl Iterator<Item = &SplineControlPoint> {
        self.buffered.iter().map(|(point, _)| point)
    }

    /// Process incoming points and return every point whose buffering delay
    /// has elapsed, oldest first. With `flush`, all buffered points and all of
    /// `points` are returned and the buffer is left empty.
    pub fn process(
        &mut self,
        points: Vec<SplineControlPoint>,
        flush: bool,
    ) -> Vec<SplineControlPoint> {
        for point in points {
            let speed = match &self.last_processed {
                None => 0.0,
                Some(last) => {
                    let dt = point.timestamp() - last.timestamp();
                    assert!(
                        dt > 0.0,
                        "control point timestamps must strictly increase"
                    );
                    last.distance_to(&point) / dt
                }
            };
            self.last_processed = Some(point.clone());
            self.buffered.push_back((point, speed));
        }

        if flush {
            return self.buffered.drain(..).map(|(point, _)| point).collect();
        }
        let Some(latest) = self.last_processed.as_ref().map(|p| p.timestamp()) else {
            return Vec::new();
        };

        let mut released = Vec::new();
        while let Some((point, speed)) = self.buffered.front() {
            let factor = (speed / self.max_speed).clamp(0.0, 1.0);
            // Stationary points leave quickly, fast ones linger; the factor
            // interpolates the allowed delay across the configured range.
            let allowed = self
                .time_intervals
                .value_at(factor)
                .expect("time intervals verified non-empty at construction");
            if latest - point.timestamp() >= allowed {
                released.push(self.buffered.pop_front().expect("front checked above").0);
            } else {
                break;
            }
        }
        released
    }
}

#[cfg(test)]
mod test {
    use super::SpeedBasedControlPointBuffer;
    use crate::control_point::SplineControlPoint;
    use crate::interval::Interval;

    fn point(timestamp: f64, x: f64) -> SplineControlPoint {
        SplineControlPoint::new(timestamp, [x, 0.0]).unwrap()
    }

    #[test]
    fn releases_preserve_input_order_exactly() {
        let mut buffer = SpeedBasedControlPointBuffer::default();
        let input: Vec<_> = (0..40)
            .map(|i| point(i as f64 * 0.013, (i * i) as f64 * 0.35))
            .collect();

        let mut released = Vec::new();
        for chunk in input.chunks(7) {
            released.extend(buffer.process(chunk.to_vec(), false));
        }
        released.extend(buffer.process(Vec::new(), true));
        assert_eq!(released, input);
        assert_eq!(buffer.buffered_control_points().count(), 0);
    }

    #[test]
    fn stationary_points_release_after_min_delay() {
        let mut buffer =
            SpeedBasedControlPointBuffer::new(100.0, Interval::closed(0.01, 0.05));
        // Zero displacement: speed 0, allowed delay 0.01.
        assert!(buffer.process(vec![point(0.0, 0.0)], false).is_empty());
        let released = buffer.process(vec![point(0.02, 0.0)], false);
        assert_eq!(released, [point(0.0, 0.0)]);
    }

    #[test]
    fn fast_points_linger_longer() {
        let mut buffer =
            SpeedBasedControlPointBuffer::new(100.0, Interval::closed(0.01, 0.05));
        buffer.process(vec![point(0.0, 0.0)], false);
        // Speed 1000 units/s, clamped factor 1: allowed delay 0.05. The slow
        // first point leaves right away.
        let released = buffer.process(vec![point(0.02, 20.0)], false);
        assert_eq!(released, [point(0.0, 0.0)]);
        // 0.02 elapsed is not enough for the fast point.
        assert!(buffer.process(vec![point(0.04, 20.0)], false).is_empty());
        // 0.07 elapsed is; the stationary follow-up leaves with it.
        let released = buffer.process(vec![point(0.09, 20.0)], false);
        assert_eq!(released, [point(0.02, 20.0), point(0.04, 20.0)]);
    }

    #[test]
    fn newest_point_is_always_withheld_without_flush() {
        let mut buffer = SpeedBasedControlPointBuffer::default();
        let released = buffer.process(vec![point(0.0, 0.0), point(10.0, 1.0)], false);
        assert_eq!(released, [point(0.0, 0.0)]);
        assert_eq!(buffer.buffered_control_points().count(), 1);
    }

    #[test]
    fn empty_input_without_flush_releases_nothing() {
        let mut buffer = SpeedBasedControlPointBuffer::default();
        buffer.process(vec![point(0.0, 0.0)], false);
        assert!(buffer.process(Vec::new(), false).is_empty());
    }

    #[test]
    #[should_panic]
    fn non_increasing_timestamps_are_fatal() {
        let mut buffer = SpeedBasedControlPointBuffer::default();
        buffer.process(vec![point(1.0, 0.0)], false);
        let _ = buffer.process(vec![point(0.5, 1.0)], false);
    }
}
