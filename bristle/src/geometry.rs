//! # Geometry stage
//! Turns sampled parametric values into brush-tip quads. Providers are
//! stateful on purpose: consecutive calls over a growing stroke must produce
//! geometrically continuous strips, so the direction of the previous tip is
//! remembered across calls.

use cgmath::{Point2, Vector2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use bristle_core::interval::Interval;
use bristle_core::property::PropertyKey;
use bristle_core::sample::SampleValues;

use crate::quad::Quad;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryModelError {
    #[error("edge length must be positive and finite")]
    NonPositiveEdgeLength,
    #[error("both size dimensions must be positive and finite")]
    NonPositiveSize,
    #[error("coordinate keys must be distinct")]
    IndistinctCoordinateKeys,
    #[error("duplication count interval must contain a positive count")]
    InvalidCountInterval,
    #[error("distance interval must be a non-empty range of non-negative lengths")]
    InvalidDistanceInterval,
    #[error("angle interval must be a non-empty subset of [0, 2*pi)")]
    InvalidAngleInterval,
    #[error("scale interval must be a non-empty range of positive factors")]
    InvalidScaleInterval,
}

/// Quads generated from one batch of samples: one entry of `indices` per quad,
/// naming the sample the quad was spawned by.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryValues {
    quads: Vec<Quad>,
    indices: Vec<u32>,
    samples: SampleValues,
}

impl GeometryValues {
    /// Panics unless `quads` and `indices` have equal lengths and every index
    /// names a sample.
    pub fn new(quads: Vec<Quad>, indices: Vec<u32>, samples: SampleValues) -> Self {
        assert_eq!(
            quads.len(),
            indices.len(),
            "one index per quad is required"
        );
        assert!(
            indices.iter().all(|&i| (i as usize) < samples.len()),
            "indices must reference samples"
        );
        Self {
            quads,
            indices,
            samples,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            quads: Vec::new(),
            indices: Vec::new(),
            samples: SampleValues::empty(),
        }
    }

    #[must_use]
    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
    #[must_use]
    pub fn samples(&self) -> &SampleValues {
        &self.samples
    }
    #[must_use]
    pub fn into_quads(self) -> Vec<Quad> {
        self.quads
    }
}

/// Maps sampled values to quads. `end` marks the last call of a stroke so a
/// lone terminal sample can still produce visible geometry.
pub trait GeometryProvider {
    fn values_from_samples(&mut self, samples: &SampleValues, end: bool) -> GeometryValues;
    /// Snapshot of the provider's configuration.
    fn current_model(&self) -> GeometryStageModel;
}

/// The geometry-stage configuration: one of the concrete provider models.
#[derive(Clone, Debug, PartialEq)]
pub enum GeometryStageModel {
    Square(SquareProviderModel),
    DirectedRect(DirectedRectProviderModel),
    Scattered(ScatteredProviderModel),
}

impl GeometryStageModel {
    /// A fresh provider starting from this configuration.
    #[must_use]
    pub fn provider(&self) -> Box<dyn GeometryProvider> {
        match self {
            Self::Square(model) => Box::new(SquareProvider {
                model: model.clone(),
            }),
            Self::DirectedRect(model) => Box::new(DirectedRectProvider {
                model: model.clone(),
                previous_center: None,
            }),
            Self::Scattered(model) => Box::new(ScatteredProvider {
                inner: model.inner.provider(),
                rng: StdRng::seed_from_u64(model.seed),
                model: model.clone(),
            }),
        }
    }
}

fn sample_centers(
    samples: &SampleValues,
    x_key: &PropertyKey,
    y_key: &PropertyKey,
) -> Vec<Point2<f64>> {
    let xs = samples
        .values_for(x_key)
        .unwrap_or_else(|| panic!("samples lack coordinate key {x_key}"));
    let ys = samples
        .values_for(y_key)
        .unwrap_or_else(|| panic!("samples lack coordinate key {y_key}"));
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| Point2::new(x, y))
        .collect()
}

/// Model of a provider emitting one axis-aligned square per sample, centered
/// at the sample's coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct SquareProviderModel {
    edge_length: f64,
    x_key: PropertyKey,
    y_key: PropertyKey,
}

impl SquareProviderModel {
    pub fn new(edge_length: f64) -> Result<Self, GeometryModelError> {
        Self::with_coordinate_keys(edge_length, PropertyKey::PositionX, PropertyKey::PositionY)
    }

    pub fn with_coordinate_keys(
        edge_length: f64,
        x_key: PropertyKey,
        y_key: PropertyKey,
    ) -> Result<Self, GeometryModelError> {
        if !(edge_length > 0.0 && edge_length.is_finite()) {
            return Err(GeometryModelError::NonPositiveEdgeLength);
        }
        if x_key == y_key {
            return Err(GeometryModelError::IndistinctCoordinateKeys);
        }
        Ok(Self {
            edge_length,
            x_key,
            y_key,
        })
    }

    #[must_use]
    pub fn edge_length(&self) -> f64 {
        self.edge_length
    }
}

struct SquareProvider {
    model: SquareProviderModel,
}

impl GeometryProvider for SquareProvider {
    fn values_from_samples(&mut self, samples: &SampleValues, _end: bool) -> GeometryValues {
        if samples.is_empty() {
            return GeometryValues::empty();
        }
        let size = Vector2::new(self.model.edge_length, self.model.edge_length);
        let quads: Vec<Quad> = sample_centers(samples, &self.model.x_key, &self.model.y_key)
            .into_iter()
            .map(|center| Quad::axis_aligned(center, size))
            .collect();
        let indices = (0..quads.len() as u32).collect();
        GeometryValues::new(quads, indices, samples.clone())
    }

    fn current_model(&self) -> GeometryStageModel {
        GeometryStageModel::Square(self.model.clone())
    }
}

/// Model of a provider emitting rectangles rotated to face the travel
/// direction of the stroke.
///
/// Every quad after the first faces the direction from the preceding sample to
/// its own. The first quad of a stroke mirrors the second quad's rotation when
/// at least two samples exist; a lone sample yields a zero-size axis-aligned
/// quad, unless it terminates the stroke, in which case the quad is
/// axis-aligned at full size.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectedRectProviderModel {
    size: [f64; 2],
    x_key: PropertyKey,
    y_key: PropertyKey,
}

impl DirectedRectProviderModel {
    pub fn new(size: [f64; 2]) -> Result<Self, GeometryModelError> {
        Self::with_coordinate_keys(size, PropertyKey::PositionX, PropertyKey::PositionY)
    }

    pub fn with_coordinate_keys(
        size: [f64; 2],
        x_key: PropertyKey,
        y_key: PropertyKey,
    ) -> Result<Self, GeometryModelError> {
        if !size.iter().all(|&d| d > 0.0 && d.is_finite()) {
            return Err(GeometryModelError::NonPositiveSize);
        }
        if x_key == y_key {
            return Err(GeometryModelError::IndistinctCoordinateKeys);
        }
        Ok(Self { size, x_key, y_key })
    }

    #[must_use]
    pub fn size(&self) -> [f64; 2] {
        self.size
    }
}

struct DirectedRectProvider {
    model: DirectedRectProviderModel,
    /// Center of the last emitted quad, carried across calls for strip
    /// continuity.
    previous_center: Option<Point2<f64>>,
}

impl DirectedRectProvider {
    /// Angle of the direction from `from` to `to`; `None` for coincident
    /// points, which fall back to axis-aligned.
    fn direction(from: Point2<f64>, to: Point2<f64>) -> Option<f64> {
        let d = to - from;
        (d.x != 0.0 || d.y != 0.0).then(|| d.y.atan2(d.x))
    }
}

impl GeometryProvider for DirectedRectProvider {
    fn values_from_samples(&mut self, samples: &SampleValues, end: bool) -> GeometryValues {
        if samples.is_empty() {
            return GeometryValues::empty();
        }
        let centers = sample_centers(samples, &self.model.x_key, &self.model.y_key);
        let size = Vector2::new(self.model.size[0], self.model.size[1]);
        let stroke_start = self.previous_center.is_none();

        let quads = if stroke_start && centers.len() == 1 {
            // No direction is known yet. Draw nothing mid-stroke so a lone
            // starting sample leaves no artifact; draw at full size if this
            // lone sample is the whole stroke.
            let quad_size = if end { size } else { Vector2::new(0.0, 0.0) };
            vec![Quad::axis_aligned(centers[0], quad_size)]
        } else {
            let mut rotations: Vec<f64> = centers
                .iter()
                .enumerate()
                .map(|(i, &center)| {
                    let previous = if i > 0 {
                        Some(centers[i - 1])
                    } else {
                        self.previous_center
                    };
                    previous
                        .and_then(|p| Self::direction(p, center))
                        .unwrap_or(0.0)
                })
                .collect();
            if stroke_start {
                rotations[0] = rotations[1];
            }
            centers
                .iter()
                .zip(&rotations)
                .map(|(&center, &rotation)| Quad::rotated_rect(center, size, rotation))
                .collect()
        };

        self.previous_center = centers.last().copied();
        let indices = (0..quads.len() as u32).collect();
        GeometryValues::new(quads, indices, samples.clone())
    }

    fn current_model(&self) -> GeometryStageModel {
        GeometryStageModel::DirectedRect(self.model.clone())
    }
}

/// Model of a provider that duplicates the quads of an inner provider a random
/// number of times and randomly translates, rotates and scales every
/// duplicate. Duplicates keep the sample index of their source quad.
///
/// The seed makes a stroke's scatter reproducible; a provider re-created from
/// this model replays the randomness from the start of the stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct ScatteredProviderModel {
    inner: Box<GeometryStageModel>,
    seed: u64,
    count: Interval<usize>,
    distance: Interval<f64>,
    angle: Interval<f64>,
    scale: Interval<f64>,
}

impl ScatteredProviderModel {
    pub fn new(
        inner: GeometryStageModel,
        seed: u64,
        count: Interval<usize>,
        distance: Interval<f64>,
        angle: Interval<f64>,
        scale: Interval<f64>,
    ) -> Result<Self, GeometryModelError> {
        if count.is_empty() || count.min().is_none() || count.min() == Some(0) {
            return Err(GeometryModelError::InvalidCountInterval);
        }
        if distance.is_empty() || distance.min().map_or(true, |d| d < 0.0) {
            return Err(GeometryModelError::InvalidDistanceInterval);
        }
        let full_turn = std::f64::consts::TAU;
        if angle.is_empty()
            || angle.inf() < 0.0
            || angle.sup() > full_turn
            || (angle.sup() == full_turn && angle.sup_included())
        {
            return Err(GeometryModelError::InvalidAngleInterval);
        }
        if scale.is_empty() || scale.min().map_or(true, |s| s <= 0.0) {
            return Err(GeometryModelError::InvalidScaleInterval);
        }
        Ok(Self {
            inner: Box::new(inner),
            seed,
            count,
            distance,
            angle,
            scale,
        })
    }
}

struct ScatteredProvider {
    model: ScatteredProviderModel,
    inner: Box<dyn GeometryProvider>,
    rng: StdRng,
}

impl ScatteredProvider {
    fn draw(&mut self, interval: &Interval<f64>) -> f64 {
        interval
            .value_at(self.rng.gen::<f64>())
            .expect("interval verified non-empty at construction")
    }
}

impl GeometryProvider for ScatteredProvider {
    fn values_from_samples(&mut self, samples: &SampleValues, end: bool) -> GeometryValues {
        let inner = self.inner.values_from_samples(samples, end);
        if inner.quads().is_empty() {
            return inner;
        }
        let (min_count, max_count) = (
            self.model.count.min().expect("verified at construction"),
            self.model.count.max().expect("verified at construction"),
        );
        let (distance, angle, scale) = (self.model.distance, self.model.angle, self.model.scale);
        let mut quads = Vec::new();
        let mut indices = Vec::new();
        for (&quad, &index) in inner.quads().iter().zip(inner.indices()) {
            let count = self.rng.gen_range(min_count..=max_count);
            for _ in 0..count {
                let length = self.draw(&distance);
                let heading = self.rng.gen_range(0.0..std::f64::consts::TAU);
                let rotation = self.draw(&angle);
                let factor = self.draw(&scale);
                quads.push(
                    quad.translated(Vector2::new(
                        length * heading.cos(),
                        length * heading.sin(),
                    ))
                    .rotated_around_center(rotation)
                    .scaled_around_center(factor),
                );
                indices.push(index);
            }
        }
        GeometryValues::new(quads, indices, inner.samples().clone())
    }

    fn current_model(&self) -> GeometryStageModel {
        GeometryStageModel::Scattered(self.model.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bristle_core::sample::SampleValues;

    fn samples(coords: &[(f64, f64)]) -> SampleValues {
        if coords.is_empty() {
            return SampleValues::empty();
        }
        let mapping = [
            (
                PropertyKey::PositionX,
                coords.iter().map(|&(x, _)| x).collect(),
            ),
            (
                PropertyKey::PositionY,
                coords.iter().map(|&(_, y)| y).collect(),
            ),
        ]
        .into_iter()
        .collect();
        SampleValues::new(
            (0..coords.len()).map(|i| i as f64).collect(),
            Some(mapping),
        )
    }

    #[test]
    fn square_count_invariant() {
        let model = SquareProviderModel::new(2.0).unwrap();
        let mut provider = GeometryStageModel::Square(model).provider();
        for n in [0usize, 1, 3, 17] {
            let input = samples(&(0..n).map(|i| (i as f64, 0.0)).collect::<Vec<_>>());
            let values = provider.values_from_samples(&input, false);
            assert_eq!(values.quads().len(), n);
            assert_eq!(
                values.indices(),
                (0..n as u32).collect::<Vec<_>>().as_slice()
            );
        }
    }

    #[test]
    fn square_centers_and_size() {
        let model = SquareProviderModel::new(4.0).unwrap();
        let mut provider = GeometryStageModel::Square(model).provider();
        let values = provider.values_from_samples(&samples(&[(10.0, -2.0)]), false);
        let quad = values.quads()[0];
        assert!((quad.center().x - 10.0).abs() < 1e-9);
        assert!((quad.center().y - -2.0).abs() < 1e-9);
        assert!((quad.size().x - 4.0).abs() < 1e-9);
    }

    #[test]
    fn directed_rect_faces_travel_direction() {
        let model = DirectedRectProviderModel::new([2.0, 1.0]).unwrap();
        let mut provider = GeometryStageModel::DirectedRect(model).provider();
        let values =
            provider.values_from_samples(&samples(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]), false);
        let quads = values.quads();
        assert_eq!(quads.len(), 3);
        // Second quad travels +x: its first edge stays horizontal.
        let e = quads[1].corners()[1] - quads[1].corners()[0];
        assert!((e.y).abs() < 1e-9 && e.x > 0.0);
        // Third quad travels +y: its first edge turns vertical.
        let e = quads[2].corners()[1] - quads[2].corners()[0];
        assert!((e.x).abs() < 1e-9 && e.y > 0.0);
        // First quad mirrors the second.
        assert_eq!(quads[0].size(), quads[1].size());
        let e0 = quads[0].corners()[1] - quads[0].corners()[0];
        let e1 = quads[1].corners()[1] - quads[1].corners()[0];
        assert!((e0.y - e1.y).abs() < 1e-9);
    }

    #[test]
    fn directed_rect_lone_sample_special_cases() {
        let model = DirectedRectProviderModel::new([2.0, 1.0]).unwrap();

        let mut provider = GeometryStageModel::DirectedRect(model.clone()).provider();
        let values = provider.values_from_samples(&samples(&[(5.0, 5.0)]), false);
        assert_eq!(values.quads().len(), 1);
        assert_eq!(values.quads()[0].size(), cgmath::Vector2::new(0.0, 0.0));

        let mut provider = GeometryStageModel::DirectedRect(model).provider();
        let values = provider.values_from_samples(&samples(&[(5.0, 5.0)]), true);
        let quad = values.quads()[0];
        assert!((quad.size().x - 2.0).abs() < 1e-9);
        assert!((quad.size().y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn directed_rect_is_continuous_across_calls() {
        let model = DirectedRectProviderModel::new([2.0, 1.0]).unwrap();
        let mut provider = GeometryStageModel::DirectedRect(model).provider();
        provider.values_from_samples(&samples(&[(0.0, 0.0), (1.0, 0.0)]), false);
        // The follow-up call knows the previous center: one sample is enough
        // for a directed quad, no zero-size placeholder.
        let values = provider.values_from_samples(&samples(&[(2.0, 0.0)]), false);
        assert_eq!(values.quads().len(), 1);
        assert!((values.quads()[0].size().x - 2.0).abs() < 1e-9);
    }

    #[test]
    fn scattered_duplicates_and_stays_deterministic() {
        let inner = GeometryStageModel::Square(SquareProviderModel::new(1.0).unwrap());
        let model = ScatteredProviderModel::new(
            inner,
            7,
            Interval::closed(2, 4),
            Interval::closed(0.0, 3.0),
            Interval::closed(0.0, 1.0),
            Interval::closed(0.5, 2.0),
        )
        .unwrap();
        let input = samples(&[(0.0, 0.0), (10.0, 0.0)]);

        let mut provider = GeometryStageModel::Scattered(model.clone()).provider();
        let first = provider.values_from_samples(&input, false);
        assert!(first.quads().len() >= 4 && first.quads().len() <= 8);
        // Duplicates reference their source sample.
        assert!(first.indices().iter().all(|&i| i < 2));
        assert!(first.indices().windows(2).all(|w| w[0] <= w[1]));

        let mut replay = GeometryStageModel::Scattered(model).provider();
        assert_eq!(replay.values_from_samples(&input, false), first);
    }

    #[test]
    fn scattered_model_validation() {
        let inner = || GeometryStageModel::Square(SquareProviderModel::new(1.0).unwrap());
        assert_eq!(
            ScatteredProviderModel::new(
                inner(),
                0,
                Interval::closed(0, 0),
                Interval::closed(0.0, 1.0),
                Interval::closed(0.0, 1.0),
                Interval::closed(1.0, 1.0),
            ),
            Err(GeometryModelError::InvalidCountInterval)
        );
        assert_eq!(
            ScatteredProviderModel::new(
                inner(),
                0,
                Interval::closed(1, 1),
                Interval::closed(0.0, 1.0),
                Interval::closed(-1.0, 1.0),
                Interval::closed(1.0, 1.0),
            ),
            Err(GeometryModelError::InvalidAngleInterval)
        );
    }

    #[test]
    #[should_panic]
    fn missing_coordinate_key_is_fatal() {
        let model = SquareProviderModel::new(1.0).unwrap();
        let mut provider = GeometryStageModel::Square(model).provider();
        let input = SampleValues::new(
            vec![0.0],
            Some(
                [(PropertyKey::custom("pressure"), vec![1.0])]
                    .into_iter()
                    .collect(),
            ),
        );
        let _ = provider.values_from_samples(&input, false);
    }
}
