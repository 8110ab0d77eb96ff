//! # Brush models
//! A brush model declares everything a stroke's look is made of - tip pattern,
//! scattering, color jitter, flow - and the configuration provider glues the
//! five pipeline stage models together from it.

use std::collections::BTreeMap;

use bristle_core::float_set::PeriodicFloatSet;
use bristle_core::interval::Interval;
use bristle_core::sampler::FloatSetSamplerModel;

use crate::attribute::{AttributeModelError, AttributeStageModel, JitteredColorAttributeProviderModel};
use crate::geometry::{GeometryModelError, GeometryStageModel, ScatteredProviderModel, SquareProviderModel};
use crate::pipeline::PipelineConfiguration;
use crate::render::{RenderStageConfiguration, TextureHandle, UniformValue};
use crate::texcoord::{CanonicalTexCoordProviderModel, TextureMappingStageModel};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BrushModelError {
    #[error("tip size and scale must be positive and finite")]
    NonPositiveTipSize,
    #[error("spacing must yield a positive finite step between tip centers")]
    NonPositiveSpacing,
    #[error("at least one sample per sequence is required")]
    ZeroSamplesPerSequence,
    #[error("sequence distance must yield a positive finite gap")]
    NonPositiveSequenceDistance,
    #[error("flow must lie in [0, 1]")]
    FlowOutOfRange,
    #[error(transparent)]
    Geometry(#[from] GeometryModelError),
    #[error(transparent)]
    Attribute(#[from] AttributeModelError),
}

/// Declarative description of a brush.
///
/// Spacing, sequence distance and the scatter distance range are expressed in
/// units of the scaled tip size, so a brush keeps its character across sizes.
#[derive(Clone, Debug, PartialEq)]
pub struct BrushModel {
    /// Edge length of the brush tip geometry, in stroke coordinate units.
    pub tip_size: f64,
    /// Global multiplier applied to the tip size.
    pub scale: f64,
    /// Distance between consecutive tip centers; `1` makes adjacent tips
    /// touch, `0` is invalid.
    pub spacing: f64,
    /// Number of tips in one sample sequence.
    pub samples_per_sequence: usize,
    /// Gap between the last tip of a sequence and the first of the next.
    pub sequence_distance: f64,
    /// How many scattered duplicates each tip spawns.
    pub count: Interval<usize>,
    /// Translation length range of scattered duplicates.
    pub distance_jitter: Interval<f64>,
    /// Rotation range of scattered duplicates, a subset of `[0, 2*pi)`.
    pub angle: Interval<f64>,
    /// Scale-factor range of scattered duplicates.
    pub scale_jitter: Interval<f64>,
    /// Base color of the stroke, RGB in `[0, 1]`.
    pub base_color: [f32; 3],
    pub brightness_jitter: f32,
    pub hue_jitter: f32,
    pub saturation_jitter: f32,
    /// Stroke opacity, `[0, 1]`.
    pub flow: f32,
    /// Fixed seed for reproducible strokes. `None` draws a seed when the
    /// configuration is first built.
    pub initial_seed: Option<u64>,
    /// Image properties the brush declares; texture mappings may only bind
    /// these keys.
    pub image_property_keys: Vec<String>,
}

impl Default for BrushModel {
    fn default() -> Self {
        Self {
            tip_size: 32.0,
            scale: 1.0,
            spacing: 1.0,
            samples_per_sequence: 1,
            sequence_distance: 1.0,
            count: Interval::degenerate(1),
            distance_jitter: Interval::degenerate(0.0),
            angle: Interval::degenerate(0.0),
            scale_jitter: Interval::degenerate(1.0),
            base_color: [0.0, 0.0, 0.0],
            brightness_jitter: 0.0,
            hue_jitter: 0.0,
            saturation_jitter: 0.0,
            flow: 1.0,
            initial_seed: None,
            image_property_keys: vec!["sourceImage".to_owned()],
        }
    }
}

impl BrushModel {
    /// Tip edge length after scaling.
    #[must_use]
    pub fn scaled_tip_size(&self) -> f64 {
        self.tip_size * self.scale
    }

    /// Whether the model asks for any scattering at all.
    fn scatters(&self) -> bool {
        self.count != Interval::degenerate(1)
            || self.distance_jitter != Interval::degenerate(0.0)
            || self.angle != Interval::degenerate(0.0)
            || self.scale_jitter != Interval::degenerate(1.0)
    }
}

fn scaled(interval: &Interval<f64>, factor: f64) -> Interval<f64> {
    Interval::new(
        interval.inf() * factor,
        interval.sup() * factor,
        interval.inf_inclusion(),
        interval.sup_inclusion(),
    )
}

/// Content hash of a model and texture mapping, the cache key replacing the
/// object-identity caching a reference-semantics implementation would use.
fn content_hash(model: &BrushModel, texture_mapping: &BTreeMap<String, TextureHandle>) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    let float = |hasher: &mut std::collections::hash_map::DefaultHasher, v: f64| {
        v.to_bits().hash(hasher);
    };
    let interval = |hasher: &mut std::collections::hash_map::DefaultHasher, i: &Interval<f64>| {
        i.inf().to_bits().hash(hasher);
        i.sup().to_bits().hash(hasher);
        i.inf_inclusion().hash(hasher);
        i.sup_inclusion().hash(hasher);
    };
    float(&mut hasher, model.tip_size);
    float(&mut hasher, model.scale);
    float(&mut hasher, model.spacing);
    model.samples_per_sequence.hash(&mut hasher);
    float(&mut hasher, model.sequence_distance);
    model.count.inf().hash(&mut hasher);
    model.count.sup().hash(&mut hasher);
    model.count.inf_inclusion().hash(&mut hasher);
    model.count.sup_inclusion().hash(&mut hasher);
    interval(&mut hasher, &model.distance_jitter);
    interval(&mut hasher, &model.angle);
    interval(&mut hasher, &model.scale_jitter);
    for channel in model.base_color {
        channel.to_bits().hash(&mut hasher);
    }
    model.brightness_jitter.to_bits().hash(&mut hasher);
    model.hue_jitter.to_bits().hash(&mut hasher);
    model.saturation_jitter.to_bits().hash(&mut hasher);
    model.flow.to_bits().hash(&mut hasher);
    model.initial_seed.hash(&mut hasher);
    model.image_property_keys.hash(&mut hasher);
    texture_mapping.hash(&mut hasher);
    hasher.finish()
}

const VERTEX_SOURCE: &str = r"
attribute vec2 position;
attribute vec2 texcoord;
attribute vec3 color;

uniform mat4 projection;

varying highp vec2 vTexcoord;
varying highp vec3 vColor;

void main() {
    vTexcoord = texcoord;
    vColor = color;
    gl_Position = projection * vec4(position, 0.0, 1.0);
}
";

const FRAGMENT_SOURCE: &str = r"
varying highp vec2 vTexcoord;
varying highp vec3 vColor;

uniform sampler2D sourceImage;
uniform highp float flow;

void main() {
    highp vec4 tip = texture2D(sourceImage, vTexcoord);
    gl_FragColor = vec4(vColor, 1.0) * tip * flow;
}
";

/// Builds pipeline configurations from brush models, caching by content.
///
/// Caching matters for brushes without a fixed seed: repeated calls with the
/// same model reuse the seed drawn for the first build, so a stroke restarted
/// from the same brush replays identically.
#[derive(Default)]
pub struct BrushRenderConfigurationProvider {
    cache: hashbrown::HashMap<u64, PipelineConfiguration>,
}

impl BrushRenderConfigurationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the five stage models for `model`, binding `texture_mapping`'s
    /// handles to their sampler uniforms.
    ///
    /// Every key of `texture_mapping` must be declared by the model's
    /// `image_property_keys`; an undeclared key is a caller bug and panics.
    pub fn configuration_for_model(
        &mut self,
        model: &BrushModel,
        texture_mapping: &BTreeMap<String, TextureHandle>,
    ) -> Result<PipelineConfiguration, BrushModelError> {
        for key in texture_mapping.keys() {
            assert!(
                model.image_property_keys.iter().any(|k| k == key),
                "texture mapping key {key:?} is not declared by the brush model"
            );
        }

        let cache_key = content_hash(model, texture_mapping);
        if let Some(configuration) = self.cache.get(&cache_key) {
            log::trace!("brush configuration cache hit");
            return Ok(configuration.clone());
        }

        let edge = model.scaled_tip_size();
        if !(edge > 0.0 && edge.is_finite()) {
            return Err(BrushModelError::NonPositiveTipSize);
        }
        let step = model.spacing * edge;
        if !(step > 0.0 && step.is_finite()) {
            return Err(BrushModelError::NonPositiveSpacing);
        }
        if model.samples_per_sequence == 0 {
            return Err(BrushModelError::ZeroSamplesPerSequence);
        }
        let gap = model.sequence_distance * edge;
        if !(gap > 0.0 && gap.is_finite()) {
            return Err(BrushModelError::NonPositiveSequenceDistance);
        }
        if !(0.0..=1.0).contains(&model.flow) {
            return Err(BrushModelError::FlowOutOfRange);
        }

        let sampling = FloatSetSamplerModel::new(
            PeriodicFloatSet::new(0.0, model.samples_per_sequence, step, gap),
            Interval::closed(0.0, f64::MAX),
        );

        let seed = model.initial_seed.unwrap_or_else(rand::random);
        let square = GeometryStageModel::Square(SquareProviderModel::new(edge)?);
        let geometry = if model.scatters() {
            GeometryStageModel::Scattered(ScatteredProviderModel::new(
                square,
                seed,
                model.count,
                scaled(&model.distance_jitter, edge),
                model.angle,
                model.scale_jitter,
            )?)
        } else {
            square
        };

        let attributes = vec![AttributeStageModel::JitteredColor(
            JitteredColorAttributeProviderModel::new(
                model.base_color,
                model.brightness_jitter,
                model.hue_jitter,
                model.saturation_jitter,
                // Decorrelated from the scatter stream.
                seed ^ 0x9E37_79B9_7F4A_7C15,
            )?,
        )];

        let uniforms = [("flow".to_owned(), UniformValue::Float(model.flow))]
            .into_iter()
            .collect();
        let render = RenderStageConfiguration::new(VERTEX_SOURCE, FRAGMENT_SOURCE)
            .with_textures_and_uniforms(texture_mapping.clone(), uniforms);

        let configuration = PipelineConfiguration {
            sampling,
            geometry,
            texture_mapping: TextureMappingStageModel::Canonical(CanonicalTexCoordProviderModel),
            attributes,
            render,
        };
        log::debug!(
            "built brush configuration: edge {edge}, step {step}, gap {gap}, scattered {}",
            model.scatters()
        );
        self.cache.insert(cache_key, configuration.clone());
        Ok(configuration)
    }
}
