//! # Pipeline
//! The stage orchestrator: sampling, geometry, texture mapping, attributes and
//! render submission, executed consecutively and synchronously per call. One
//! pipeline instance serves one stroke; instances are independent.

use bristle_core::float_set::PeriodicFloatSet;
use bristle_core::interval::Interval;
use bristle_core::parameterized::ParameterizedObject;
use bristle_core::sampler::{FloatSetSampler, FloatSetSamplerModel};

use crate::attribute::{
    AttributeData, AttributeProvider, AttributeStageModel, GpuComponentType, GpuStruct,
    GpuStructField,
};
use crate::geometry::{GeometryProvider, GeometryStageModel};
use crate::quad::Quad;
use crate::render::{GpuDrawer, RenderStageConfiguration};
use crate::texcoord::{TexCoordProvider, TextureMappingStageModel};

/// The interleaved position/texcoord vertex record the pipeline packs itself,
/// always the first attribute buffer handed to the drawer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub texcoord: [f32; 2],
}

/// Layout of [`QuadVertex`].
pub static QUAD_VERTEX_STRUCT: GpuStruct = GpuStruct {
    name: "quad_vertex",
    size_bytes: 16,
    fields: &[
        GpuStructField {
            name: "position",
            component_type: GpuComponentType::F32,
            components: 2,
            offset_bytes: 0,
        },
        GpuStructField {
            name: "texcoord",
            component_type: GpuComponentType::F32,
            components: 2,
            offset_bytes: 8,
        },
    ],
};

/// Immutable configuration of all five pipeline stages, in execution order.
///
/// Also the snapshot format of a running pipeline's state: stateful stage
/// objects serialize back into their models via
/// [`Pipeline::current_configuration`].
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfiguration {
    pub sampling: FloatSetSamplerModel<PeriodicFloatSet>,
    pub geometry: GeometryStageModel,
    pub texture_mapping: TextureMappingStageModel,
    pub attributes: Vec<AttributeStageModel>,
    pub render: RenderStageConfiguration,
}

/// Iteratively renders quadrilateral geometry constructed from a parameterized
/// object.
///
/// The pipeline assumes nothing about the render target; the drawer passed to
/// [`Pipeline::process`] owns that. Stages may be stateful, so the pipeline is
/// stateful: drive it strictly sequentially per stroke.
///
/// The sampling stage must agree with the parameterized objects processed: the
/// geometry stage's coordinate keys must be parameterization keys of every
/// object passed in. Wiring mismatches are caller bugs and panic.
pub struct Pipeline {
    sampler: FloatSetSampler<PeriodicFloatSet>,
    geometry: Box<dyn GeometryProvider>,
    texture_mapping: Box<dyn TexCoordProvider>,
    attributes: Vec<Box<dyn AttributeProvider>>,
    render: RenderStageConfiguration,
}

impl Pipeline {
    pub fn new(configuration: PipelineConfiguration) -> Self {
        Self {
            sampler: configuration.sampling.sampler(),
            geometry: configuration.geometry.provider(),
            texture_mapping: configuration.texture_mapping.provider(),
            attributes: configuration
                .attributes
                .iter()
                .map(AttributeStageModel::provider)
                .collect(),
            render: configuration.render,
        }
    }

    /// Process `object` within `interval`: sample it, build quads, map texture
    /// coordinates, pack attributes and submit one draw call. Returns the
    /// rendered quads, empty when the interval yielded no geometry (in which
    /// case nothing is drawn).
    ///
    /// `end` marks the final call for this object's stroke, allowing stages to
    /// emit terminal geometry for a lone sample.
    pub fn process(
        &mut self,
        object: &dyn ParameterizedObject,
        interval: &Interval<f64>,
        end: bool,
        drawer: &mut dyn GpuDrawer,
    ) -> Vec<Quad> {
        let samples = self.sampler.next_samples(object, interval);
        let geometry = self.geometry.values_from_samples(&samples, end);
        if geometry.quads().is_empty() {
            return Vec::new();
        }

        let uv_quads = self.texture_mapping.texture_map_quads(geometry.quads());
        debug_assert_eq!(uv_quads.len(), geometry.quads().len());

        let mut vertices = Vec::with_capacity(geometry.quads().len() * Quad::TRIANGLE_CORNERS.len());
        for (quad, uv) in geometry.quads().iter().zip(&uv_quads) {
            for corner in Quad::TRIANGLE_CORNERS {
                let position = quad.corners()[corner];
                let texcoord = uv.corners()[corner];
                vertices.push(QuadVertex {
                    position: [position.x as f32, position.y as f32],
                    texcoord: [texcoord.x as f32, texcoord.y as f32],
                });
            }
        }

        let mut buffers = Vec::with_capacity(1 + self.attributes.len());
        buffers.push(AttributeData::new(
            &QUAD_VERTEX_STRUCT,
            bytemuck::cast_slice(&vertices).to_vec(),
        ));
        for provider in &mut self.attributes {
            let data = provider.attribute_data_from_geometry(&geometry);
            debug_assert_eq!(data.vertex_count(), vertices.len());
            buffers.push(data);
        }

        log::trace!(
            "pipeline drawing {} quads ({} vertices, {} attribute buffers)",
            geometry.quads().len(),
            vertices.len(),
            buffers.len(),
        );
        drawer.draw(&self.render, &buffers, vertices.len());
        geometry.into_quads()
    }

    /// Snapshot of the pipeline's state as a configuration.
    #[must_use]
    pub fn current_configuration(&self) -> PipelineConfiguration {
        PipelineConfiguration {
            sampling: self.sampler.current_model(),
            geometry: self.geometry.current_model(),
            texture_mapping: self.texture_mapping.current_model(),
            attributes: self.attributes.iter().map(|a| a.current_model()).collect(),
            render: self.render.clone(),
        }
    }

    /// Replace all stage states. The new configuration must be compatible
    /// with the parameterized objects subsequently processed.
    pub fn set_configuration(&mut self, configuration: PipelineConfiguration) {
        *self = Self::new(configuration);
    }
}

#[cfg(test)]
mod test {
    use super::{Pipeline, PipelineConfiguration, QUAD_VERTEX_STRUCT};
    use crate::attribute::{AttributeData, AttributeStageModel, QuadTransformAttributeProviderModel};
    use crate::geometry::{GeometryStageModel, SquareProviderModel};
    use crate::render::{GpuDrawer, RenderStageConfiguration};
    use crate::texcoord::{CanonicalTexCoordProviderModel, TextureMappingStageModel};
    use bristle_core::control_point::SplineControlPoint;
    use bristle_core::float_set::PeriodicFloatSet;
    use bristle_core::interpolant::CatmullRomInterpolantFactory;
    use bristle_core::interval::Interval;
    use bristle_core::parameterized::{CompoundParameterizedObjectFactory, ParameterizedObject};
    use bristle_core::sampler::FloatSetSamplerModel;

    #[derive(Default)]
    struct RecordingDrawer {
        draws: Vec<(usize, Vec<AttributeData>)>,
    }

    impl GpuDrawer for RecordingDrawer {
        fn draw(
            &mut self,
            _configuration: &RenderStageConfiguration,
            attributes: &[AttributeData],
            vertex_count: usize,
        ) {
            self.draws.push((vertex_count, attributes.to_vec()));
        }
    }

    fn configuration(spacing: f64) -> PipelineConfiguration {
        PipelineConfiguration {
            sampling: FloatSetSamplerModel::new(
                PeriodicFloatSet::new(0.0, 1, spacing, spacing),
                Interval::closed(0.0, f64::MAX),
            ),
            geometry: GeometryStageModel::Square(SquareProviderModel::new(1.0).unwrap()),
            texture_mapping: TextureMappingStageModel::Canonical(CanonicalTexCoordProviderModel),
            attributes: vec![AttributeStageModel::QuadTransform(
                QuadTransformAttributeProviderModel { inverse: false },
            )],
            render: RenderStageConfiguration::new("void main() {}", "void main() {}"),
        }
    }

    fn control_points(count: usize) -> Vec<SplineControlPoint> {
        (0..count)
            .map(|i| SplineControlPoint::new(i as f64 * 0.05, [i as f64, 0.0]).unwrap())
            .collect()
    }

    #[test]
    fn end_to_end_over_a_growing_spline() {
        let factory = CompoundParameterizedObjectFactory::new(CatmullRomInterpolantFactory);
        let mut spline =
            bristle_core::spline::EuclideanSpline::new(factory, control_points(4));
        let mut pipeline = Pipeline::new(configuration(0.01));
        let mut drawer = RecordingDrawer::default();

        let first = pipeline.process(
            &spline,
            &spline.parametric_range(),
            false,
            &mut drawer,
        );
        assert!(!first.is_empty());

        // The stroke grows by one control point; only new territory renders.
        spline.push_control_points(vec![
            SplineControlPoint::new(0.2, [4.0, 0.0]).unwrap()
        ]);
        let second = pipeline.process(
            &spline,
            &spline.parametric_range(),
            true,
            &mut drawer,
        );
        assert!(!second.is_empty());

        let xs: Vec<f64> = first
            .iter()
            .chain(&second)
            .map(|quad| quad.center().x)
            .collect();
        // Strictly increasing across both calls: nothing re-rendered.
        assert!(xs.windows(2).all(|w| w[1] > w[0]));
        // The sampled centers span the spline's interpolated coordinate range.
        assert!((xs.first().unwrap() - 1.0).abs() < 1e-6);
        assert!((xs.last().unwrap() - 3.0).abs() < 1e-6);

        assert_eq!(drawer.draws.len(), 2);
        let (vertex_count, buffers) = &drawer.draws[0];
        assert_eq!(*vertex_count, first.len() * 6);
        // Core vertex buffer plus the configured attribute buffer.
        assert_eq!(buffers.len(), 2);
        assert_eq!(buffers[0].gpu_struct(), &QUAD_VERTEX_STRUCT);
        assert_eq!(buffers[0].vertex_count(), *vertex_count);
        assert_eq!(buffers[1].vertex_count(), *vertex_count);
    }

    #[test]
    fn exhausted_interval_draws_nothing() {
        let factory = CompoundParameterizedObjectFactory::new(CatmullRomInterpolantFactory);
        let spline = bristle_core::spline::EuclideanSpline::new(factory, control_points(4));
        let mut pipeline = Pipeline::new(configuration(0.01));
        let mut drawer = RecordingDrawer::default();

        let range = spline.parametric_range();
        assert!(!pipeline.process(&spline, &range, false, &mut drawer).is_empty());
        // Same interval again: the sampler has consumed it.
        assert!(pipeline.process(&spline, &range, false, &mut drawer).is_empty());
        assert_eq!(drawer.draws.len(), 1);
    }

    #[test]
    fn configuration_snapshots_track_sampler_state() {
        let configuration = configuration(0.1);
        let mut pipeline = Pipeline::new(configuration.clone());
        assert_eq!(pipeline.current_configuration(), configuration);

        let factory = CompoundParameterizedObjectFactory::new(CatmullRomInterpolantFactory);
        let spline = bristle_core::spline::EuclideanSpline::new(factory, control_points(4));
        let mut drawer = RecordingDrawer::default();
        pipeline.process(&spline, &spline.parametric_range(), false, &mut drawer);

        let snapshot = pipeline.current_configuration();
        assert_ne!(snapshot, configuration);
        // A pipeline resumed from the snapshot does not re-render consumed
        // territory.
        let mut resumed = Pipeline::new(snapshot);
        assert!(resumed
            .process(&spline, &spline.parametric_range(), false, &mut drawer)
            .is_empty());

        pipeline.set_configuration(configuration.clone());
        assert_eq!(pipeline.current_configuration(), configuration);
    }
}
