//! # Attribute stage
//! Packs per-vertex auxiliary attributes into byte buffers with a
//! self-describing GPU struct layout. Every quad contributes six vertex
//! records - two triangles - and every provider declares its layout once as a
//! static descriptor.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geometry::GeometryValues;
use crate::quad::Quad;

/// Scalar component type of a GPU struct field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpuComponentType {
    F32,
    U8,
}

impl GpuComponentType {
    #[must_use]
    pub const fn size_bytes(self) -> usize {
        match self {
            Self::F32 => 4,
            Self::U8 => 1,
        }
    }
}

/// One field of a GPU vertex struct.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpuStructField {
    pub name: &'static str,
    pub component_type: GpuComponentType,
    pub components: usize,
    pub offset_bytes: usize,
}

/// Layout of one vertex record, declared once per attribute provider type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpuStruct {
    pub name: &'static str,
    pub size_bytes: usize,
    pub fields: &'static [GpuStructField],
}

/// A packed attribute buffer together with its layout.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeData {
    gpu_struct: &'static GpuStruct,
    bytes: Vec<u8>,
}

impl AttributeData {
    /// Panics unless `bytes` holds a whole number of vertex records.
    pub fn new(gpu_struct: &'static GpuStruct, bytes: Vec<u8>) -> Self {
        assert_eq!(
            bytes.len() % gpu_struct.size_bytes,
            0,
            "attribute bytes must hold whole {} records",
            gpu_struct.name
        );
        Self { gpu_struct, bytes }
    }

    #[must_use]
    pub fn gpu_struct(&self) -> &'static GpuStruct {
        self.gpu_struct
    }
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
    /// Number of vertex records in the buffer.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.bytes.len() / self.gpu_struct.size_bytes
    }
}

/// Number of vertex records emitted per quad.
pub const VERTICES_PER_QUAD: usize = Quad::TRIANGLE_CORNERS.len();

/// Maps geometry values to one packed attribute buffer with six vertex records
/// per quad.
pub trait AttributeProvider {
    fn attribute_data_from_geometry(&mut self, values: &GeometryValues) -> AttributeData;
    /// Snapshot of the provider's configuration.
    fn current_model(&self) -> AttributeStageModel;
}

/// The attribute-stage configuration: one of the concrete provider models.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeStageModel {
    JitteredColor(JitteredColorAttributeProviderModel),
    QuadTransform(QuadTransformAttributeProviderModel),
}

impl AttributeStageModel {
    #[must_use]
    pub fn provider(&self) -> Box<dyn AttributeProvider> {
        match self {
            Self::JitteredColor(model) => Box::new(JitteredColorAttributeProvider {
                base_hsv: rgb_to_hsv(model.base_color),
                rng: StdRng::seed_from_u64(model.seed),
                model: model.clone(),
            }),
            Self::QuadTransform(model) => Box::new(QuadTransformAttributeProvider {
                model: model.clone(),
            }),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AttributeModelError {
    #[error("base color channels must lie in [0, 1]")]
    BaseColorOutOfRange,
    #[error("jitter values must lie in [0, 1]")]
    JitterOutOfRange,
}

/// Model of a provider assigning every quad a color jittered around a base
/// color.
///
/// Brightness, hue and saturation are each drawn from a uniform distribution
/// centered on the base color's value with the configured half-width, then
/// clamped to `[0, 1]`. The seed makes a stroke's colors reproducible; a
/// provider re-created from this model replays the randomness from the start
/// of the stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct JitteredColorAttributeProviderModel {
    base_color: [f32; 3],
    brightness_jitter: f32,
    hue_jitter: f32,
    saturation_jitter: f32,
    seed: u64,
}

impl JitteredColorAttributeProviderModel {
    pub fn new(
        base_color: [f32; 3],
        brightness_jitter: f32,
        hue_jitter: f32,
        saturation_jitter: f32,
        seed: u64,
    ) -> Result<Self, AttributeModelError> {
        if !base_color.iter().all(|c| (0.0..=1.0).contains(c)) {
            return Err(AttributeModelError::BaseColorOutOfRange);
        }
        if ![brightness_jitter, hue_jitter, saturation_jitter]
            .iter()
            .all(|j| (0.0..=1.0).contains(j))
        {
            return Err(AttributeModelError::JitterOutOfRange);
        }
        Ok(Self {
            base_color,
            brightness_jitter,
            hue_jitter,
            saturation_jitter,
            seed,
        })
    }

    #[must_use]
    pub fn base_color(&self) -> [f32; 3] {
        self.base_color
    }
}

/// Vertex record of the jittered-color provider.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct JitteredColorVertex {
    color: [u8; 3],
}

/// Layout of [`JitteredColorVertex`].
pub static JITTERED_COLOR_STRUCT: GpuStruct = GpuStruct {
    name: "jittered_color",
    size_bytes: 3,
    fields: &[GpuStructField {
        name: "color",
        component_type: GpuComponentType::U8,
        components: 3,
        offset_bytes: 0,
    }],
};

struct JitteredColorAttributeProvider {
    model: JitteredColorAttributeProviderModel,
    base_hsv: [f32; 3],
    rng: StdRng,
}

impl JitteredColorAttributeProvider {
    fn jitter(&mut self, base: f32, width: f32) -> f32 {
        let value = if width > 0.0 {
            self.rng.gen_range(base - width..=base + width)
        } else {
            base
        };
        value.clamp(0.0, 1.0)
    }
}

impl AttributeProvider for JitteredColorAttributeProvider {
    fn attribute_data_from_geometry(&mut self, values: &GeometryValues) -> AttributeData {
        let [h, s, v] = self.base_hsv;
        let (hue_jitter, saturation_jitter, brightness_jitter) = (
            self.model.hue_jitter,
            self.model.saturation_jitter,
            self.model.brightness_jitter,
        );
        let mut vertices = Vec::with_capacity(values.quads().len() * VERTICES_PER_QUAD);
        for _ in values.quads() {
            let jittered = [
                self.jitter(h, hue_jitter),
                self.jitter(s, saturation_jitter),
                self.jitter(v, brightness_jitter),
            ];
            let rgb = hsv_to_rgb(jittered);
            let vertex = JitteredColorVertex {
                color: rgb.map(|c| (c * 255.0).round() as u8),
            };
            vertices.extend(std::iter::repeat(vertex).take(VERTICES_PER_QUAD));
        }
        AttributeData::new(
            &JITTERED_COLOR_STRUCT,
            bytemuck::cast_slice(&vertices).to_vec(),
        )
    }

    fn current_model(&self) -> AttributeStageModel {
        AttributeStageModel::JitteredColor(self.model.clone())
    }
}

/// Model of a provider packing every quad's affine transform - or its inverse,
/// for shaders that map render positions back into brush-tip space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuadTransformAttributeProviderModel {
    pub inverse: bool,
}

/// Vertex record of the quad-transform provider: a mat3 as three columns.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct QuadTransformVertex {
    column0: [f32; 3],
    column1: [f32; 3],
    column2: [f32; 3],
}

/// Layout of [`QuadTransformVertex`].
pub static QUAD_TRANSFORM_STRUCT: GpuStruct = GpuStruct {
    name: "quad_transform",
    size_bytes: 36,
    fields: &[
        GpuStructField {
            name: "transform_column0",
            component_type: GpuComponentType::F32,
            components: 3,
            offset_bytes: 0,
        },
        GpuStructField {
            name: "transform_column1",
            component_type: GpuComponentType::F32,
            components: 3,
            offset_bytes: 12,
        },
        GpuStructField {
            name: "transform_column2",
            component_type: GpuComponentType::F32,
            components: 3,
            offset_bytes: 24,
        },
    ],
};

struct QuadTransformAttributeProvider {
    model: QuadTransformAttributeProviderModel,
}

impl AttributeProvider for QuadTransformAttributeProvider {
    fn attribute_data_from_geometry(&mut self, values: &GeometryValues) -> AttributeData {
        let mut vertices = Vec::with_capacity(values.quads().len() * VERTICES_PER_QUAD);
        for quad in values.quads() {
            let matrix = if self.model.inverse {
                // Zero-size quads are singular; fall back to identity rather
                // than poisoning the whole buffer.
                quad.inverse_transform()
                    .unwrap_or_else(cgmath::SquareMatrix::identity)
            } else {
                quad.transform()
            };
            let column = |c: cgmath::Vector3<f64>| [c.x as f32, c.y as f32, c.z as f32];
            let vertex = QuadTransformVertex {
                column0: column(matrix.x),
                column1: column(matrix.y),
                column2: column(matrix.z),
            };
            vertices.extend(std::iter::repeat(vertex).take(VERTICES_PER_QUAD));
        }
        AttributeData::new(
            &QUAD_TRANSFORM_STRUCT,
            bytemuck::cast_slice(&vertices).to_vec(),
        )
    }

    fn current_model(&self) -> AttributeStageModel {
        AttributeStageModel::QuadTransform(self.model)
    }
}

/// RGB to HSV, all channels in `[0, 1]`.
fn rgb_to_hsv([r, g, b]: [f32; 3]) -> [f32; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let sector = if delta == 0.0 {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    let saturation = if max == 0.0 { 0.0 } else { delta / max };
    [sector / 6.0, saturation, max]
}

/// HSV to RGB, all channels in `[0, 1]`.
fn hsv_to_rgb([h, s, v]: [f32; 3]) -> [f32; 3] {
    let h = h * 6.0;
    let sector = h.floor();
    let fraction = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * fraction);
    let t = v * (1.0 - s * (1.0 - fraction));
    match (sector as i32).rem_euclid(6) {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}
