//! # Render stage
//! The configuration handed to the external GPU collaborator: shader sources,
//! named texture bindings and named uniform values. Nothing here touches the
//! GPU - textures are referenced by opaque handles the collaborator owns.

use std::collections::BTreeMap;

use crate::attribute::AttributeData;

/// Opaque identifier of a texture owned by the GPU collaborator.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TextureHandle(pub u64);

/// Value of a primitive shader uniform.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Int(i32),
    Mat3([[f32; 3]; 3]),
}

/// Configuration of the pipeline's render stage.
///
/// The keys of `auxiliary_textures` name sampler uniforms of the fragment
/// source; the keys of `uniforms` name primitive uniforms of either shader.
#[derive(Clone, PartialEq, Debug)]
pub struct RenderStageConfiguration {
    vertex_source: String,
    fragment_source: String,
    auxiliary_textures: BTreeMap<String, TextureHandle>,
    uniforms: BTreeMap<String, UniformValue>,
}

impl RenderStageConfiguration {
    pub fn new(vertex_source: impl Into<String>, fragment_source: impl Into<String>) -> Self {
        Self {
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            auxiliary_textures: BTreeMap::new(),
            uniforms: BTreeMap::new(),
        }
    }

    /// A copy of `self` with the given textures and uniforms instead.
    #[must_use = "returns a new configuration without modifying `self`"]
    pub fn with_textures_and_uniforms(
        &self,
        auxiliary_textures: BTreeMap<String, TextureHandle>,
        uniforms: BTreeMap<String, UniformValue>,
    ) -> Self {
        Self {
            vertex_source: self.vertex_source.clone(),
            fragment_source: self.fragment_source.clone(),
            auxiliary_textures,
            uniforms,
        }
    }

    #[must_use]
    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }
    #[must_use]
    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }
    #[must_use]
    pub fn auxiliary_textures(&self) -> &BTreeMap<String, TextureHandle> {
        &self.auxiliary_textures
    }
    #[must_use]
    pub fn uniforms(&self) -> &BTreeMap<String, UniformValue> {
        &self.uniforms
    }
}

/// The external GPU drawing collaborator.
///
/// Receives the render-stage configuration and the packed per-vertex attribute
/// buffers of one pipeline invocation and submits a draw call. Success or
/// failure of the submission itself is opaque to the pipeline.
pub trait GpuDrawer {
    fn draw(
        &mut self,
        configuration: &RenderStageConfiguration,
        attributes: &[AttributeData],
        vertex_count: usize,
    );
}
