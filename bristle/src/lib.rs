//! # bristle
//! A brush-stroke render pipeline: sampled spline values become oriented
//! quads, texture coordinates and packed per-vertex attribute buffers, handed
//! to an external GPU drawer per frame. The parameterization and sampling
//! machinery lives in `bristle-core`.

pub mod attribute;
pub mod brush;
pub mod geometry;
pub mod pipeline;
pub mod quad;
pub mod render;
pub mod texcoord;

pub use attribute::{AttributeData, AttributeProvider, AttributeStageModel};
pub use brush::{BrushModel, BrushModelError, BrushRenderConfigurationProvider};
pub use geometry::{GeometryProvider, GeometryStageModel, GeometryValues};
pub use pipeline::{Pipeline, PipelineConfiguration};
pub use quad::Quad;
pub use render::{GpuDrawer, RenderStageConfiguration, TextureHandle, UniformValue};
pub use texcoord::{TexCoordProvider, TextureMappingStageModel};
