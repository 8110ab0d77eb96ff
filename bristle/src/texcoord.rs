//! # Texture-mapping stage
//! Assigns a texture-coordinate quad to every geometry quad. The UV quads are
//! ordinary [`Quad`]s over texture space.

use crate::quad::Quad;

/// Maps geometry quads to one texture-coordinate quad each.
pub trait TexCoordProvider {
    fn texture_map_quads(&mut self, quads: &[Quad]) -> Vec<Quad>;
    /// Snapshot of the provider's configuration, including any cursor state.
    fn current_model(&self) -> TextureMappingStageModel;
}

/// The texture-mapping-stage configuration: one of the concrete provider
/// models.
#[derive(Clone, Debug, PartialEq)]
pub enum TextureMappingStageModel {
    Canonical(CanonicalTexCoordProviderModel),
    FixedQuads(FixedQuadTexCoordProviderModel),
}

impl TextureMappingStageModel {
    #[must_use]
    pub fn provider(&self) -> Box<dyn TexCoordProvider> {
        match self {
            Self::Canonical(model) => Box::new(CanonicalTexCoordProvider {
                model: model.clone(),
            }),
            Self::FixedQuads(model) => Box::new(FixedQuadTexCoordProvider {
                cursor: model.first_index,
                model: model.clone(),
            }),
        }
    }
}

/// Every quad maps to the full texture: the canonical `[0, 1]^2` quad.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CanonicalTexCoordProviderModel;

struct CanonicalTexCoordProvider {
    model: CanonicalTexCoordProviderModel,
}

impl TexCoordProvider for CanonicalTexCoordProvider {
    fn texture_map_quads(&mut self, quads: &[Quad]) -> Vec<Quad> {
        quads.iter().map(|_| Quad::canonical()).collect()
    }

    fn current_model(&self) -> TextureMappingStageModel {
        TextureMappingStageModel::Canonical(self.model.clone())
    }
}

/// Cycles through a fixed list of texture-coordinate quads, e.g. the pages of
/// a brush-tip atlas. The cursor persists across calls so a stroke walks the
/// list continuously.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedQuadTexCoordProviderModel {
    quads: Vec<Quad>,
    /// Cursor position to start from; snapshots carry the advanced cursor.
    first_index: usize,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TexCoordModelError {
    #[error("at least one texture-coordinate quad is required")]
    NoQuads,
}

impl FixedQuadTexCoordProviderModel {
    pub fn new(quads: Vec<Quad>) -> Result<Self, TexCoordModelError> {
        if quads.is_empty() {
            return Err(TexCoordModelError::NoQuads);
        }
        Ok(Self {
            quads,
            first_index: 0,
        })
    }
}

struct FixedQuadTexCoordProvider {
    model: FixedQuadTexCoordProviderModel,
    cursor: usize,
}

impl TexCoordProvider for FixedQuadTexCoordProvider {
    fn texture_map_quads(&mut self, quads: &[Quad]) -> Vec<Quad> {
        quads
            .iter()
            .map(|_| {
                let quad = self.model.quads[self.cursor];
                self.cursor = (self.cursor + 1) % self.model.quads.len();
                quad
            })
            .collect()
    }

    fn current_model(&self) -> TextureMappingStageModel {
        TextureMappingStageModel::FixedQuads(FixedQuadTexCoordProviderModel {
            quads: self.model.quads.clone(),
            first_index: self.cursor,
        })
    }
}
