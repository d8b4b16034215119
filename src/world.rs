use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::heightfield::{GridSize, Heightfield, NormalField};
use crate::normals::compute_normals;
use crate::terrain::TerrainGenerator;

/// A fully built terrain: target heights plus the normals derived from them.
///
/// Snapshots are immutable once built. Regeneration constructs a new one and
/// replaces the old value wholesale.
#[derive(Clone, Debug)]
pub struct Terrain {
    heights: Heightfield,
    normals: NormalField,
    max_height: f32,
    seed: u64,
}

impl Terrain {
    pub fn generate(size: GridSize, seed: u64) -> Self {
        Self::generate_with(&TerrainGenerator::new(size), seed)
    }

    pub fn generate_with(generator: &TerrainGenerator, seed: u64) -> Self {
        let started = Instant::now();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let generated = generator.generate(&mut rng);
        let normals = compute_normals(&generated.heights);

        log::debug!(
            "terrain {}x{} built in {:?}",
            generator.size().x_size(),
            generator.size().z_size(),
            started.elapsed()
        );

        Self {
            heights: generated.heights,
            normals,
            max_height: generated.max_height,
            seed,
        }
    }

    pub fn size(&self) -> GridSize {
        self.heights.size()
    }

    pub fn heights(&self) -> &Heightfield {
        &self.heights
    }

    pub fn normals(&self) -> &NormalField {
        &self.normals
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
