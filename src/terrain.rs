//! Circular bump accumulation.
//!
//! Terrain is built by dropping a few thousand raised-cosine bumps at random
//! centres. The displacement shrinks slowly from one bump to the next, so the
//! early bumps lay down broad hills and the late ones only add detail.

use std::f32::consts::PI;

use rand::Rng;

use crate::heightfield::{GridSize, Heightfield};
use crate::math::Point3;

/// Divisor applied to the displacement after every bump.
pub const DISPLACEMENT_DECAY: f32 = 1.0005;

pub struct GeneratedTerrain {
    pub heights: Heightfield,
    pub max_height: f32,
}

#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    size: GridSize,
    initial_displacement: f32,
    radius: f32,
    iterations: usize,
}

impl TerrainGenerator {
    pub fn new(size: GridSize) -> Self {
        let extent = size.extent();
        Self {
            size,
            initial_displacement: extent / 80.0,
            radius: extent / 20.0,
            iterations: (2.5 * extent).round() as usize,
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_initial_displacement(mut self, displacement: f32) -> Self {
        self.initial_displacement = displacement;
        self
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn initial_displacement(&self) -> f32 {
        self.initial_displacement
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> GeneratedTerrain {
        let mut heights = Heightfield::zeroed(self.size);
        let mut max_height = 0.0_f32;
        let mut disp = self.initial_displacement;

        for _ in 0..self.iterations {
            // Both ranges include the size itself: a centre one past the last
            // row or column is a legal draw.
            let tx = rng.gen_range(0..=self.size.x_size());
            let tz = rng.gen_range(0..=self.size.z_size());
            self.apply_bump(&mut heights, &mut max_height, tx, tz, disp);
            disp /= DISPLACEMENT_DECAY;
        }

        max_height = max_height.max(heights.max_value());

        GeneratedTerrain {
            heights,
            max_height,
        }
    }

    /// Adds one bump of amplitude `disp` centred on `(tx, tz)`, raising
    /// `max_height` for every vertex it lifts above it.
    pub fn apply_bump(
        &self,
        heights: &mut Heightfield,
        max_height: &mut f32,
        tx: usize,
        tz: usize,
        disp: f32,
    ) {
        let center = Point3::new(tx as f32, 0.0, tz as f32);
        for (i, j) in self.size.coords() {
            let pd = center.distance_to(Point3::new(i as f32, 0.0, j as f32)) * 2.0 / self.radius;
            if pd.abs() <= 1.0 {
                let height = &mut heights[(i, j)];
                *height += disp / 2.0 + (pd * PI).cos() * disp / 2.0;
                if *height > *max_height {
                    *max_height = *height;
                }
            }
        }
    }
}
