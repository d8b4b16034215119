use glam::Vec3;

use crate::heightfield::{Heightfield, NormalField};
use crate::math::safe_normalize;

/// Per-vertex lighting normals for a heightfield.
///
/// Each vertex averages the four face normals formed by its cardinal grid edges.
/// Missing neighbours on the boundary contribute zero vectors, which drop out of
/// the average.
pub fn compute_normals(heights: &Heightfield) -> NormalField {
    NormalField::from_fn(heights.size(), |i, j| vertex_normal(heights, i, j))
}

fn vertex_normal(heights: &Heightfield, i: usize, j: usize) -> Vec3 {
    let h = heights[(i, j)];
    let edge = |x: Option<usize>, z: Option<usize>, dx: f32, dz: f32| {
        match (x, z) {
            (Some(x), Some(z)) => heights
                .try_get(x, z)
                .map_or(Vec3::ZERO, |&neighbour| Vec3::new(dx, neighbour - h, dz)),
            _ => Vec3::ZERO,
        }
    };

    let right = edge(i.checked_add(1), Some(j), 1.0, 0.0);
    let left = edge(i.checked_sub(1), Some(j), -1.0, 0.0);
    let up = edge(Some(i), j.checked_add(1), 0.0, 1.0);
    let down = edge(Some(i), j.checked_sub(1), 0.0, -1.0);

    let sum = upward(up.cross(right))
        + upward(right.cross(down))
        + upward(down.cross(left))
        + upward(left.cross(up));

    safe_normalize(sum / 4.0)
}

/// Flips a face normal into the upper half-space and normalizes it.
fn upward(n: Vec3) -> Vec3 {
    if n.y < 0.0 {
        safe_normalize(-n)
    } else {
        safe_normalize(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightfield::GridSize;
    use crate::terrain::TerrainGenerator;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const EPS: f32 = 1e-5;

    #[test]
    fn flat_ground_points_straight_up() {
        let size = GridSize::new(5, 4).unwrap();
        let normals = compute_normals(&Heightfield::filled(size, 3.0));
        for (x, z) in size.coords() {
            assert!((normals[(x, z)] - Vec3::Y).length() < EPS, "({x}, {z})");
        }
    }

    #[test]
    fn generated_normals_are_unit_and_upward() {
        let size = GridSize::new(30, 20).unwrap();
        let terrain = TerrainGenerator::new(size).generate(&mut ChaCha8Rng::seed_from_u64(3));
        let normals = compute_normals(&terrain.heights);
        for n in normals.iter() {
            assert!((n.length() - 1.0).abs() < 1e-4, "{n:?}");
            assert!(n.y > 0.0);
        }
    }

    #[test]
    fn slope_tilts_normal_downhill() {
        // Height rises with x, so the normal leans towards -x.
        let size = GridSize::new(4, 4).unwrap();
        let heights = Heightfield::from_fn(size, |x, _| x as f32);
        let normals = compute_normals(&heights);
        let expected = Vec3::new(-1.0, 1.0, 0.0).normalize();
        assert!((normals[(1, 1)] - expected).length() < EPS);
        // Corners only have two edges but still agree on a plane.
        assert!((normals[(0, 0)] - expected).length() < EPS);
        assert!((normals[(3, 3)] - expected).length() < EPS);
    }

    #[test]
    fn single_vertex_grid_has_zero_normal() {
        let size = GridSize::new(1, 1).unwrap();
        let normals = compute_normals(&Heightfield::zeroed(size));
        assert_eq!(normals[(0, 0)], Vec3::ZERO);
    }

    #[test]
    fn single_row_grid_stays_finite() {
        // Every cross product pairs an x edge with a missing z edge.
        let size = GridSize::new(4, 1).unwrap();
        let normals = compute_normals(&Heightfield::from_fn(size, |x, _| x as f32));
        assert!(normals.iter().all(|n| *n == Vec3::ZERO));
    }
}
