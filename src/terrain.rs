//! Terrain heightfield displaced by simplex noise.

use glam::{Mat4, Vec3};
use std::f32::consts::FRAC_PI_2;

use crate::error::SceneResult;
use crate::geometry::Mesh;
use crate::noise::Noise2;
use crate::params::TerrainParams;

/// Regular grid of displaced vertices in the plane's local XY space.
///
/// Elevation (local Z) is a pure function of the planar position and the
/// noise; normals are derived from the displaced surface and never edited.
#[derive(Debug, Clone)]
pub struct HeightfieldGrid {
    pub mesh: Mesh,
    segments_x: u32,
    segments_y: u32,
}

impl HeightfieldGrid {
    /// Generate the heightfield in one pass.
    ///
    /// Every vertex at planar (x, y) gets
    /// `z = noise(x / divisor, y / divisor) * height_scale`, then normals are
    /// rebuilt by averaging the faces around each vertex.
    pub fn generate<N: Noise2>(params: &TerrainParams, noise: &N) -> SceneResult<Self> {
        params.validate()?;

        let mut mesh = Mesh::plane(
            params.width_m,
            params.height_m,
            params.segments_x,
            params.segments_y,
        );

        let divisor = params.frequency_divisor_m;
        for vertex in &mut mesh.vertices {
            let [x, y, _] = vertex.position;
            vertex.position[2] = noise.sample(x / divisor, y / divisor) * params.height_scale_m;
        }
        mesh.compute_vertex_normals();

        let grid = Self {
            mesh,
            segments_x: params.segments_x,
            segments_y: params.segments_y,
        };
        log::debug!(
            "Generated {}x{} heightfield ({} vertices, centre at {:?} m)",
            params.segments_x,
            params.segments_y,
            grid.mesh.vertex_count(),
            grid.elevation(grid.columns() / 2, grid.rows() / 2)
        );
        Ok(grid)
    }

    /// Vertices per row
    pub fn columns(&self) -> usize {
        self.segments_x as usize + 1
    }

    /// Number of vertex rows
    pub fn rows(&self) -> usize {
        self.segments_y as usize + 1
    }

    /// Elevation of the vertex at (column, row)
    pub(crate) fn elevation(&self, column: usize, row: usize) -> Option<f32> {
        if column >= self.columns() || row >= self.rows() {
            return None;
        }
        Some(self.mesh.vertices[row * self.columns() + column].position[2])
    }

    /// All elevations in row-major order
    pub fn elevations(&self) -> impl Iterator<Item = f32> + '_ {
        self.mesh.vertices.iter().map(|v| v.position[2])
    }

    /// Lay the grid flat (local +Z becomes world +Y) at the given base height
    pub fn world_transform(base_elevation_m: f32) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, base_elevation_m, 0.0))
            * Mat4::from_rotation_x(-FRAC_PI_2)
    }

    /// World-space copy of the mesh for upload
    pub fn world_mesh(&self, base_elevation_m: f32) -> Mesh {
        self.mesh
            .transformed(Self::world_transform(base_elevation_m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::SimplexNoise;

    fn small_params() -> TerrainParams {
        TerrainParams {
            width_m: 200.0,
            height_m: 100.0,
            segments_x: 16,
            segments_y: 8,
            height_scale_m: 10.0,
            frequency_divisor_m: 50.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_heightfield_grid_creation() {
        let params = small_params();
        let grid = HeightfieldGrid::generate(&params, &SimplexNoise::new(1)).unwrap();

        // Check vertex count: (segments + 1) per axis
        assert_eq!(grid.mesh.vertex_count(), 17 * 9);
        assert_eq!(grid.columns(), 17);
        assert_eq!(grid.rows(), 9);

        // Check triangle count: segments_x * segments_y * 2 triangles * 3 indices
        assert_eq!(grid.mesh.indices.len(), 16 * 8 * 6);
    }

    #[test]
    fn test_elevation_follows_noise() {
        let params = small_params();
        let noise = SimplexNoise::new(11);
        let grid = HeightfieldGrid::generate(&params, &noise).unwrap();

        for v in &grid.mesh.vertices {
            let [x, y, z] = v.position;
            let expected = noise.sample(x / 50.0, y / 50.0) * 10.0;
            assert_eq!(z.to_bits(), expected.to_bits());
            assert!(z.abs() <= 10.0 + 1e-3);
        }
    }

    #[test]
    fn test_regeneration_is_identical() {
        let params = small_params();
        let a = HeightfieldGrid::generate(&params, &SimplexNoise::new(42)).unwrap();
        let b = HeightfieldGrid::generate(&params, &SimplexNoise::new(42)).unwrap();

        assert!(a
            .elevations()
            .zip(b.elevations())
            .all(|(za, zb)| za.to_bits() == zb.to_bits()));
        assert_eq!(a.mesh, b.mesh);
    }

    #[test]
    fn test_zero_scale_is_flat() {
        let params = TerrainParams {
            segments_x: 3,
            segments_y: 3,
            height_scale_m: 0.0,
            ..Default::default()
        };
        let grid = HeightfieldGrid::generate(&params, &SimplexNoise::new(42)).unwrap();

        assert_eq!(grid.mesh.vertex_count(), 16);
        assert!(grid.elevations().all(|z| z == 0.0));
        for v in &grid.mesh.vertices {
            assert!((Vec3::from_array(v.normal) - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn test_normals_are_unit_and_upward() {
        let grid = HeightfieldGrid::generate(&small_params(), &SimplexNoise::new(3)).unwrap();
        for v in &grid.mesh.vertices {
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4);
            assert!(n.z > 0.0);
        }
    }

    #[test]
    fn test_rejects_empty_resolution() {
        let params = TerrainParams {
            segments_x: 0,
            ..small_params()
        };
        assert!(HeightfieldGrid::generate(&params, &SimplexNoise::new(1)).is_err());

        let zero_divisor = TerrainParams {
            frequency_divisor_m: 0.0,
            ..small_params()
        };
        assert!(HeightfieldGrid::generate(&zero_divisor, &SimplexNoise::new(1)).is_err());
    }

    #[test]
    fn test_world_mesh_lies_flat() {
        let params = TerrainParams {
            height_scale_m: 0.0,
            ..small_params()
        };
        let grid = HeightfieldGrid::generate(&params, &SimplexNoise::new(1)).unwrap();
        let world = grid.world_mesh(-100.0);

        for v in &world.vertices {
            assert!((v.position[1] + 100.0).abs() < 1e-3);
            assert!((Vec3::from_array(v.normal) - Vec3::Y).length() < 1e-4);
        }
        // Plane's +Y row ends up at world -Z
        assert!((world.vertices[0].position[2] + 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_elevation_lookup_bounds() {
        let grid = HeightfieldGrid::generate(&small_params(), &SimplexNoise::new(1)).unwrap();
        assert!(grid.elevation(16, 8).is_some());
        assert!(grid.elevation(17, 0).is_none());
        assert!(grid.elevation(0, 9).is_none());
    }
}
