//! Indexed triangle meshes and primitive builders.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use std::f32::consts::PI;

/// Vertex data shared by every mesh in the scene (position + normal + UV)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Indexed triangle list (counter-clockwise winding)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// UV sphere centered on the origin.
    ///
    /// `(width_segments + 1) * (height_segments + 1)` vertices; the pole rows
    /// collapse to triangle fans so the first and last bands emit one
    /// triangle per segment instead of two.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);

        let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        let mut grid = Vec::with_capacity(height_segments as usize + 1);
        let mut index = 0u32;

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;

            // Pole vertices sit half a segment over so their UVs centre on the fan
            let u_offset = if iy == 0 {
                0.5 / width_segments as f32
            } else if iy == height_segments {
                -0.5 / width_segments as f32
            } else {
                0.0
            };

            let mut row = Vec::with_capacity(width_segments as usize + 1);
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let phi = u * 2.0 * PI;
                let theta = v * PI;

                let position = Vec3::new(
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                );
                let normal = position.normalize_or_zero();

                vertices.push(MeshVertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    uv: [u + u_offset, 1.0 - v],
                });
                row.push(index);
                index += 1;
            }
            grid.push(row);
        }

        let mut indices = Vec::new();
        for iy in 0..height_segments as usize {
            for ix in 0..width_segments as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];

                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments as usize - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self { vertices, indices }
    }

    /// Flat plane in XY facing +Z, centered on the origin.
    ///
    /// Rows run from +Y (first) to -Y (last).
    pub fn plane(width: f32, height: f32, segments_x: u32, segments_y: u32) -> Self {
        let grid_x1 = segments_x + 1;
        let grid_y1 = segments_y + 1;
        let segment_w = width / segments_x as f32;
        let segment_h = height / segments_y as f32;
        let half_w = width / 2.0;
        let half_h = height / 2.0;

        let mut vertices = Vec::with_capacity((grid_x1 * grid_y1) as usize);
        for iy in 0..grid_y1 {
            let y = iy as f32 * segment_h - half_h;
            for ix in 0..grid_x1 {
                let x = ix as f32 * segment_w - half_w;
                vertices.push(MeshVertex {
                    position: [x, -y, 0.0],
                    normal: [0.0, 0.0, 1.0],
                    uv: [
                        ix as f32 / segments_x as f32,
                        1.0 - iy as f32 / segments_y as f32,
                    ],
                });
            }
        }

        // Generate triangle indices (counter-clockwise winding)
        let mut indices = Vec::with_capacity((segments_x * segments_y * 6) as usize);
        for iy in 0..segments_y {
            for ix in 0..segments_x {
                let a = ix + grid_x1 * iy;
                let b = ix + grid_x1 * (iy + 1);
                let c = (ix + 1) + grid_x1 * (iy + 1);
                let d = (ix + 1) + grid_x1 * iy;

                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self { vertices, indices }
    }

    /// Union of several meshes into one vertex/index buffer.
    ///
    /// No CSG: overlapping volumes stay overlapping.
    pub fn merge<'a, I>(meshes: I) -> Self
    where
        I: IntoIterator<Item = &'a Mesh>,
    {
        let mut merged = Mesh::default();
        for mesh in meshes {
            let base = merged.vertices.len() as u32;
            merged.vertices.extend_from_slice(&mesh.vertices);
            merged.indices.extend(mesh.indices.iter().map(|i| i + base));
        }
        merged
    }

    /// Translate every vertex
    pub fn translate(&mut self, offset: Vec3) {
        for vertex in &mut self.vertices {
            vertex.position = (Vec3::from_array(vertex.position) + offset).to_array();
        }
    }

    /// Copy of the mesh with positions and normals moved by `transform`
    pub fn transformed(&self, transform: Mat4) -> Self {
        let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
        let vertices = self
            .vertices
            .iter()
            .map(|v| MeshVertex {
                position: transform
                    .transform_point3(Vec3::from_array(v.position))
                    .to_array(),
                normal: (normal_matrix * Vec3::from_array(v.normal))
                    .normalize_or_zero()
                    .to_array(),
                uv: v.uv,
            })
            .collect();

        Self {
            vertices,
            indices: self.indices.clone(),
        }
    }

    /// Recompute normals by accumulating face normals at shared vertices.
    ///
    /// Face normals are left unnormalized so larger triangles weigh more.
    pub fn compute_vertex_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let a = Vec3::from_array(self.vertices[ia].position);
            let b = Vec3::from_array(self.vertices[ib].position);
            let c = Vec3::from_array(self.vertices[ic].position);

            let face = (c - b).cross(a - b);
            accum[ia] += face;
            accum[ib] += face;
            accum[ic] += face;
        }

        for (vertex, n) in self.vertices.iter_mut().zip(accum) {
            vertex.normal = n.normalize_or_zero().to_array();
        }
    }

    /// Axis-aligned bounds as (min, max); `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(|v| Vec3::from_array(v.position));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_counts() {
        let sphere = Mesh::sphere(1.0, 32, 15);
        assert_eq!(sphere.vertex_count(), 33 * 16);
        // Two triangles per quad, minus one per segment at each pole
        assert_eq!(sphere.triangle_count(), 32 * (2 * 15 - 2));
    }

    #[test]
    fn test_sphere_radius_and_normals() {
        let sphere = Mesh::sphere(5.0, 12, 8);
        for v in &sphere.vertices {
            let p = Vec3::from_array(v.position);
            assert!((p.length() - 5.0).abs() < 1e-4);
            let n = Vec3::from_array(v.normal);
            assert!((n - p / 5.0).length() < 1e-4);
        }
    }

    #[test]
    fn test_sphere_winding_faces_outward() {
        let sphere = Mesh::sphere(1.0, 16, 8);
        for tri in sphere.indices.chunks_exact(3) {
            let a = Vec3::from_array(sphere.vertices[tri[0] as usize].position);
            let b = Vec3::from_array(sphere.vertices[tri[1] as usize].position);
            let c = Vec3::from_array(sphere.vertices[tri[2] as usize].position);
            let face = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_plane_layout() {
        let plane = Mesh::plane(10.0, 4.0, 5, 2);
        assert_eq!(plane.vertex_count(), 6 * 3);
        assert_eq!(plane.indices.len(), 5 * 2 * 6);

        // First row at +Y, left edge at -X
        assert_eq!(plane.vertices[0].position, [-5.0, 2.0, 0.0]);
        assert_eq!(plane.vertices[17].position, [5.0, -2.0, 0.0]);
    }

    #[test]
    fn test_flat_plane_normals_face_up() {
        let mut plane = Mesh::plane(2.0, 2.0, 3, 3);
        plane.compute_vertex_normals();
        for v in &plane.vertices {
            assert!((Vec3::from_array(v.normal) - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn test_merge_rebases_indices() {
        let a = Mesh::sphere(1.0, 4, 3);
        let mut b = Mesh::sphere(2.0, 4, 3);
        b.translate(Vec3::X * 3.0);

        let merged = Mesh::merge([&a, &b]);
        assert_eq!(merged.vertex_count(), a.vertex_count() + b.vertex_count());
        assert_eq!(merged.indices.len(), a.indices.len() + b.indices.len());

        let offset = a.vertex_count() as u32;
        assert_eq!(merged.indices[a.indices.len()], b.indices[0] + offset);
        assert!(merged
            .indices
            .iter()
            .all(|&i| (i as usize) < merged.vertex_count()));
    }

    #[test]
    fn test_transformed_scales_normals_correctly() {
        let sphere = Mesh::sphere(1.0, 8, 6);
        let squashed = sphere.transformed(Mat4::from_scale(Vec3::new(1.0, 0.5, 1.0)));
        let (lo, hi) = squashed.bounds().unwrap();
        assert!((hi.y - 0.5).abs() < 1e-5);
        assert!((lo.y + 0.5).abs() < 1e-5);

        for v in &squashed.vertices {
            assert!((Vec3::from_array(v.normal).length() - 1.0).abs() < 1e-4);
        }
    }
}
