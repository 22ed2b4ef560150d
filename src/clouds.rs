//! Procedural cloud volumes built from merged sphere blobs.
//!
//! Each cluster scatters a handful of spheres inside a stretched ellipsoid,
//! merges them into one mesh and sits somewhere on a ring around the origin.

use glam::{Mat4, Vec3};
use rand::Rng;
use std::f32::consts::TAU;

use crate::error::SceneResult;
use crate::geometry::Mesh;
use crate::params::CloudFieldParams;

/// Envelope height relative to the largest blob radius
const ENVELOPE_VERTICAL: f32 = 0.5;

/// Envelope depth relative to the largest blob radius
const ENVELOPE_DEPTH: f32 = 0.6;

/// One sphere inside a cluster, in cluster-local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    pub radius: f32,
    pub offset: Vec3,
}

/// A single merged cloud puff
#[derive(Debug, Clone)]
pub struct CloudCluster {
    pub blobs: Vec<Blob>,

    /// Horizontal stretch of the placement envelope
    pub stretch: f32,

    /// Placement angle on the ring (radians)
    pub angle: f32,

    /// Horizontal distance from the origin (meters)
    pub ring_radius: f32,

    /// World position of the cluster origin
    pub position: Vec3,

    /// Y scale applied on top of the local mesh
    pub flattening: f32,

    /// Merged blob geometry in cluster-local space
    pub mesh: Mesh,
}

impl CloudCluster {
    /// Local-to-world transform: flatten, then move onto the ring
    pub fn transform(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_scale(Vec3::new(1.0, self.flattening, 1.0))
    }

    pub fn world_mesh(&self) -> Mesh {
        self.mesh.transformed(self.transform())
    }
}

/// All cloud clusters of a scene. Immutable after generation.
#[derive(Debug, Clone, Default)]
pub struct CloudField {
    pub clusters: Vec<CloudCluster>,
}

/// Uniform point inside the unit ball
fn unit_ball<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    rng.gen_range(lo..=hi)
}

impl CloudField {
    /// Generate `cluster_count` clusters.
    ///
    /// Visual variety comes from the generator; pass a seeded RNG to get a
    /// reproducible field.
    pub fn generate<R: Rng + ?Sized>(params: &CloudFieldParams, rng: &mut R) -> SceneResult<Self> {
        params.validate()?;

        let clusters = (0..params.cluster_count)
            .map(|_| Self::generate_cluster(params, rng))
            .collect::<Vec<_>>();

        let field = Self { clusters };
        log::debug!(
            "Generated {} cloud clusters ({} blobs)",
            field.clusters.len(),
            field.blob_count()
        );
        Ok(field)
    }

    fn generate_cluster<R: Rng + ?Sized>(params: &CloudFieldParams, rng: &mut R) -> CloudCluster {
        let (min_blobs, max_blobs) = params.blob_count;
        let blob_count = rng.gen_range(min_blobs..=max_blobs);
        let stretch = sample(rng, params.horizontal_stretch);

        let reach = params.blob_radius_m.1;
        let envelope = Vec3::new(
            reach * stretch,
            reach * ENVELOPE_VERTICAL,
            reach * ENVELOPE_DEPTH,
        );

        let blobs: Vec<Blob> = (0..blob_count)
            .map(|_| Blob {
                radius: sample(rng, params.blob_radius_m),
                offset: unit_ball(rng) * envelope,
            })
            .collect();

        let meshes: Vec<Mesh> = blobs
            .iter()
            .map(|blob| {
                let mut sphere = Mesh::sphere(
                    blob.radius,
                    params.blob_width_segments,
                    params.blob_height_segments,
                );
                sphere.translate(blob.offset);
                sphere
            })
            .collect();
        let mesh = Mesh::merge(&meshes);

        // Place on the ring
        let angle = rng.gen_range(0.0..TAU);
        let ring_radius = sample(rng, params.ring_radius_m);
        let height = sample(rng, params.height_band_m);
        let position = Vec3::new(angle.cos() * ring_radius, height, angle.sin() * ring_radius);

        CloudCluster {
            blobs,
            stretch,
            angle,
            ring_radius,
            position,
            flattening: params.vertical_flattening,
            mesh,
        }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn blob_count(&self) -> usize {
        self.clusters.iter().map(|c| c.blobs.len()).sum()
    }

    /// Every cluster baked into world space as one mesh, for a single draw call
    pub fn world_mesh(&self) -> Mesh {
        let meshes: Vec<Mesh> = self.clusters.iter().map(CloudCluster::world_mesh).collect();
        Mesh::merge(&meshes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cluster_ranges_respected() {
        let params = CloudFieldParams {
            cluster_count: 40,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let field = CloudField::generate(&params, &mut rng).unwrap();

        assert_eq!(field.len(), 40);
        for cluster in &field.clusters {
            let n = cluster.blobs.len() as u32;
            assert!(n >= params.blob_count.0 && n <= params.blob_count.1);

            for blob in &cluster.blobs {
                assert!(blob.radius >= params.blob_radius_m.0);
                assert!(blob.radius <= params.blob_radius_m.1);
            }

            assert!(cluster.ring_radius >= params.ring_radius_m.0);
            assert!(cluster.ring_radius <= params.ring_radius_m.1);
            let horizontal = Vec3::new(cluster.position.x, 0.0, cluster.position.z).length();
            assert!((horizontal - cluster.ring_radius).abs() < 1e-2);

            assert!(cluster.position.y >= params.height_band_m.0);
            assert!(cluster.position.y <= params.height_band_m.1);

            assert!(cluster.stretch >= params.horizontal_stretch.0);
            assert!(cluster.stretch <= params.horizontal_stretch.1);
            assert_eq!(cluster.flattening, params.vertical_flattening);
        }
    }

    #[test]
    fn test_blob_offsets_inside_envelope() {
        let params = CloudFieldParams::default();
        let mut rng = StdRng::seed_from_u64(7);
        let field = CloudField::generate(&params, &mut rng).unwrap();

        let reach = params.blob_radius_m.1;
        for cluster in &field.clusters {
            let envelope = Vec3::new(
                reach * cluster.stretch,
                reach * ENVELOPE_VERTICAL,
                reach * ENVELOPE_DEPTH,
            );
            for blob in &cluster.blobs {
                let normalized = blob.offset / envelope;
                assert!(normalized.length() <= 1.0 + 1e-4);
            }
        }
    }

    #[test]
    fn test_single_blob_matches_primitive() {
        let params = CloudFieldParams {
            cluster_count: 1,
            blob_count: (1, 1),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let field = CloudField::generate(&params, &mut rng).unwrap();

        let primitive = Mesh::sphere(1.0, params.blob_width_segments, params.blob_height_segments);
        let cluster = &field.clusters[0];
        assert_eq!(cluster.mesh.vertex_count(), primitive.vertex_count());
        assert_eq!(cluster.mesh.triangle_count(), primitive.triangle_count());
        assert_eq!(field.world_mesh().vertex_count(), primitive.vertex_count());
    }

    #[test]
    fn test_merge_happens_per_cluster() {
        let params = CloudFieldParams {
            cluster_count: 3,
            blob_count: (4, 4),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        let field = CloudField::generate(&params, &mut rng).unwrap();

        let per_blob = Mesh::sphere(1.0, params.blob_width_segments, params.blob_height_segments);
        for cluster in &field.clusters {
            assert_eq!(cluster.mesh.vertex_count(), 4 * per_blob.vertex_count());
        }
        assert_eq!(field.world_mesh().vertex_count(), 12 * per_blob.vertex_count());
    }

    #[test]
    fn test_flattening_compresses_height() {
        let params = CloudFieldParams {
            cluster_count: 1,
            blob_count: (1, 1),
            blob_radius_m: (10.0, 10.0),
            vertical_flattening: 0.5,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let field = CloudField::generate(&params, &mut rng).unwrap();

        let (lo, hi) = field.world_mesh().bounds().unwrap();
        assert!(((hi.y - lo.y) - 10.0).abs() < 1e-2);
        assert!(((hi.x - lo.x) - 20.0).abs() < 1e-1);
    }

    #[test]
    fn test_seeded_generation_repeats() {
        let params = CloudFieldParams::default();
        let a = CloudField::generate(&params, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = CloudField::generate(&params, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a.world_mesh(), b.world_mesh());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = CloudFieldParams {
            blob_count: (0, 0),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(CloudField::generate(&params, &mut rng).is_err());
    }

    #[test]
    fn test_overflowing_height_band_rejected() {
        let params = CloudFieldParams {
            cluster_count: 1,
            height_band_m: (-f32::MAX, f32::MAX),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(CloudField::generate(&params, &mut rng).is_err());
    }
}
