//! Seeded 2D simplex noise.
//!
//! The same permutation table drives the CPU sampler (terrain displacement)
//! and the cloud density shader, so both sides see identical noise for a seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Skew factor into the simplex grid: (√3 − 1) / 2
const F2: f32 = 0.366_025_42;

/// Unskew factor back to cartesian space: (3 − √3) / 6
const G2: f32 = 0.211_324_87;

/// Output scale that brings the summed corner contributions into [-1, 1]
const OUTPUT_SCALE: f32 = 70.0;

/// Edge midpoints of a cube. Only x/y take part in the 2D dot product.
const GRAD3: [[f32; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

/// Anything that can be sampled as a 2D scalar field
pub trait Noise2 {
    fn sample(&self, x: f32, y: f32) -> f32;
}

/// Permutation table: 256 entries duplicated to 512 for wrap-free indexing.
///
/// Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct NoiseState {
    perm: [u8; 512],
}

impl NoiseState {
    /// Build the table from an explicit seed
    pub fn from_seed(seed: u64) -> Self {
        Self::from_rng(&mut StdRng::seed_from_u64(seed))
    }

    /// Build the table by shuffling 0..=255 with the given generator
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut p: Vec<u8> = (0..=255).collect();
        p.shuffle(rng);

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = p[i & 255];
        }
        Self { perm }
    }

    /// Full 512-entry table
    pub fn permutation(&self) -> &[u8; 512] {
        &self.perm
    }

    /// Table widened to u32 for upload into a GPU storage buffer
    pub fn gpu_table(&self) -> Vec<u32> {
        self.perm.iter().map(|&v| u32::from(v)).collect()
    }

    #[inline]
    fn at(&self, index: usize) -> usize {
        self.perm[index] as usize
    }
}

impl std::fmt::Debug for NoiseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseState")
            .field("head", &&self.perm[..8])
            .finish_non_exhaustive()
    }
}

#[inline]
fn corner(gradient_index: usize, dx: f32, dy: f32) -> f32 {
    let t = 0.5 - dx * dx - dy * dy;
    if t < 0.0 {
        return 0.0;
    }
    let g = GRAD3[gradient_index];
    let t2 = t * t;
    t2 * t2 * (g[0] * dx + g[1] * dy)
}

/// Sample 2D simplex noise for a permutation table.
///
/// Pure function of its inputs; returns a value in [-1, 1].
pub fn sample(x: f32, y: f32, state: &NoiseState) -> f32 {
    // Skew the input into the simplex cell containing it
    let s = (x + y) * F2;
    let i = (x + s).floor();
    let j = (y + s).floor();

    let t = (i + j) * G2;
    let x0 = x - (i - t);
    let y0 = y - (j - t);

    // Lower or upper triangle of the rhombus
    let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

    let x1 = x0 - i1 as f32 + G2;
    let y1 = y0 - j1 as f32 + G2;
    let x2 = x0 - 1.0 + 2.0 * G2;
    let y2 = y0 - 1.0 + 2.0 * G2;

    let ii = (i as i32 & 255) as usize;
    let jj = (j as i32 & 255) as usize;

    let gi0 = state.at(ii + state.at(jj)) % 12;
    let gi1 = state.at(ii + i1 + state.at(jj + j1)) % 12;
    let gi2 = state.at(ii + 1 + state.at(jj + 1)) % 12;

    OUTPUT_SCALE * (corner(gi0, x0, y0) + corner(gi1, x1, y1) + corner(gi2, x2, y2))
}

/// Simplex noise generator owning its permutation table
#[derive(Debug, Clone)]
pub struct SimplexNoise {
    state: NoiseState,
}

impl SimplexNoise {
    /// Create new noise generator with seed
    pub fn new(seed: u64) -> Self {
        Self {
            state: NoiseState::from_seed(seed),
        }
    }

    pub fn from_state(state: NoiseState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &NoiseState {
        &self.state
    }
}

impl Noise2 for SimplexNoise {
    #[inline]
    fn sample(&self, x: f32, y: f32) -> f32 {
        sample(x, y, &self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skew_constants() {
        let f2 = 0.5 * (3.0_f32.sqrt() - 1.0);
        let g2 = (3.0 - 3.0_f32.sqrt()) / 6.0;
        assert!((F2 - f2).abs() < 1e-6);
        assert!((G2 - g2).abs() < 1e-6);
    }

    #[test]
    fn test_table_is_duplicated_permutation() {
        let state = NoiseState::from_seed(7);
        let perm = state.permutation();

        let mut seen = [false; 256];
        for &v in &perm[..256] {
            seen[v as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(&perm[..256], &perm[256..]);
    }

    #[test]
    fn test_same_seed_two_instances() {
        let a = SimplexNoise::new(42);
        let b = SimplexNoise::new(42);

        let va = a.sample(0.1, 0.2);
        let vb = b.sample(0.1, 0.2);
        assert_eq!(va.to_bits(), vb.to_bits());
    }

    #[test]
    fn test_repeated_sampling_is_deterministic() {
        let noise = SimplexNoise::new(1234);
        for k in 0..200 {
            let x = k as f32 * 0.37 - 20.0;
            let y = k as f32 * -0.91 + 5.0;
            assert_eq!(noise.sample(x, y).to_bits(), noise.sample(x, y).to_bits());
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = SimplexNoise::new(1);
        let b = SimplexNoise::new(2);
        let differs = (0..64).any(|k| {
            let x = k as f32 * 0.53;
            a.sample(x, x * 0.7) != b.sample(x, x * 0.7)
        });
        assert!(differs);
    }

    #[test]
    fn test_output_bounded() {
        let noise = SimplexNoise::new(99);
        let mut min = f32::MAX;
        let mut max = f32::MIN;

        for yi in -150..150 {
            for xi in -150..150 {
                let v = noise.sample(xi as f32 * 0.173, yi as f32 * 0.211);
                min = min.min(v);
                max = max.max(v);
            }
        }
        // Large magnitudes, including negative ones
        for k in 0..500 {
            let x = 10_000.0 + k as f32 * 3.7;
            let v = noise.sample(x, -x * 0.5);
            min = min.min(v);
            max = max.max(v);
        }

        assert!(min >= -1.0 - 1e-4, "min {} out of range", min);
        assert!(max <= 1.0 + 1e-4, "max {} out of range", max);
        // Not a flat field
        assert!(max - min > 0.5);
    }

    #[test]
    fn test_lattice_origin_is_zero() {
        // At a simplex vertex the first corner has zero offset, the other two
        // are too far away to contribute.
        let noise = SimplexNoise::new(5);
        assert_eq!(noise.sample(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_gpu_table_matches() {
        let state = NoiseState::from_seed(3);
        let table = state.gpu_table();
        assert_eq!(table.len(), 512);
        assert!(table
            .iter()
            .zip(state.permutation().iter())
            .all(|(&a, &b)| a == u32::from(b)));
    }
}
