//! Uniform spatial hash for sub-quadratic neighbor search.
//!
//! Positions quantize to integer cells of `cell_size` (the kernel support
//! radius), and cells hash to buckets of particle indices. Distinct cells
//! may collide in the same bucket, so callers always re-check exact
//! distances. The grid is discarded and rebuilt every substep because the
//! integrate phase moves every particle.

use glam::{IVec3, Vec3};
use rustc_hash::FxHashMap;

use crate::particle::Particles3D;

/// The 3x3x3 ring of cell offsets enumerated by every neighbor query.
/// Both the density and force phases walk this same ring, keeping their
/// neighbor sets consistent.
pub const NEIGHBOR_OFFSETS: [IVec3; 27] = {
    let mut offsets = [IVec3::ZERO; 27];
    let mut i = 0;
    let mut x = -1;
    while x <= 1 {
        let mut y = -1;
        while y <= 1 {
            let mut z = -1;
            while z <= 1 {
                offsets[i] = IVec3::new(x, y, z);
                i += 1;
                z += 1;
            }
            y += 1;
        }
        x += 1;
    }
    offsets
};

/// Bucketed uniform hash grid over particle indices.
pub struct SpatialHashGrid {
    cell_size: f32,
    buckets: FxHashMap<u64, Vec<usize>>,
}

impl SpatialHashGrid {
    /// Create an empty grid with the given cell size (the support radius).
    pub fn new(cell_size: f32) -> Self {
        assert!(cell_size > 0.0, "cell_size must be positive, got {}", cell_size);
        Self {
            cell_size,
            buckets: FxHashMap::default(),
        }
    }

    /// Quantize a world position to its integer cell.
    #[inline]
    pub fn cell_of(&self, position: Vec3) -> IVec3 {
        (position / self.cell_size).floor().as_ivec3()
    }

    /// Combine a cell's axes into one id with the Teschner prime scheme.
    /// Different cells may produce the same id.
    #[inline]
    pub fn hash_cell(cell: IVec3) -> u64 {
        let x = cell.x as i64 as u64;
        let y = cell.y as i64 as u64;
        let z = cell.z as i64 as u64;
        x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663) ^ z.wrapping_mul(83_492_791)
    }

    /// Rebuild all buckets from the current particle positions. O(n).
    pub fn build(&mut self, particles: &Particles3D) {
        self.buckets.clear();
        for (i, p) in particles.list.iter().enumerate() {
            let id = Self::hash_cell(self.cell_of(p.position));
            self.buckets.entry(id).or_default().push(i);
        }
    }

    /// Visit every particle index found in the 27-cell ring around
    /// `position`. A superset of the true radius-h neighbor set; the caller
    /// performs the exact distance check.
    #[inline]
    pub fn for_each_neighbor(&self, position: Vec3, mut f: impl FnMut(usize)) {
        let center = self.cell_of(position);
        for offset in NEIGHBOR_OFFSETS {
            let id = Self::hash_cell(center + offset);
            if let Some(bucket) = self.buckets.get(&id) {
                for &index in bucket {
                    f(index);
                }
            }
        }
    }

    /// Number of occupied buckets (diagnostic).
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}
