//! Occupancy voxelization of the particle set.
//!
//! Particles quantize into a dense `resolution^3` scalar grid; a cell is
//! 1.0 if any particle landed in it. Alongside the grid, a deduplicated
//! list of "used" cells records where triangulation has any chance of
//! producing geometry, so the mesher never scans the full grid.

use glam::{IVec3, Vec3};

use crate::params::SphError;
use crate::particle::Particles3D;
use crate::surface::tables::CORNER_OFFSETS;

/// Smallest resolution at which the corner clamp [2, resolution-3] leaves
/// a non-empty interior.
pub const MIN_RESOLUTION: usize = 5;

pub struct VoxelMap {
    resolution: usize,
    min: Vec3,
    step: f32,
    values: Vec<f32>,
    used: Vec<bool>,
    used_cells: Vec<IVec3>,
}

impl VoxelMap {
    pub fn new(resolution: usize) -> Result<Self, SphError> {
        if resolution < MIN_RESOLUTION {
            return Err(SphError::ResolutionTooSmall(resolution, MIN_RESOLUTION));
        }
        let cells = resolution * resolution * resolution;
        Ok(Self {
            resolution,
            min: Vec3::ZERO,
            step: 1.0,
            values: vec![0.0; cells],
            used: vec![false; cells],
            used_cells: Vec::new(),
        })
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Lower corner of the voxelized region (set by the last build).
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// World-space edge length of one cell (set by the last build).
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Reallocate for a new resolution. All state is discarded.
    pub fn set_resolution(&mut self, resolution: usize) -> Result<(), SphError> {
        if resolution < MIN_RESOLUTION {
            return Err(SphError::ResolutionTooSmall(resolution, MIN_RESOLUTION));
        }
        if resolution != self.resolution {
            log::debug!("voxel map reallocating: {} -> {}", self.resolution, resolution);
            self.resolution = resolution;
            let cells = resolution * resolution * resolution;
            self.values = vec![0.0; cells];
            self.used = vec![false; cells];
            self.used_cells.clear();
        }
        Ok(())
    }

    #[inline]
    fn flat_index(&self, cell: IVec3) -> usize {
        let r = self.resolution as i32;
        debug_assert!(cell.cmpge(IVec3::ZERO).all() && cell.cmplt(IVec3::splat(r)).all());
        (cell.x + r * (cell.y + r * cell.z)) as usize
    }

    /// Occupancy value at a cell.
    #[inline]
    pub fn value_at(&self, cell: IVec3) -> f32 {
        self.values[self.flat_index(cell)]
    }

    /// Cells enqueued by the last build, each at most once.
    pub fn used_cells(&self) -> &[IVec3] {
        &self.used_cells
    }

    /// Quantize a particle position into the clamped interior of the grid.
    #[inline]
    fn cell_of(&self, position: Vec3, max: Vec3) -> IVec3 {
        let clamped = position.clamp(self.min, max);
        let cell = ((clamped - self.min) / self.step).floor().as_ivec3();
        let lo = 2;
        let hi = self.resolution as i32 - 3;
        cell.clamp(IVec3::splat(lo), IVec3::splat(hi))
    }

    /// Rebuild occupancy and the used-cell list over `[min, max]`.
    ///
    /// The step derives from the X extent; the region is assumed roughly
    /// cubic. Every occupied cell enqueues its two corner 8-neighborhoods
    /// (cell +/- each corner offset) so that all cells whose corner samples
    /// could see the occupancy get triangulated.
    pub fn build(&mut self, particles: &Particles3D, min: Vec3, max: Vec3) {
        let cells = self.resolution * self.resolution * self.resolution;
        assert_eq!(self.values.len(), cells, "voxel buffers out of sync with resolution");
        assert_eq!(self.used.len(), cells);

        // Occupancy was only ever written to enqueued cells, so clearing the
        // used set restores an all-zero grid without a full sweep.
        for &cell in &self.used_cells {
            let i = self.flat_index(cell);
            self.values[i] = 0.0;
            self.used[i] = false;
        }
        self.used_cells.clear();

        self.min = min;
        self.step = (max.x - min.x) / self.resolution as f32;

        for p in &particles.list {
            let cell = self.cell_of(p.position, max);
            let i = self.flat_index(cell);
            self.values[i] = 1.0;

            for offset in CORNER_OFFSETS {
                self.enqueue(cell + offset);
                self.enqueue(cell - offset);
            }
        }
    }

    #[inline]
    fn enqueue(&mut self, cell: IVec3) {
        let i = self.flat_index(cell);
        if !self.used[i] {
            self.used[i] = true;
            self.used_cells.push(cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_tiny_resolution() {
        assert!(matches!(
            VoxelMap::new(4),
            Err(SphError::ResolutionTooSmall(4, MIN_RESOLUTION))
        ));
        assert!(VoxelMap::new(5).is_ok());
    }

    #[test]
    fn test_single_particle_marks_one_cell() {
        let mut map = VoxelMap::new(16).unwrap();
        let mut particles = Particles3D::new();
        particles.spawn_at(Vec3::splat(8.0));

        map.build(&particles, Vec3::ZERO, Vec3::splat(16.0));

        let occupied: usize = map.used_cells().iter().filter(|&&c| map.value_at(c) > 0.0).count();
        assert_eq!(occupied, 1);
    }

    #[test]
    fn test_single_particle_used_cells_bounded() {
        let mut map = VoxelMap::new(16).unwrap();
        let mut particles = Particles3D::new();
        particles.spawn_at(Vec3::splat(8.0));

        map.build(&particles, Vec3::ZERO, Vec3::splat(16.0));

        // +/- the 8 corner offsets around one cell, deduplicated.
        assert!(!map.used_cells().is_empty());
        assert!(map.used_cells().len() <= 16);

        // No duplicates.
        for (i, a) in map.used_cells().iter().enumerate() {
            for b in &map.used_cells()[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_out_of_bounds_particle_clamps_to_interior() {
        let mut map = VoxelMap::new(8).unwrap();
        let mut particles = Particles3D::new();
        particles.spawn_at(Vec3::splat(-100.0));
        particles.spawn_at(Vec3::splat(100.0));

        map.build(&particles, Vec3::ZERO, Vec3::splat(8.0));

        for &cell in map.used_cells() {
            assert!(cell.cmpge(IVec3::ZERO).all());
            assert!(cell.cmplt(IVec3::splat(8)).all());
        }
        // The clamp keeps occupied cells in [2, resolution-3].
        assert!(map.value_at(IVec3::splat(2)) > 0.0);
        assert!(map.value_at(IVec3::splat(5)) > 0.0);
    }

    #[test]
    fn test_rebuild_clears_previous_occupancy() {
        let mut map = VoxelMap::new(16).unwrap();
        let mut particles = Particles3D::new();
        particles.spawn_at(Vec3::splat(4.0));

        map.build(&particles, Vec3::ZERO, Vec3::splat(16.0));
        assert!(map.value_at(IVec3::splat(4)) > 0.0);

        particles.clear();
        particles.spawn_at(Vec3::splat(12.0));
        map.build(&particles, Vec3::ZERO, Vec3::splat(16.0));

        assert!(map.value_at(IVec3::splat(4)) == 0.0);
        assert!(map.value_at(IVec3::splat(12)) > 0.0);
    }
}
