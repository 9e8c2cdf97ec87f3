//! Quantized solid-cell obstacle grid.
//!
//! A coarse voxelization of static geometry the fluid must not enter.
//! Integration checks, per axis, whether a particle's cell index crossed
//! into a solid cell this step and reflects that velocity component. The
//! grid is axis-aligned and never changes during a substep.

use glam::{IVec3, Vec3};

/// Dense grid of solid flags over an axis-aligned region.
pub struct ObstacleGrid {
    origin: Vec3,
    cell_size: f32,
    size: IVec3,
    solid: Vec<bool>,
}

impl ObstacleGrid {
    pub fn new(origin: Vec3, cell_size: f32, size: IVec3) -> Self {
        assert!(cell_size > 0.0, "cell_size must be positive, got {}", cell_size);
        assert!(
            size.cmpgt(IVec3::ZERO).all(),
            "grid size must be positive on every axis, got {:?}",
            size
        );
        let cells = (size.x * size.y * size.z) as usize;
        Self {
            origin,
            cell_size,
            size,
            solid: vec![false; cells],
        }
    }

    /// Quantize a world position to its cell index (may be out of range).
    #[inline]
    pub fn cell_of(&self, position: Vec3) -> IVec3 {
        ((position - self.origin) / self.cell_size).floor().as_ivec3()
    }

    #[inline]
    fn flat_index(&self, cell: IVec3) -> Option<usize> {
        if cell.cmplt(IVec3::ZERO).any() || cell.cmpge(self.size).any() {
            return None;
        }
        Some((cell.x + self.size.x * (cell.y + self.size.y * cell.z)) as usize)
    }

    /// Flag one cell as solid.
    pub fn mark_solid(&mut self, cell: IVec3) {
        if let Some(i) = self.flat_index(cell) {
            self.solid[i] = true;
        }
    }

    /// Whether the cell containing `position` is solid. Positions outside
    /// the grid are open.
    #[inline]
    pub fn is_solid_at(&self, position: Vec3) -> bool {
        match self.flat_index(self.cell_of(position)) {
            Some(i) => self.solid[i],
            None => false,
        }
    }

    /// Resolve a step from `start` to `end` against the solid cells.
    ///
    /// For each axis whose movement alone lands in a solid cell, the
    /// position component is held at `start` and the velocity component
    /// negated. If the combined result still sits in a solid cell the
    /// particle snaps fully back to `start`. Returns `None` when nothing
    /// was touched.
    pub fn resolve(&self, start: Vec3, end: Vec3, velocity: Vec3) -> Option<(Vec3, Vec3)> {
        let start_cell = self.cell_of(start);
        let mut pos = end;
        let mut vel = velocity;
        let mut touched = false;

        for axis in 0..3 {
            let mut probe = start;
            probe[axis] = end[axis];
            let probe_cell = self.cell_of(probe);
            if probe_cell[axis] != start_cell[axis] && self.is_solid_at(probe) {
                pos[axis] = start[axis];
                vel[axis] = -vel[axis];
                touched = true;
            }
        }

        if !touched {
            return None;
        }
        // Diagonal crossings can slip past the per-axis probes.
        if self.is_solid_at(pos) {
            pos = start;
        }
        Some((pos, vel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_wall_at_x2() -> ObstacleGrid {
        // 4x4x4 unit cells, column of solid cells at x index 2.
        let mut grid = ObstacleGrid::new(Vec3::ZERO, 1.0, IVec3::splat(4));
        for y in 0..4 {
            for z in 0..4 {
                grid.mark_solid(IVec3::new(2, y, z));
            }
        }
        grid
    }

    #[test]
    fn test_crossing_into_wall_reflects_x() {
        let grid = grid_with_wall_at_x2();
        let start = Vec3::new(1.5, 0.5, 0.5);
        let end = Vec3::new(2.5, 0.5, 0.5);
        let vel = Vec3::new(3.0, 0.0, 0.0);

        let (pos, new_vel) = grid.resolve(start, end, vel).expect("wall must block");
        assert_eq!(pos.x, start.x);
        assert_eq!(new_vel.x, -3.0);
        assert_eq!(new_vel.y, 0.0);
    }

    #[test]
    fn test_motion_in_open_cells_untouched() {
        let grid = grid_with_wall_at_x2();
        let start = Vec3::new(0.5, 0.5, 0.5);
        let end = Vec3::new(1.5, 1.5, 0.5);
        assert!(grid.resolve(start, end, Vec3::ONE).is_none());
    }

    #[test]
    fn test_outside_grid_is_open() {
        let grid = grid_with_wall_at_x2();
        assert!(!grid.is_solid_at(Vec3::splat(-10.0)));
        assert!(!grid.is_solid_at(Vec3::splat(100.0)));
    }

    #[test]
    fn test_only_crossing_axis_reflects() {
        let grid = grid_with_wall_at_x2();
        let start = Vec3::new(1.5, 0.5, 0.5);
        let end = Vec3::new(2.5, 1.2, 0.5);
        let vel = Vec3::new(2.0, 1.0, 0.0);

        let (pos, new_vel) = grid.resolve(start, end, vel).expect("x wall blocks");
        assert_eq!(new_vel.x, -2.0);
        // Y movement stays within open cells; component is preserved.
        assert_eq!(new_vel.y, 1.0);
        assert_eq!(pos.y, end.y);
    }
}
