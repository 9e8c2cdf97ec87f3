//! Marching-cubes surface extraction over the live particle set.
//!
//! A build is two passes: voxelize the particles into a binary occupancy
//! grid, then triangulate every cell the voxelization touched. Both the
//! grid and the mesh buffers are reused across builds.

pub mod tables;
pub mod triangulate;
pub mod voxel_map;

use glam::Vec3;
use rayon::prelude::*;

use crate::params::SphError;
use crate::particle::Particles3D;
use crate::surface::triangulate::{triangulate_cell, CellTriangles, Mesh, MeshBuilder};
use crate::surface::voxel_map::VoxelMap;

pub struct SurfaceMesher {
    voxels: VoxelMap,
    builder: MeshBuilder,
}

impl SurfaceMesher {
    /// Create a mesher with a `resolution^3` voxel grid. Resolutions too
    /// small for the interior corner clamp are rejected.
    pub fn new(resolution: usize) -> Result<Self, SphError> {
        Ok(Self {
            voxels: VoxelMap::new(resolution)?,
            builder: MeshBuilder::new(),
        })
    }

    pub fn resolution(&self) -> usize {
        self.voxels.resolution()
    }

    /// Change the grid resolution; buffers reallocate on the next build.
    pub fn set_resolution(&mut self, resolution: usize) -> Result<(), SphError> {
        self.voxels.set_resolution(resolution)
    }

    /// Voxelize `particles` over `[min, max]` and triangulate. The
    /// returned mesh is valid until the next build.
    pub fn build_mesh(&mut self, particles: &Particles3D, min: Vec3, max: Vec3) -> &Mesh {
        self.voxels.build(particles, min, max);

        // Cells triangulate independently; batches merge in list order so
        // repeated builds of an unchanged map emit identical buffers.
        let batches: Vec<CellTriangles> = self
            .voxels
            .used_cells()
            .par_iter()
            .map(|&cell| triangulate_cell(&self.voxels, cell))
            .collect();

        self.builder.clear();
        for batch in &batches {
            self.builder.push_cell(batch);
        }
        self.builder.mesh()
    }

    /// Mesh from the most recent build.
    pub fn mesh(&self) -> &Mesh {
        self.builder.mesh()
    }
}
