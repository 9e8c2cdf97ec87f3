//! Per-cell marching-cubes triangulation and the reusable mesh buffer.

use glam::{IVec3, Vec3};

use crate::surface::tables::{CORNER_OFFSETS, EDGE_CORNERS, TRI_STRIDE, TRI_TABLE};
use crate::surface::voxel_map::VoxelMap;

/// Triangles emitted by one cell. A single configuration never produces
/// more than 5.
#[derive(Clone, Copy, Debug)]
pub struct CellTriangles {
    triangles: [[Vec3; 3]; 5],
    len: usize,
}

impl CellTriangles {
    pub const EMPTY: Self = Self {
        triangles: [[Vec3::ZERO; 3]; 5],
        len: 0,
    };

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Vec3; 3]> {
        self.triangles[..self.len].iter()
    }
}

/// Triangulate one cell of the occupancy grid.
///
/// The 8-bit configuration sets bit k when corner k's sample is positive.
/// Vertices sit at the geometric midpoint of each cut edge (occupancy is
/// binary, so there is nothing to interpolate) and are mapped to world
/// space with the map's origin and step.
pub fn triangulate_cell(map: &VoxelMap, cell: IVec3) -> CellTriangles {
    let mut config = 0usize;
    for (k, offset) in CORNER_OFFSETS.iter().enumerate() {
        if map.value_at(cell + *offset) > 0.0 {
            config |= 1 << k;
        }
    }
    if config == 0 || config == 255 {
        return CellTriangles::EMPTY;
    }

    let base = map.min();
    let step = map.step();
    let cell_f = cell.as_vec3();

    let mut out = CellTriangles::EMPTY;
    let row = &TRI_TABLE[config * TRI_STRIDE..(config + 1) * TRI_STRIDE];
    let mut i = 0;
    while row[i] >= 0 {
        let mut triangle = [Vec3::ZERO; 3];
        for (v, &edge) in row[i..i + 3].iter().enumerate() {
            let edge = edge as usize;
            let a = CORNER_OFFSETS[EDGE_CORNERS[edge * 2]].as_vec3();
            let b = CORNER_OFFSETS[EDGE_CORNERS[edge * 2 + 1]].as_vec3();
            let midpoint = (a + b) * 0.5;
            triangle[v] = base + (cell_f + midpoint) * step;
        }
        out.triangles[out.len] = triangle;
        out.len += 1;
        i += 3;
    }
    out
}

/// Mesh buffer: flat vertex list, three consecutive vertices per triangle,
/// no vertex sharing.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Reusable builder: cleared at the start of every mesh build so the
/// vertex allocations persist across frames.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    mesh: Mesh,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.mesh.vertices.clear();
        self.mesh.indices.clear();
    }

    pub fn push_cell(&mut self, cell: &CellTriangles) {
        for triangle in cell.iter() {
            for &vertex in triangle {
                self.mesh.indices.push(self.mesh.vertices.len() as u32);
                self.mesh.vertices.push(vertex);
            }
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particles3D;

    fn map_with_particle_at(p: Vec3) -> VoxelMap {
        let mut map = VoxelMap::new(16).unwrap();
        let mut particles = Particles3D::new();
        particles.spawn_at(p);
        map.build(&particles, Vec3::ZERO, Vec3::splat(16.0));
        map
    }

    #[test]
    fn test_empty_cell_emits_nothing() {
        let map = VoxelMap::new(16).unwrap();
        let tris = triangulate_cell(&map, IVec3::splat(5));
        assert!(tris.is_empty());
    }

    #[test]
    fn test_occupied_neighborhood_emits_triangles() {
        let map = map_with_particle_at(Vec3::splat(8.5));
        let total: usize = map
            .used_cells()
            .iter()
            .map(|&c| triangulate_cell(&map, c).len())
            .sum();
        assert!(total > 0, "an isolated particle must produce a surface");
    }

    #[test]
    fn test_vertices_lie_within_cell_bounds() {
        let map = map_with_particle_at(Vec3::splat(8.5));
        for &cell in map.used_cells() {
            let tris = triangulate_cell(&map, cell);
            let lo = map.min() + cell.as_vec3() * map.step();
            let hi = lo + Vec3::splat(map.step());
            for triangle in tris.iter() {
                for v in triangle {
                    assert!(v.cmpge(lo).all() && v.cmple(hi).all(), "{:?} outside {:?}..{:?}", v, lo, hi);
                }
            }
        }
    }

    #[test]
    fn test_cell_never_exceeds_five_triangles() {
        let map = map_with_particle_at(Vec3::splat(8.5));
        for &cell in map.used_cells() {
            assert!(triangulate_cell(&map, cell).len() <= 5);
        }
    }

    #[test]
    fn test_builder_reuse_is_idempotent() {
        let map = map_with_particle_at(Vec3::splat(8.5));
        let mut builder = MeshBuilder::new();

        for &cell in map.used_cells() {
            builder.push_cell(&triangulate_cell(&map, cell));
        }
        let first = builder.mesh().clone();

        builder.clear();
        for &cell in map.used_cells() {
            builder.push_cell(&triangulate_cell(&map, cell));
        }
        assert_eq!(first.vertices, builder.mesh().vertices);
        assert_eq!(first.indices, builder.mesh().indices);
    }
}
