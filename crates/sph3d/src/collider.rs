//! Static shape colliders: oriented box, hollow sphere shell, inverted box.
//!
//! All three answer the same question: does the segment travelled by a
//! particle this step cross the shape, and if so where and with what
//! surface normal. The set is closed, so a tagged enum dispatches instead
//! of a trait object.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::serde_utils::{deserialize_quat, deserialize_vec3, serialize_quat, serialize_vec3};

/// Result of a segment-vs-collider test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Parameter along the segment where the crossing occurs, in [0, 1].
    /// The inner box never computes one and always reports 0, which makes
    /// the integrator snap the particle fully back.
    pub ratio: f32,
    /// World-space surface normal at the crossing.
    pub normal: Vec3,
}

/// An oriented box tested with the slab method in box-local space.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OrientedBox {
    #[serde(serialize_with = "serialize_vec3", deserialize_with = "deserialize_vec3")]
    pub position: Vec3,
    #[serde(serialize_with = "serialize_quat", deserialize_with = "deserialize_quat")]
    pub rotation: Quat,
    #[serde(serialize_with = "serialize_quat", deserialize_with = "deserialize_quat")]
    pub inv_rotation: Quat,
    #[serde(serialize_with = "serialize_vec3", deserialize_with = "deserialize_vec3")]
    pub min: Vec3,
    #[serde(serialize_with = "serialize_vec3", deserialize_with = "deserialize_vec3")]
    pub max: Vec3,
}

impl OrientedBox {
    /// Build from a world transform: center position, rotation and full
    /// extents (the box spans extents/2 each way). The inverse rotation is
    /// precomputed here and revalidated only when the transform changes.
    pub fn from_transform(position: Vec3, rotation: Quat, extents: Vec3) -> Self {
        Self {
            position,
            rotation,
            inv_rotation: rotation.inverse(),
            min: -extents * 0.5,
            max: extents * 0.5,
        }
    }

    pub fn test_collision(&self, start: Vec3, end: Vec3) -> Option<Hit> {
        // Map both endpoints into box-local space. The reference transform
        // is position - endpoint (not endpoint - position); the slab test
        // is symmetric under that flip and the face ids account for it.
        let start = self.inv_rotation * (self.position - start);
        let end = self.inv_rotation * (self.position - end);

        let mut fmin = 0.0_f32;
        let mut fmax = 1.0_f32;
        let mut face_id: i32 = 0;

        if !slab_overlap(start.x, end.x, self.min.x, self.max.x, &mut fmin, &mut fmax, 1, &mut face_id) {
            return None;
        }
        if !slab_overlap(start.y, end.y, self.min.y, self.max.y, &mut fmin, &mut fmax, 2, &mut face_id) {
            return None;
        }
        if !slab_overlap(start.z, end.z, self.min.z, self.max.z, &mut fmin, &mut fmax, 3, &mut face_id) {
            return None;
        }

        // Positive id: the entry plane won; negative: the exit plane.
        let ratio = if face_id > 0 { fmin } else { fmax };

        let axis = match face_id.abs() {
            1 => Vec3::X,
            2 => Vec3::Y,
            3 => Vec3::Z,
            // A segment entirely inside the box never wins a tie-break;
            // the hit carries a zero normal and the caller snaps back.
            _ => Vec3::ZERO,
        };
        let normal = self.rotation * axis * face_id.signum() as f32;
        Some(Hit { ratio, normal })
    }
}

/// One axis of the slab method. Maintains the running intersection
/// interval [fmin, fmax] and records which axis produced the current entry
/// (+id) or exit (-id) plane.
fn slab_overlap(
    start: f32,
    end: f32,
    min: f32,
    max: f32,
    fmin: &mut f32,
    fmax: &mut f32,
    id: i32,
    best_id: &mut i32,
) -> bool {
    let mut axis_min = (min - start) / (end - start);
    let mut axis_max = (max - start) / (end - start);
    if axis_max < axis_min {
        std::mem::swap(&mut axis_min, &mut axis_max);
    }

    if axis_max < *fmin {
        return false;
    }
    if axis_min > *fmax {
        return false;
    }

    *fmin = fmin.max(axis_min);
    *fmax = fmax.min(axis_max);

    if *fmin > *fmax {
        return false;
    }

    if axis_min == *fmin {
        *best_id = id;
    } else if axis_max == *fmax {
        *best_id = -id;
    }
    true
}

/// A hollow sphere shell: outer radius `radius`, inner radius
/// `radius - thickness`. Only outside-to-inside crossings of the inner
/// band are reported; a particle leaving through the wall passes through
/// untouched.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SphereShell {
    #[serde(serialize_with = "serialize_vec3", deserialize_with = "deserialize_vec3")]
    pub position: Vec3,
    pub radius: f32,
    pub thickness: f32,
}

impl SphereShell {
    pub fn new(position: Vec3, radius: f32, thickness: f32) -> Self {
        Self {
            position,
            radius,
            thickness,
        }
    }

    pub fn test_collision(&self, start: Vec3, end: Vec3) -> Option<Hit> {
        let inner = self.radius - self.thickness;
        let inner_sq = inner * inner;

        let starts_inside = self.position.distance_squared(start) < inner_sq;
        let ends_inside = self.position.distance_squared(end) < inner_sq;

        // No band transition this step.
        if starts_inside == ends_inside {
            return None;
        }

        // Inside-to-outside is left unhandled: the shell is one-way.
        if starts_inside {
            return None;
        }

        let rd = end - start;
        let t = (self.position - start).dot(rd);
        let closest = start + rd * t;
        let y_sq = (self.position - closest).length_squared();
        let x_sq = self.radius * self.radius - y_sq;
        // Chord misses the sphere entirely; no finite crossing parameter.
        if x_sq < 0.0 {
            return None;
        }
        let x = x_sq.sqrt();

        let hit_pos = start + rd * x;
        Some(Hit {
            ratio: x / self.radius,
            normal: (hit_pos - self.position).normalize(),
        })
    }
}

/// An inverted box whose faces point inward: the fluid lives inside and
/// the walls push back. Checked axis by axis from outside the
/// half-extents; the +Y face is open. No crossing parameter is computed,
/// so the integrator snaps offenders back to their pre-step position.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct InnerBox {
    #[serde(serialize_with = "serialize_vec3", deserialize_with = "deserialize_vec3")]
    pub position: Vec3,
    /// Half-extents on each axis.
    #[serde(serialize_with = "serialize_vec3", deserialize_with = "deserialize_vec3")]
    pub size: Vec3,
}

impl InnerBox {
    pub fn new(position: Vec3, size: Vec3) -> Self {
        Self { position, size }
    }

    pub fn test_collision(&self, _start: Vec3, end: Vec3) -> Option<Hit> {
        if end.x > self.position.x + self.size.x {
            return Some(Hit { ratio: 0.0, normal: Vec3::NEG_X });
        }
        if end.x < self.position.x - self.size.x {
            return Some(Hit { ratio: 0.0, normal: Vec3::X });
        }
        if end.z > self.position.z + self.size.z {
            return Some(Hit { ratio: 0.0, normal: Vec3::NEG_Z });
        }
        if end.z < self.position.z - self.size.z {
            return Some(Hit { ratio: 0.0, normal: Vec3::Z });
        }
        if end.y < self.position.y - self.size.y {
            return Some(Hit { ratio: 0.0, normal: Vec3::Y });
        }
        None
    }
}

/// The closed set of collider shapes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum Collider {
    Box(OrientedBox),
    Sphere(SphereShell),
    InnerBox(InnerBox),
}

impl Collider {
    /// Test the segment from `start` to `end` against this shape.
    pub fn test_collision(&self, start: Vec3, end: Vec3) -> Option<Hit> {
        match self {
            Collider::Box(b) => b.test_collision(start, end),
            Collider::Sphere(s) => s.test_collision(start, end),
            Collider::InnerBox(b) => b.test_collision(start, end),
        }
    }
}

/// Ordered list of colliders; the first hit wins.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ColliderSet {
    colliders: Vec<Collider>,
}

impl ColliderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_colliders(colliders: Vec<Collider>) -> Self {
        Self { colliders }
    }

    pub fn push(&mut self, collider: Collider) {
        self.colliders.push(collider);
    }

    pub fn clear(&mut self) {
        self.colliders.clear();
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// First collider hit along the segment, in insertion order.
    pub fn test_collision(&self, start: Vec3, end: Vec3) -> Option<Hit> {
        self.colliders
            .iter()
            .find_map(|c| c.test_collision(start, end))
    }
}
