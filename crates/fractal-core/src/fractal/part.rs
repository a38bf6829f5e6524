use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Quat, Vec3};

/// Children spawned by every part; also the arity of the implicit tree.
pub const CHILD_COUNT: usize = 5;

/// Distance from parent to child, in units of the child's scale.
pub const CHILD_OFFSET: f32 = 1.5;

/// Axis every part spins around, in its own local frame.
pub const SPIN_AXIS: Vec3 = Vec3::Y;

/// Offset direction of each child slot: up, right, left, forward, back.
pub const DIRECTIONS: [Vec3; CHILD_COUNT] = [Vec3::Y, Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z];

/// Local rotation paired with `DIRECTIONS[slot]`; turns the part's local up
/// axis onto its offset direction.
pub fn slot_rotation(slot: usize) -> Quat {
    match slot % CHILD_COUNT {
        0 => Quat::IDENTITY,
        1 => Quat::from_rotation_z(-FRAC_PI_2),
        2 => Quat::from_rotation_z(FRAC_PI_2),
        3 => Quat::from_rotation_x(FRAC_PI_2),
        _ => Quat::from_rotation_x(-FRAC_PI_2),
    }
}

/// Index of the parent of part `index` on the previous level.
#[inline]
pub fn parent_index(index: usize) -> usize {
    index / CHILD_COUNT
}

/// Child slot (0..5) of part `index` within its parent's group.
#[inline]
pub fn child_slot(index: usize) -> usize {
    index % CHILD_COUNT
}

/// Keeps accumulated spin in `[0, TAU)` so long runs don't lose precision.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(TAU)
}

/// One node of the fractal. Has no identity beyond its (level, index) slot.
///
/// `direction` and `rotation` are fixed at creation; `spin_angle`,
/// `world_rotation` and `world_position` are rewritten every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalPart {
    direction: Vec3,
    rotation: Quat,
    pub spin_angle: f32,
    pub world_rotation: Quat,
    pub world_position: Vec3,
}

impl FractalPart {
    /// Create the part occupying child slot `slot` (taken modulo 5).
    pub fn for_slot(slot: usize) -> Self {
        let slot = slot % CHILD_COUNT;
        Self {
            direction: DIRECTIONS[slot],
            rotation: slot_rotation(slot),
            spin_angle: 0.0,
            world_rotation: Quat::IDENTITY,
            world_position: Vec3::ZERO,
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Local rotation followed by the current spin, regenerated from the
    /// accumulated angle rather than integrated.
    #[inline]
    pub fn spun_rotation(&self) -> Quat {
        self.rotation * Quat::from_axis_angle(SPIN_AXIS, self.spin_angle)
    }
}
