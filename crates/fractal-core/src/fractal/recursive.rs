//! Per-node fractal: every node owns its five children and its own local
//! transform, like a scene-graph hierarchy.
//!
//! This is the layout the flat store replaces. Evaluating it walks the whole
//! tree recursively and composes transforms on the way down, so it is only
//! used as a reference to check the level-indexed engine against.

use glam::{Quat, Vec3};

use crate::config::validate_depth;
use crate::error::Result;
use crate::fractal::part::{slot_rotation, wrap_angle, CHILD_COUNT, DIRECTIONS, SPIN_AXIS};
use crate::math::level_len;

/// Local offset of a child in its parent's space, before the parent's scale.
const LOCAL_OFFSET: f32 = 0.75;
/// Local scale of a child relative to its parent.
const LOCAL_SCALE: f32 = 0.5;

pub struct RecursiveFractal {
    local_position: Vec3,
    local_rotation: Quat,
    local_scale: f32,
    spin_angle: f32,
    children: Vec<RecursiveFractal>,
}

/// World transform of one node after flattening.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldTransform {
    pub rotation: Quat,
    pub position: Vec3,
    pub scale: f32,
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            position: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

/// Spawn a tree of `depth` levels. Children are created in slot order, so
/// child `c` of node `i` flattens to index `5 * i + c` on the next level.
pub fn spawn(depth: usize) -> Result<RecursiveFractal> {
    validate_depth(depth)?;
    Ok(spawn_node(depth, Vec3::ZERO, Quat::IDENTITY, 1.0))
}

fn spawn_node(depth: usize, local_position: Vec3, local_rotation: Quat, local_scale: f32) -> RecursiveFractal {
    let children = if depth > 1 {
        (0..CHILD_COUNT)
            .map(|slot| {
                spawn_node(
                    depth - 1,
                    LOCAL_OFFSET * DIRECTIONS[slot],
                    slot_rotation(slot),
                    LOCAL_SCALE,
                )
            })
            .collect()
    } else {
        Vec::new()
    };
    RecursiveFractal {
        local_position,
        local_rotation,
        local_scale,
        spin_angle: 0.0,
        children,
    }
}

impl RecursiveFractal {
    /// Levels below and including this node.
    pub fn depth(&self) -> usize {
        1 + self.children.first().map_or(0, RecursiveFractal::depth)
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(RecursiveFractal::node_count).sum::<usize>()
    }

    /// Spin every node about its local up axis by `angle` radians.
    pub fn spin(&mut self, angle: f32) {
        self.spin_angle = wrap_angle(self.spin_angle + angle);
        for child in &mut self.children {
            child.spin(angle);
        }
    }

    /// World transforms of every node grouped by level, in flat-store order.
    pub fn world_transforms(&self) -> Vec<Vec<WorldTransform>> {
        let mut levels: Vec<Vec<WorldTransform>> = (0..self.depth())
            .map(|level| vec![WorldTransform::default(); level_len(level)])
            .collect();
        self.collect(0, 0, &WorldTransform::default(), &mut levels);
        levels
    }

    fn collect(
        &self,
        level: usize,
        index: usize,
        parent: &WorldTransform,
        out: &mut [Vec<WorldTransform>],
    ) {
        let local_rotation = self.local_rotation * Quat::from_axis_angle(SPIN_AXIS, self.spin_angle);
        let world = WorldTransform {
            rotation: parent.rotation * local_rotation,
            position: parent.position + parent.rotation * (parent.scale * self.local_position),
            scale: parent.scale * self.local_scale,
        };
        out[level][index] = world;
        for (slot, child) in self.children.iter().enumerate() {
            child.collect(level + 1, index * CHILD_COUNT + slot, &world, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_counts() {
        let tree = spawn(3).unwrap();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.node_count(), 31);
        assert!(spawn(0).is_err());
    }

    #[test]
    fn test_first_child_sits_above_root() {
        let tree = spawn(2).unwrap();
        let levels = tree.world_transforms();
        let up = levels[1][0];
        assert!((up.position - Vec3::new(0.0, 0.75, 0.0)).length() < 1e-6);
        assert_eq!(up.scale, 0.5);
    }
}
