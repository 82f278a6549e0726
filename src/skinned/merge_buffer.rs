use glam::Vec3A;
use log::warn;

use crate::{
    bullet::{
        collision::{
            dispatch::collision_dispatcher::ManifoldDispatcher,
            narrowphase::manifold_point::ManifoldPoint,
        },
        dynamics::rigid_body::RigidBody,
        linear_math::AffineExt,
    },
    skinned::{body::SkinnedMeshBody, geometry::CollisionResult, shape::ShapeRef},
};

/// Running depth-weighted sums for one (bone of A, bone of B) pair.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MergeCell {
    pub weight: f32,
    pub normal: Vec3A,
    /// Summed contact positions on A and on B
    pub pos: [Vec3A; 2],
}

/// Folds raw collider contacts into at most one contact per bone pair.
///
/// Contributions are weighted by the square of `flexible * depth`,
/// so deep contacts between flexible colliders dominate the average.
#[derive(Clone, Debug, Default)]
pub struct MergeBuffer {
    buffer: Vec<MergeCell>,
    num_bones_a: usize,
    num_bones_b: usize,
}

impl MergeBuffer {
    /// Zeroes a cell for every bone pair of two bodies, reusing the existing allocation.
    pub fn alloc(&mut self, num_bones_a: usize, num_bones_b: usize) {
        self.num_bones_a = num_bones_a;
        self.num_bones_b = num_bones_b;
        self.buffer.clear();
        self.buffer
            .resize(num_bones_a * num_bones_b, MergeCell::default());
    }

    pub fn release(&mut self) {
        self.buffer.clear();
        self.num_bones_a = 0;
        self.num_bones_b = 0;
    }

    #[inline]
    #[must_use]
    pub fn num_bones(&self) -> (usize, usize) {
        (self.num_bones_a, self.num_bones_b)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, bone_a: usize, bone_b: usize) -> &MergeCell {
        &self.buffer[bone_a * self.num_bones_b + bone_b]
    }

    #[inline]
    pub fn get_mut(&mut self, bone_a: usize, bone_b: usize) -> &mut MergeCell {
        &mut self.buffer[bone_a * self.num_bones_b + bone_b]
    }

    /// Accumulates `results`, which must be sorted deepest first.
    /// Collider indices in the results refer to the trees of `shape_a` and `shape_b`.
    pub fn do_merge(
        &mut self,
        body_a: &SkinnedMeshBody,
        shape_a: ShapeRef<'_>,
        body_b: &SkinnedMeshBody,
        shape_b: ShapeRef<'_>,
        results: &[CollisionResult],
    ) {
        let colliders_a = shape_a.tree().colliders();
        let colliders_b = shape_b.tree().colliders();

        for res in results {
            if res.depth >= -f32::EPSILON {
                break;
            }

            let collider_a = &colliders_a[res.collider_a];
            let collider_b = &colliders_b[res.collider_b];

            // Rigid against rigid, nothing to push
            let flexible = collider_a.flexible.max(collider_b.flexible);
            if flexible < f32::EPSILON {
                continue;
            }

            let w = flexible * res.depth;
            let w2 = w * w;

            for i in 0..shape_a.get_bone_per_collider() {
                let (bone_a, weight_a) = shape_a.get_collider_bone(&body_a.vertices, collider_a, i);
                if weight_a <= 0.0 {
                    continue;
                }

                let bone0 = &body_a.skinned_bones[bone_a];
                if weight_a <= bone0.weight_threshold {
                    continue;
                }

                for j in 0..shape_b.get_bone_per_collider() {
                    let (bone_b, weight_b) =
                        shape_b.get_collider_bone(&body_b.vertices, collider_b, j);
                    if weight_b <= 0.0 {
                        continue;
                    }

                    let bone1 = &body_b.skinned_bones[bone_b];
                    if weight_b <= bone1.weight_threshold {
                        continue;
                    }

                    if bone0.is_kinematic && bone1.is_kinematic {
                        continue;
                    }

                    let cell = self.get_mut(bone_a, bone_b);
                    cell.weight += w2;
                    cell.normal += res.normal_on_b * w * w2;
                    cell.pos[0] += res.pos_a * w2;
                    cell.pos[1] += res.pos_b * w2;
                }
            }
        }
    }

    /// Turns every cell that still describes a penetration into one manifold point
    /// between the rigid bodies of its two bones.
    pub fn apply(
        &self,
        body0: &SkinnedMeshBody,
        body1: &SkinnedMeshBody,
        rigid_bodies: &[RigidBody],
        dispatcher: &mut dyn ManifoldDispatcher,
    ) {
        for (i, bone_a) in body0.skinned_bones.iter().enumerate() {
            for (j, bone_b) in body1.skinned_bones.iter().enumerate() {
                let cell = self.get(i, j);
                if cell.weight < f32::EPSILON {
                    continue;
                }

                if bone_a.is_kinematic && bone_b.is_kinematic {
                    continue;
                }

                if bone_a.rigid_body == bone_b.rigid_body {
                    continue;
                }

                if !body0.can_collide_with_bone(bone_b.rigid_body)
                    || !body1.can_collide_with_bone(bone_a.rigid_body)
                {
                    continue;
                }

                let inv = 1.0 / cell.weight;
                let (normal, length) = (cell.normal * inv).normalize_and_length();
                if !normal.is_finite() || length < f32::EPSILON {
                    continue;
                }

                let depth = -length;
                if depth >= -f32::EPSILON {
                    continue;
                }

                let (Some(rb0), Some(rb1)) = (
                    rigid_bodies.get(bone_a.rigid_body),
                    rigid_bodies.get(bone_b.rigid_body),
                ) else {
                    warn!(
                        "skipping contact between rigid bodies {} and {}: only {} exist",
                        bone_a.rigid_body,
                        bone_b.rigid_body,
                        rigid_bodies.len()
                    );
                    continue;
                };

                let pos_a = cell.pos[0] * inv;
                let pos_b = cell.pos[1] * inv;

                let mut point = ManifoldPoint::new(
                    rb0.get_world_transform().inv_x_form(pos_a),
                    rb1.get_world_transform().inv_x_form(pos_b),
                    -normal,
                    depth,
                );
                point.position_world_on_a = pos_a;
                point.position_world_on_b = pos_b;
                point.combined_friction = rb0.friction * rb1.friction;
                point.combined_restitution = rb0.restitution * rb1.restitution;
                point.combined_rolling_friction = rb0.rolling_friction * rb1.rolling_friction;

                dispatcher
                    .get_new_manifold(bone_a.rigid_body, bone_b.rigid_body)
                    .add_manifold_point(point);
            }
        }
    }
}
