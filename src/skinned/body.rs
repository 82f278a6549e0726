use ahash::AHashSet;
use arrayvec::ArrayVec;
use glam::{Affine3A, Vec3A};

use crate::{
    bullet::{
        collision::broadphase::BroadphaseNativeTypes, dynamics::rigid_body::RigidBody,
        linear_math::aabb_util_2::Aabb,
    },
    consts::{BONES_PER_TRIANGLE, BONES_PER_VERTEX},
    error::SkinnedMeshError,
    skinned::{
        collider::{Collider, ColliderKind, TriangleShapeProp, VertexPos, VertexShapeProp},
        collider_tree::{ColliderTree, ColliderTreeBuilder},
        shape::{PerTriangleShape, PerVertexShape, SkinnedMeshShape},
    },
};

/// A bone of a skinned body, driven by one rigid body of the physics world.
#[derive(Clone, Debug)]
pub struct SkinnedBone {
    /// Index of the driving rigid body
    pub rigid_body: usize,
    /// Takes a skin-space vertex into the rigid body's local space.
    pub vertex_to_bone: Affine3A,
    pub margin_multiplier: f32,
    /// Skinning weights at or below this are ignored when generating contacts.
    pub weight_threshold: f32,
    pub is_kinematic: bool,
}

impl SkinnedBone {
    #[must_use]
    pub const fn new(rigid_body: usize) -> Self {
        Self {
            rigid_body,
            vertex_to_bone: Affine3A::IDENTITY,
            margin_multiplier: 1.0,
            weight_threshold: 0.0,
            is_kinematic: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkinnedVertex {
    pub skin_pos: Vec3A,
    pub weights: [f32; BONES_PER_VERTEX],
    pub bone_indices: [u32; BONES_PER_VERTEX],
    pub flexible: f32,
}

impl SkinnedVertex {
    #[must_use]
    pub const fn new(skin_pos: Vec3A) -> Self {
        Self {
            skin_pos,
            weights: [0.0; BONES_PER_VERTEX],
            bone_indices: [0; BONES_PER_VERTEX],
            flexible: 1.0,
        }
    }

    /// Fills the first empty slot, or the lightest one if `weight` beats it.
    #[must_use]
    pub fn with_bone(mut self, bone: u32, weight: f32) -> Self {
        let slot = self
            .weights
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map_or(0, |(i, _)| i);

        if self.weights[slot] < weight {
            self.weights[slot] = weight;
            self.bone_indices[slot] = bone;
        }

        self
    }

    #[must_use]
    pub const fn with_flexible(mut self, flexible: f32) -> Self {
        self.flexible = flexible;
        self
    }
}

/// A deformable mesh whose vertices are skinned to rigid bodies, colliding through
/// per-vertex spheres and optionally per-face triangles.
pub struct SkinnedMeshBody {
    pub proxy_type: BroadphaseNativeTypes,
    pub skinned_bones: Vec<SkinnedBone>,
    pub vertices: Vec<SkinnedVertex>,
    /// World-space vertex positions from the last `internal_update`
    pub vpos: Vec<VertexPos>,
    pub shape: SkinnedMeshShape,
    pub tags: AHashSet<String>,
    pub can_collide_with_tags: AHashSet<String>,
    pub no_collide_with_tags: AHashSet<String>,
    /// Rigid bodies this body may touch. If empty, everything not in `no_collide_with_bone` is allowed.
    pub can_collide_with_bone: Vec<usize>,
    pub no_collide_with_bone: Vec<usize>,
    aabb: Aabb,
}

impl SkinnedMeshBody {
    pub fn new_per_vertex(
        skinned_bones: Vec<SkinnedBone>,
        vertices: Vec<SkinnedVertex>,
        shape_prop: VertexShapeProp,
    ) -> Result<Self, SkinnedMeshError> {
        validate_bones(&skinned_bones, &vertices)?;

        let vertex_shape = build_vertex_shape(&skinned_bones, &vertices, shape_prop);
        Ok(Self::from_parts(
            skinned_bones,
            vertices,
            SkinnedMeshShape::PerVertex(vertex_shape),
        ))
    }

    pub fn new_per_triangle(
        skinned_bones: Vec<SkinnedBone>,
        vertices: Vec<SkinnedVertex>,
        triangles: &[[u32; 3]],
        vertex_prop: VertexShapeProp,
        triangle_prop: TriangleShapeProp,
    ) -> Result<Self, SkinnedMeshError> {
        validate_bones(&skinned_bones, &vertices)?;

        for (triangle, ids) in triangles.iter().enumerate() {
            if let Some(&vertex) = ids.iter().find(|&&v| v as usize >= vertices.len()) {
                return Err(SkinnedMeshError::VertexOutOfRange {
                    triangle,
                    vertex: vertex as usize,
                    num_vertices: vertices.len(),
                });
            }
        }

        let mut builder = ColliderTreeBuilder::new(ColliderKind::Triangle);
        for ids in triangles {
            let flexible = ids
                .iter()
                .map(|&i| vertices[i as usize].flexible)
                .sum::<f32>()
                / 3.0;
            let collider = Collider::triangle(*ids, flexible);
            let (keys, is_kinematic) = collider_keys(&skinned_bones, &vertices, ids);
            builder.insert_collider(&keys, collider, is_kinematic);
        }

        let shape = PerTriangleShape {
            tree: builder.build(),
            shape_prop: triangle_prop,
            vertex_shape: build_vertex_shape(&skinned_bones, &vertices, vertex_prop),
        };

        Ok(Self::from_parts(
            skinned_bones,
            vertices,
            SkinnedMeshShape::PerTriangle(shape),
        ))
    }

    fn from_parts(
        skinned_bones: Vec<SkinnedBone>,
        vertices: Vec<SkinnedVertex>,
        shape: SkinnedMeshShape,
    ) -> Self {
        let vpos = vertices
            .iter()
            .map(|v| VertexPos::new(v.skin_pos, 1.0))
            .collect();

        let mut body = Self {
            proxy_type: BroadphaseNativeTypes::CustomConcaveShapeType,
            skinned_bones,
            vertices,
            vpos,
            shape,
            tags: AHashSet::new(),
            can_collide_with_tags: AHashSet::new(),
            no_collide_with_tags: AHashSet::new(),
            can_collide_with_bone: Vec::new(),
            no_collide_with_bone: Vec::new(),
            aabb: Aabb::INVALID,
        };
        body.update_shape();
        body
    }

    #[inline]
    #[must_use]
    pub const fn get_aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Skins every vertex with the current rigid body transforms, then refreshes all bounds.
    pub fn internal_update(&mut self, rigid_bodies: &[RigidBody]) -> Result<(), SkinnedMeshError> {
        let transforms = self
            .skinned_bones
            .iter()
            .enumerate()
            .map(|(bone, b)| {
                rigid_bodies
                    .get(b.rigid_body)
                    .map(|rb| *rb.get_world_transform() * b.vertex_to_bone)
                    .ok_or(SkinnedMeshError::RigidBodyOutOfRange {
                        bone,
                        rigid_body: b.rigid_body,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (v, out) in self.vertices.iter().zip(&mut self.vpos) {
            let mut pos = Vec3A::ZERO;
            let mut margin_multiplier = 0.0;
            let mut total_weight = 0.0;

            for (&bone, &weight) in v.bone_indices.iter().zip(&v.weights) {
                if weight <= 0.0 {
                    continue;
                }

                let bone = bone as usize;
                pos += transforms[bone].transform_point3a(v.skin_pos) * weight;
                margin_multiplier += self.skinned_bones[bone].margin_multiplier * weight;
                total_weight += weight;
            }

            *out = if total_weight > f32::EPSILON {
                VertexPos::new(pos / total_weight, margin_multiplier / total_weight)
            } else {
                VertexPos::new(v.skin_pos, 1.0)
            };
        }

        self.update_shape();
        Ok(())
    }

    fn update_shape(&mut self) {
        self.shape.internal_update(&self.vpos);
        self.aabb = self.shape.get_aabb();
    }

    fn accepts(&self, other: &Self) -> bool {
        if !self.can_collide_with_tags.is_empty() {
            return other
                .tags
                .iter()
                .any(|tag| self.can_collide_with_tags.contains(tag));
        }

        !other
            .tags
            .iter()
            .any(|tag| self.no_collide_with_tags.contains(tag))
    }

    /// Tag filter; both bodies have to accept each other.
    #[must_use]
    pub fn can_collide_with(&self, other: &Self) -> bool {
        self.accepts(other) && other.accepts(self)
    }

    #[must_use]
    pub fn can_collide_with_bone(&self, rigid_body: usize) -> bool {
        if !self.can_collide_with_bone.is_empty() {
            return self.can_collide_with_bone.contains(&rigid_body);
        }

        !self.no_collide_with_bone.contains(&rigid_body)
    }
}

fn validate_bones(
    skinned_bones: &[SkinnedBone],
    vertices: &[SkinnedVertex],
) -> Result<(), SkinnedMeshError> {
    if let Some((bone, b)) = skinned_bones
        .iter()
        .enumerate()
        .find(|(_, b)| b.weight_threshold < 0.0)
    {
        return Err(SkinnedMeshError::NegativeWeightThreshold {
            bone,
            threshold: b.weight_threshold,
        });
    }

    for (vertex, v) in vertices.iter().enumerate() {
        for (&bone, &weight) in v.bone_indices.iter().zip(&v.weights) {
            if weight > 0.0 && bone as usize >= skinned_bones.len() {
                return Err(SkinnedMeshError::BoneOutOfRange {
                    vertex,
                    bone: bone as usize,
                    num_bones: skinned_bones.len(),
                });
            }
        }
    }

    Ok(())
}

/// Sorted bones that really influence the given vertices, and whether all of them are kinematic.
fn collider_keys(
    skinned_bones: &[SkinnedBone],
    vertices: &[SkinnedVertex],
    ids: &[u32],
) -> (ArrayVec<u32, BONES_PER_TRIANGLE>, bool) {
    let mut keys = ArrayVec::new();
    for &id in ids {
        let v = &vertices[id as usize];
        for (&bone, &weight) in v.bone_indices.iter().zip(&v.weights) {
            if weight <= 0.0 || keys.contains(&bone) {
                continue;
            }

            if weight > skinned_bones[bone as usize].weight_threshold {
                keys.push(bone);
            }
        }
    }
    keys.sort_unstable();

    let is_kinematic =
        !keys.is_empty() && keys.iter().all(|&b| skinned_bones[b as usize].is_kinematic);
    (keys, is_kinematic)
}

fn build_vertex_shape(
    skinned_bones: &[SkinnedBone],
    vertices: &[SkinnedVertex],
    shape_prop: VertexShapeProp,
) -> PerVertexShape {
    let mut builder = ColliderTreeBuilder::new(ColliderKind::Sphere);
    for (i, v) in vertices.iter().enumerate() {
        let id = i as u32;
        let (keys, is_kinematic) = collider_keys(skinned_bones, vertices, &[id]);
        builder.insert_collider(&keys, Collider::sphere(id, v.flexible), is_kinematic);
    }

    let tree: ColliderTree = builder.build();
    PerVertexShape { tree, shape_prop }
}
