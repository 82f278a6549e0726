#![allow(unused)]

use fastrand::Rng;
use skinned_mesh_collision::{
    CollisionConfig, CollisionDispatcher, PersistentManifold, RigidBody,
    RigidBodyConstructionInfo, SkinnedBone, SkinnedMeshAlgorithm, SkinnedMeshBody, SkinnedVertex,
    TriangleShapeProp, VertexShapeProp,
    glam::{Affine3A, Vec3A},
};

pub const EPS: f32 = 1e-5;

pub fn rigid_bodies(count: usize) -> Vec<RigidBody> {
    (0..count)
        .map(|_| RigidBody::new(RigidBodyConstructionInfo::new(Affine3A::IDENTITY)))
        .collect()
}

/// Vertices fully skinned to bone 0.
pub fn rigid_vertices(points: &[Vec3A], flexible: f32) -> Vec<SkinnedVertex> {
    points
        .iter()
        .map(|&p| {
            SkinnedVertex::new(p)
                .with_bone(0, 1.0)
                .with_flexible(flexible)
        })
        .collect()
}

pub fn sphere_body(points: &[Vec3A], radius: f32, rigid_body: usize) -> SkinnedMeshBody {
    SkinnedMeshBody::new_per_vertex(
        vec![SkinnedBone::new(rigid_body)],
        rigid_vertices(points, 1.0),
        VertexShapeProp { margin: radius },
    )
    .unwrap()
}

pub fn triangle_body(
    points: &[Vec3A],
    triangles: &[[u32; 3]],
    triangle_prop: TriangleShapeProp,
    rigid_body: usize,
) -> SkinnedMeshBody {
    SkinnedMeshBody::new_per_triangle(
        vec![SkinnedBone::new(rigid_body)],
        rigid_vertices(points, 1.0),
        triangles,
        VertexShapeProp { margin: 0.1 },
        triangle_prop,
    )
    .unwrap()
}

pub fn rand_vec(rng: &mut Rng, min: f32, max: f32) -> Vec3A {
    let size = max - min;
    Vec3A::new(rng.f32(), rng.f32(), rng.f32()) * size + min
}

/// `count` random vertices, vertex `i` skinned mostly to bone `i % num_bones` and partly to the next one.
pub fn random_vertices(
    rng: &mut Rng,
    count: usize,
    num_bones: u32,
    min: f32,
    max: f32,
) -> Vec<SkinnedVertex> {
    (0..count)
        .map(|i| {
            let bone = i as u32 % num_bones;
            SkinnedVertex::new(rand_vec(rng, min, max))
                .with_bone(bone, 0.7)
                .with_bone((bone + 1) % num_bones, 0.3)
                .with_flexible(0.5 + rng.f32() * 0.5)
        })
        .collect()
}

/// Bones driven by rigid bodies `first..first + count`.
pub fn bones(first: usize, count: usize) -> Vec<SkinnedBone> {
    (first..first + count).map(SkinnedBone::new).collect()
}

pub fn run_pair(
    config: CollisionConfig,
    body0: &SkinnedMeshBody,
    body1: &SkinnedMeshBody,
    rigid_bodies: &[RigidBody],
) -> Vec<PersistentManifold> {
    let mut algorithm = SkinnedMeshAlgorithm::new(config).unwrap();
    let mut manifolds: Vec<PersistentManifold> = Vec::new();
    algorithm.process_collision(body0, body1, rigid_bodies, &mut manifolds);
    manifolds
}

pub fn assert_manifolds_match(a: &[PersistentManifold], b: &[PersistentManifold], tolerance: f32) {
    assert_eq!(a.len(), b.len());

    for (ma, mb) in a.iter().zip(b) {
        assert_eq!(ma.body0_idx, mb.body0_idx);
        assert_eq!(ma.body1_idx, mb.body1_idx);
        assert_eq!(ma.get_num_contacts(), mb.get_num_contacts());

        for (pa, pb) in ma.point_cache.iter().zip(&mb.point_cache) {
            assert!(
                pa.position_world_on_a
                    .abs_diff_eq(pb.position_world_on_a, tolerance),
                "{pa:?} != {pb:?}"
            );
            assert!(
                pa.position_world_on_b
                    .abs_diff_eq(pb.position_world_on_b, tolerance),
                "{pa:?} != {pb:?}"
            );
            assert!(
                pa.normal_world_on_b
                    .abs_diff_eq(pb.normal_world_on_b, tolerance),
                "{pa:?} != {pb:?}"
            );
            assert!((pa.distance_1 - pb.distance_1).abs() <= tolerance);
        }
    }
}
