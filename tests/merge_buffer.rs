mod common;

use common::{EPS, rigid_bodies, sphere_body};
use skinned_mesh_collision::{
    PersistentManifold, SkinnedBone, SkinnedMeshBody, SkinnedVertex, VertexShapeProp,
    glam::Vec3A,
    skinned::{geometry::CollisionResult, merge_buffer::MergeBuffer, shape::ShapeRef},
};

fn contact(depth: f32) -> CollisionResult {
    CollisionResult {
        pos_a: Vec3A::new(0.0, 0.0, 1.0),
        pos_b: Vec3A::new(0.0, 0.0, 0.5),
        normal_on_b: Vec3A::Z,
        depth,
        collider_a: 0,
        collider_b: 0,
    }
}

fn merge(
    body_a: &SkinnedMeshBody,
    body_b: &SkinnedMeshBody,
    results: &[CollisionResult],
) -> MergeBuffer {
    let mut merge = MergeBuffer::default();
    merge.alloc(body_a.skinned_bones.len(), body_b.skinned_bones.len());
    merge.do_merge(
        body_a,
        ShapeRef::Vertex(body_a.shape.as_per_vertex_shape()),
        body_b,
        ShapeRef::Vertex(body_b.shape.as_per_vertex_shape()),
        results,
    );
    merge
}

fn single_vertex_body(vertex: SkinnedVertex, bones: Vec<SkinnedBone>) -> SkinnedMeshBody {
    SkinnedMeshBody::new_per_vertex(bones, vec![vertex], VertexShapeProp { margin: 1.0 }).unwrap()
}

#[test]
fn single_contact_round_trips_through_merge() {
    let a = sphere_body(&[Vec3A::ZERO], 1.0, 0);
    let b = sphere_body(&[Vec3A::new(0.0, 0.0, 1.5)], 1.0, 1);

    let merge = merge(&a, &b, &[contact(-0.5)]);
    assert_eq!(merge.num_bones(), (1, 1));
    let cell = merge.get(0, 0);
    assert!((cell.weight - 0.25).abs() < EPS);

    let mut manifolds: Vec<PersistentManifold> = Vec::new();
    merge.apply(&a, &b, &rigid_bodies(2), &mut manifolds);

    assert_eq!(manifolds.len(), 1);
    let point = &manifolds[0].point_cache[0];
    assert!((point.distance_1 + 0.5).abs() < EPS);
    assert!(point.normal_world_on_b.abs_diff_eq(Vec3A::Z, EPS));
    assert!(point.position_world_on_a.abs_diff_eq(Vec3A::new(0.0, 0.0, 1.0), EPS));
    assert!(point.position_world_on_b.abs_diff_eq(Vec3A::new(0.0, 0.0, 0.5), EPS));
}

#[test]
fn deeper_contacts_dominate_the_average() {
    let a = sphere_body(&[Vec3A::ZERO], 1.0, 0);
    let b = sphere_body(&[Vec3A::new(0.0, 0.0, 1.5)], 1.0, 1);

    let deep = contact(-0.6);
    let shallow = CollisionResult {
        normal_on_b: Vec3A::X,
        ..contact(-0.2)
    };

    let merge = merge(&a, &b, &[deep, shallow]);
    let mut manifolds: Vec<PersistentManifold> = Vec::new();
    merge.apply(&a, &b, &rigid_bodies(2), &mut manifolds);

    let point = &manifolds[0].point_cache[0];
    assert!(point.normal_world_on_b.z > point.normal_world_on_b.x * 5.0);
    assert!((point.normal_world_on_b.length() - 1.0).abs() < EPS);
    assert!(point.distance_1 < -0.2 && point.distance_1 > -0.6);
}

#[test]
fn merge_stops_at_non_penetrating_results() {
    let a = sphere_body(&[Vec3A::ZERO], 1.0, 0);
    let b = sphere_body(&[Vec3A::new(0.0, 0.0, 1.5)], 1.0, 1);

    let merge = merge(&a, &b, &[contact(0.0), contact(-0.5)]);
    assert_eq!(merge.get(0, 0).weight, 0.0);
}

#[test]
fn rigid_pairs_are_not_merged() {
    let a = single_vertex_body(
        SkinnedVertex::new(Vec3A::ZERO)
            .with_bone(0, 1.0)
            .with_flexible(0.0),
        vec![SkinnedBone::new(0)],
    );
    let b = single_vertex_body(
        SkinnedVertex::new(Vec3A::Z)
            .with_bone(0, 1.0)
            .with_flexible(0.0),
        vec![SkinnedBone::new(1)],
    );

    let merge = merge(&a, &b, &[contact(-0.5)]);
    assert_eq!(merge.get(0, 0).weight, 0.0);
}

#[test]
fn weights_at_threshold_contribute_nothing() {
    let mut light = SkinnedBone::new(0);
    light.weight_threshold = 0.5;
    let heavy = SkinnedBone::new(1);

    let a = single_vertex_body(
        SkinnedVertex::new(Vec3A::ZERO)
            .with_bone(0, 0.5)
            .with_bone(1, 0.5),
        vec![light, heavy],
    );
    let b = sphere_body(&[Vec3A::new(0.0, 0.0, 1.5)], 1.0, 2);

    let merge = merge(&a, &b, &[contact(-0.5)]);
    assert_eq!(merge.get(0, 0).weight, 0.0);
    assert!(merge.get(1, 0).weight > 0.0);

    let mut manifolds: Vec<PersistentManifold> = Vec::new();
    merge.apply(&a, &b, &rigid_bodies(3), &mut manifolds);
    assert_eq!(manifolds.len(), 1);
    assert_eq!((manifolds[0].body0_idx, manifolds[0].body1_idx), (1, 2));
}

#[test]
fn kinematic_bone_pairs_produce_nothing() {
    let mut kinematic = SkinnedBone::new(0);
    kinematic.is_kinematic = true;
    let dynamic = SkinnedBone::new(1);

    let a = single_vertex_body(
        SkinnedVertex::new(Vec3A::ZERO)
            .with_bone(0, 0.6)
            .with_bone(1, 0.4),
        vec![kinematic.clone(), dynamic],
    );

    let mut other = kinematic;
    other.rigid_body = 2;
    let b = single_vertex_body(
        SkinnedVertex::new(Vec3A::new(0.0, 0.0, 1.5)).with_bone(0, 1.0),
        vec![other],
    );

    let merge = merge(&a, &b, &[contact(-0.5)]);
    assert_eq!(merge.get(0, 0).weight, 0.0);
    assert!(merge.get(1, 0).weight > 0.0);

    let mut manifolds: Vec<PersistentManifold> = Vec::new();
    merge.apply(&a, &b, &rigid_bodies(3), &mut manifolds);
    assert_eq!(manifolds.len(), 1);
    assert_eq!(manifolds[0].body0_idx, 1);
}

#[test]
fn apply_skips_same_rigid_body_and_refused_bones() {
    let a = sphere_body(&[Vec3A::ZERO], 1.0, 0);
    let same = sphere_body(&[Vec3A::new(0.0, 0.0, 1.5)], 1.0, 0);

    let mut manifolds: Vec<PersistentManifold> = Vec::new();
    merge(&a, &same, &[contact(-0.5)]).apply(&a, &same, &rigid_bodies(1), &mut manifolds);
    assert!(manifolds.is_empty());

    let mut refusing = sphere_body(&[Vec3A::ZERO], 1.0, 0);
    refusing.no_collide_with_bone.push(1);
    let b = sphere_body(&[Vec3A::new(0.0, 0.0, 1.5)], 1.0, 1);
    merge(&refusing, &b, &[contact(-0.5)]).apply(
        &refusing,
        &b,
        &rigid_bodies(2),
        &mut manifolds,
    );
    assert!(manifolds.is_empty());

    let mut picky = sphere_body(&[Vec3A::ZERO], 1.0, 0);
    picky.can_collide_with_bone.push(5);
    merge(&picky, &b, &[contact(-0.5)]).apply(&picky, &b, &rigid_bodies(2), &mut manifolds);
    assert!(manifolds.is_empty());

    picky.can_collide_with_bone.push(1);
    merge(&picky, &b, &[contact(-0.5)]).apply(&picky, &b, &rigid_bodies(2), &mut manifolds);
    assert_eq!(manifolds.len(), 1);
}

#[test]
fn apply_combines_surface_properties() {
    let a = sphere_body(&[Vec3A::ZERO], 1.0, 0);
    let b = sphere_body(&[Vec3A::new(0.0, 0.0, 1.5)], 1.0, 1);

    let mut rigid_bodies = rigid_bodies(2);
    rigid_bodies[0].friction = 0.5;
    rigid_bodies[1].friction = 0.8;
    rigid_bodies[0].restitution = 0.2;
    rigid_bodies[1].restitution = 0.5;
    rigid_bodies[0].rolling_friction = 0.1;
    rigid_bodies[1].rolling_friction = 0.3;

    let mut manifolds: Vec<PersistentManifold> = Vec::new();
    merge(&a, &b, &[contact(-0.5)]).apply(&a, &b, &rigid_bodies, &mut manifolds);

    let point = &manifolds[0].point_cache[0];
    assert!((point.combined_friction - 0.4).abs() < EPS);
    assert!((point.combined_restitution - 0.1).abs() < EPS);
    assert!((point.combined_rolling_friction - 0.03).abs() < EPS);
}

#[test]
fn missing_rigid_bodies_are_skipped() {
    let a = sphere_body(&[Vec3A::ZERO], 1.0, 0);
    let b = sphere_body(&[Vec3A::new(0.0, 0.0, 1.5)], 1.0, 7);

    let mut manifolds: Vec<PersistentManifold> = Vec::new();
    merge(&a, &b, &[contact(-0.5)]).apply(&a, &b, &rigid_bodies(2), &mut manifolds);
    assert!(manifolds.is_empty());
}
