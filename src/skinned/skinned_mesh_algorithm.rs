use log::{debug, trace};

use crate::{
    bullet::{
        collision::{
            broadphase::{BroadphaseNativeTypes, CollisionAlgorithm},
            dispatch::collision_dispatcher::{CollisionDispatcher, ManifoldDispatcher},
        },
        dynamics::rigid_body::RigidBody,
    },
    config::CollisionConfig,
    error::ConfigError,
    skinned::{
        body::SkinnedMeshBody,
        check_algorithm::{CheckScratch, CollisionCheckAlgorithm},
        checker::{CollisionResultBuffer, CpuCollisionChecker},
        merge_buffer::MergeBuffer,
        shape::{PerVertexShape, ShapeRef, SkinnedMeshShape},
    },
};

/// Contact generation between two skinned mesh bodies.
///
/// Owns every buffer the pipeline needs, so repeated calls don't allocate once warmed up.
pub struct SkinnedMeshAlgorithm {
    config: CollisionConfig,
    results: CollisionResultBuffer,
    merge: MergeBuffer,
    scratch: CheckScratch,
}

impl SkinnedMeshAlgorithm {
    pub fn new(config: CollisionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            config,
            results: CollisionResultBuffer::with_capacity(config.max_collision_count),
            merge: MergeBuffer::default(),
            scratch: CheckScratch::default(),
        })
    }

    /// Makes `dispatcher` use a new instance of this algorithm for every pair of skinned bodies.
    pub fn register_algorithm(
        dispatcher: &mut CollisionDispatcher,
        config: CollisionConfig,
    ) -> Result<(), ConfigError> {
        dispatcher.register_collision_create_func(
            BroadphaseNativeTypes::CustomConcaveShapeType,
            BroadphaseNativeTypes::CustomConcaveShapeType,
            Box::new(Self::new(config)?),
        );

        Ok(())
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Runs every directional check the two shapes call for, merges the results per bone pair,
    /// then writes the merged contacts into manifolds from `dispatcher`.
    pub fn process_collision(
        &mut self,
        body0: &SkinnedMeshBody,
        body1: &SkinnedMeshBody,
        rigid_bodies: &[RigidBody],
        dispatcher: &mut dyn ManifoldDispatcher,
    ) {
        self.merge
            .alloc(body0.skinned_bones.len(), body1.skinned_bones.len());

        match (&body0.shape, &body1.shape) {
            (SkinnedMeshShape::PerTriangle(t0), SkinnedMeshShape::PerTriangle(t1)) => {
                self.check_and_merge(
                    body0,
                    ShapeRef::Triangle(t0),
                    body1,
                    &t1.vertex_shape,
                    false,
                );
                self.check_and_merge(
                    body1,
                    ShapeRef::Triangle(t1),
                    body0,
                    &t0.vertex_shape,
                    true,
                );
            }
            (SkinnedMeshShape::PerTriangle(t0), SkinnedMeshShape::PerVertex(v1)) => {
                self.check_and_merge(body0, ShapeRef::Triangle(t0), body1, v1, false);
            }
            (SkinnedMeshShape::PerVertex(v0), SkinnedMeshShape::PerTriangle(t1)) => {
                self.check_and_merge(body1, ShapeRef::Triangle(t1), body0, v0, true);
            }
            (SkinnedMeshShape::PerVertex(v0), SkinnedMeshShape::PerVertex(v1)) => {
                self.check_and_merge(body1, ShapeRef::Vertex(v1), body0, v0, true);
            }
        }

        self.merge.apply(body0, body1, rigid_bodies, dispatcher);
        self.merge.release();
    }

    /// Checks the spheres of `sphere_body` against `other`, then merges the results.
    ///
    /// The merge always sees body0 as A. `sphere_is_body0` says which of the two
    /// bodies the spheres belong to, so results are swapped only when `other` is body0.
    fn check_and_merge(
        &mut self,
        other_body: &SkinnedMeshBody,
        other: ShapeRef<'_>,
        sphere_body: &SkinnedMeshBody,
        spheres: &PerVertexShape,
        sphere_is_body0: bool,
    ) {
        let Self {
            config,
            results,
            merge,
            scratch,
        } = self;

        results.reset();

        let checker = CpuCollisionChecker::new(
            spheres,
            &sphere_body.vpos,
            other,
            &other_body.vpos,
            !sphere_is_body0,
        );
        let num_pairs =
            CollisionCheckAlgorithm::new(&checker, &spheres.tree, other.tree(), results, config)
                .run(scratch);

        if results.attempted() > results.len() {
            debug!(
                "dropped {} of {} contacts over the capacity of {}",
                results.attempted() - results.len(),
                results.attempted(),
                results.capacity()
            );
        }

        let sorted = results.sorted_results();
        trace!(
            "{num_pairs} subtree pairs produced {} contacts against {:?} colliders",
            sorted.len(),
            other.kind()
        );

        if sphere_is_body0 {
            merge.do_merge(sphere_body, ShapeRef::Vertex(spheres), other_body, other, &sorted);
        } else {
            merge.do_merge(other_body, other, sphere_body, ShapeRef::Vertex(spheres), &sorted);
        }
    }
}

impl CollisionAlgorithm for SkinnedMeshAlgorithm {
    fn process_collision(
        &mut self,
        body0: &SkinnedMeshBody,
        body1: &SkinnedMeshBody,
        rigid_bodies: &[RigidBody],
        dispatcher: &mut dyn ManifoldDispatcher,
    ) {
        Self::process_collision(self, body0, body1, rigid_bodies, dispatcher);
    }
}
