use ahash::AHashMap;
use log::trace;

use crate::{
    bullet::{
        collision::{
            broadphase::{BroadphaseNativeTypes, CollisionAlgorithm},
            narrowphase::persistent_manifold::PersistentManifold,
        },
        dynamics::rigid_body::RigidBody,
    },
    skinned::body::SkinnedMeshBody,
};

/// Where collision algorithms put the manifolds they create.
pub trait ManifoldDispatcher {
    fn get_new_manifold(&mut self, body0_idx: usize, body1_idx: usize)
    -> &mut PersistentManifold;
}

impl ManifoldDispatcher for Vec<PersistentManifold> {
    fn get_new_manifold(
        &mut self,
        body0_idx: usize,
        body1_idx: usize,
    ) -> &mut PersistentManifold {
        self.push(PersistentManifold::new(body0_idx, body1_idx));
        let last = self.len() - 1;
        &mut self[last]
    }
}

type AlgorithmKey = (BroadphaseNativeTypes, BroadphaseNativeTypes);

#[derive(Default)]
pub struct CollisionDispatcher {
    algorithms: AHashMap<AlgorithmKey, Box<dyn CollisionAlgorithm>>,
    pub manifolds: Vec<PersistentManifold>,
}

impl ManifoldDispatcher for CollisionDispatcher {
    fn get_new_manifold(
        &mut self,
        body0_idx: usize,
        body1_idx: usize,
    ) -> &mut PersistentManifold {
        self.manifolds.get_new_manifold(body0_idx, body1_idx)
    }
}

impl CollisionDispatcher {
    /// Binds `algorithm` to every pair of objects with shape types `proxy_type0` and `proxy_type1`.
    /// A later registration for the same pair replaces the earlier one.
    pub fn register_collision_create_func(
        &mut self,
        proxy_type0: BroadphaseNativeTypes,
        proxy_type1: BroadphaseNativeTypes,
        algorithm: Box<dyn CollisionAlgorithm>,
    ) {
        self.algorithms.insert((proxy_type0, proxy_type1), algorithm);
    }

    #[must_use]
    pub fn has_algorithm(
        &self,
        proxy_type0: BroadphaseNativeTypes,
        proxy_type1: BroadphaseNativeTypes,
    ) -> bool {
        self.algorithms.contains_key(&(proxy_type0, proxy_type1))
    }

    pub fn clear_manifolds(&mut self) {
        self.manifolds.clear();
    }

    /// Runs the algorithm registered for this pair's shape types, if any.
    pub fn near_callback(
        &mut self,
        body0: &SkinnedMeshBody,
        body1: &SkinnedMeshBody,
        rigid_bodies: &[RigidBody],
    ) {
        let Self {
            algorithms,
            manifolds,
        } = self;

        let key = (body0.proxy_type, body1.proxy_type);
        let Some(algorithm) = algorithms.get_mut(&key) else {
            trace!("no collision algorithm registered for {key:?}");
            return;
        };

        algorithm.process_collision(body0, body1, rigid_bodies, manifolds);
    }

    /// Tests every pair of skinned bodies whose bounds overlap and whose tags allow it.
    pub fn dispatch_all_collision_pairs(
        &mut self,
        bodies: &[SkinnedMeshBody],
        rigid_bodies: &[RigidBody],
    ) {
        for (i, body0) in bodies.iter().enumerate() {
            for body1 in &bodies[i + 1..] {
                if !body0.get_aabb().intersects(body1.get_aabb()) {
                    continue;
                }

                if !body0.can_collide_with(body1) {
                    continue;
                }

                self.near_callback(body0, body1, rigid_bodies);
            }
        }
    }
}
