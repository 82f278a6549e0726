use crate::{
    bullet::{
        collision::dispatch::collision_dispatcher::ManifoldDispatcher,
        dynamics::rigid_body::RigidBody,
    },
    skinned::body::SkinnedMeshBody,
};

pub trait CollisionAlgorithm: Send {
    /// Writes zero or more contact points into manifolds obtained from `dispatcher`.
    fn process_collision(
        &mut self,
        body0: &SkinnedMeshBody,
        body1: &SkinnedMeshBody,
        rigid_bodies: &[RigidBody],
        dispatcher: &mut dyn ManifoldDispatcher,
    );
}
