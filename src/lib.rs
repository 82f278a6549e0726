pub use ahash;
pub use glam;

pub mod bullet;
pub mod config;
pub mod consts;
pub mod error;
pub mod logging;
pub mod skinned;

pub use bullet::{
    collision::{
        broadphase::{BroadphaseNativeTypes, CollisionAlgorithm},
        dispatch::collision_dispatcher::{CollisionDispatcher, ManifoldDispatcher},
        narrowphase::{manifold_point::ManifoldPoint, persistent_manifold::PersistentManifold},
    },
    dynamics::rigid_body::{RigidBody, RigidBodyConstructionInfo},
    linear_math::aabb_util_2::Aabb,
};
pub use config::CollisionConfig;
pub use error::{ConfigError, SkinnedMeshError};
pub use skinned::{
    body::{SkinnedBone, SkinnedMeshBody, SkinnedVertex},
    check_algorithm::CollisionCheckAlgorithmType,
    collider::{TriangleShapeProp, VertexShapeProp},
    skinned_mesh_algorithm::SkinnedMeshAlgorithm,
};
