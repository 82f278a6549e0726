use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_collision_count must be greater than zero")]
    ZeroCollisionCapacity,
    #[error("parallel_min_pairs must be greater than zero when set")]
    ZeroParallelThreshold,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SkinnedMeshError {
    #[error("vertex {vertex} references bone {bone}, but the body only has {num_bones} bones")]
    BoneOutOfRange {
        vertex: usize,
        bone: usize,
        num_bones: usize,
    },
    #[error("triangle {triangle} references vertex {vertex}, but the body only has {num_vertices} vertices")]
    VertexOutOfRange {
        triangle: usize,
        vertex: usize,
        num_vertices: usize,
    },
    #[error("bone {bone} is attached to rigid body {rigid_body}, which does not exist")]
    RigidBodyOutOfRange { bone: usize, rigid_body: usize },
    #[error("bone {bone} has a negative weight threshold ({threshold})")]
    NegativeWeightThreshold { bone: usize, threshold: f32 },
}
