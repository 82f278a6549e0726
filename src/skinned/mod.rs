pub mod body;
pub mod check_algorithm;
pub mod checker;
pub mod collider;
pub mod collider_tree;
pub mod geometry;
pub mod merge_buffer;
pub mod shape;
pub mod skinned_mesh_algorithm;
