pub mod manifold_point;
pub mod persistent_manifold;
