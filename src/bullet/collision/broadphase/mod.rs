mod broadphase_proxy;
mod collision_algorithm;

pub use broadphase_proxy::*;
pub use collision_algorithm::*;
