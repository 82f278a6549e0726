/// Upper bound on raw contacts kept per directional check of a body pair.
/// Contacts found beyond this are dropped.
pub const MAX_COLLISION_COUNT: usize = 256;

/// Bones that may skin a single vertex.
pub const BONES_PER_VERTEX: usize = 4;

/// Bones that may influence a triangle collider (the union over its three vertices).
pub const BONES_PER_TRIANGLE: usize = BONES_PER_VERTEX * 3;
