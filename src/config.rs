use crate::{
    consts::MAX_COLLISION_COUNT, error::ConfigError,
    skinned::check_algorithm::CollisionCheckAlgorithmType,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionConfig {
    /// Raw contacts kept per directional check of a body pair; the rest are dropped
    pub max_collision_count: usize,
    /// Which subtree-pair strategy to run. Both find the same contacts.
    pub algorithm: CollisionCheckAlgorithmType,
    /// Fan subtree pairs out to the thread pool once there are at least this many.
    /// If None, the size of the thread pool is used
    pub parallel_min_pairs: Option<usize>,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CollisionConfig {
    pub const DEFAULT: Self = Self {
        max_collision_count: MAX_COLLISION_COUNT,
        algorithm: CollisionCheckAlgorithmType::Refined,
        parallel_min_pairs: None,
    };

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_collision_count == 0 {
            return Err(ConfigError::ZeroCollisionCapacity);
        }

        if matches!(self.parallel_min_pairs, Some(0)) {
            return Err(ConfigError::ZeroParallelThreshold);
        }

        Ok(())
    }

    #[must_use]
    pub fn parallel_threshold(&self) -> usize {
        self.parallel_min_pairs
            .unwrap_or_else(rayon::current_num_threads)
    }
}
