use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;

use crate::{
    bullet::linear_math::aabb_util_2::Aabb,
    config::CollisionConfig,
    skinned::{
        checker::{CollisionChecker, CollisionResultBuffer},
        collider_tree::{ColliderTree, ColliderTreeNode, NodePair},
        geometry::CollisionResult,
    },
};

/// How the colliders of one subtree pair are narrowed down before the exact tests.
/// Both strategies find the same deepest contact; they only differ in how much work it takes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CollisionCheckAlgorithmType {
    /// Shrinks both candidate lists with two passes of bounding box refinement.
    /// Best when subtrees hold many colliders.
    #[default]
    Refined,
    /// Caches the colliders of the smaller side that touch the other node,
    /// then walks the larger side against that list.
    Legacy,
}

/// Candidate collider lists reused between subtree pairs.
#[derive(Clone, Debug, Default)]
pub struct ColliderScratch {
    list_a: Vec<usize>,
    list_b: Vec<usize>,
}

/// Everything one directional check reuses between calls.
///
/// Parallel runs give each pool thread its own `ColliderScratch`, indexed by
/// `rayon::current_thread_index`, so the lists keep their capacity across calls on both paths.
#[derive(Debug, Default)]
pub struct CheckScratch {
    pairs: Vec<NodePair>,
    colliders: ColliderScratch,
    workers: Vec<Mutex<ColliderScratch>>,
}

impl CheckScratch {
    /// Subtree pairs found by the last broad phase.
    #[must_use]
    pub fn pairs(&self) -> &[NodePair] {
        &self.pairs
    }

    /// Per-thread scratch lists allocated by parallel runs so far.
    #[must_use]
    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }
}

/// One directional check: every sphere of `c0` against every collider of `c1`.
pub struct CollisionCheckAlgorithm<'a, C: CollisionChecker> {
    checker: &'a C,
    c0: &'a ColliderTree,
    c1: &'a ColliderTree,
    results: &'a CollisionResultBuffer,
    algorithm: CollisionCheckAlgorithmType,
    parallel_threshold: usize,
}

impl<'a, C: CollisionChecker> CollisionCheckAlgorithm<'a, C> {
    #[must_use]
    pub fn new(
        checker: &'a C,
        c0: &'a ColliderTree,
        c1: &'a ColliderTree,
        results: &'a CollisionResultBuffer,
        config: &CollisionConfig,
    ) -> Self {
        Self {
            checker,
            c0,
            c1,
            results,
            algorithm: config.algorithm,
            parallel_threshold: config.parallel_threshold(),
        }
    }

    /// Runs the broad phase, then the exact tests for every subtree pair found,
    /// storing at most one result per pair.
    ///
    /// Returns the number of subtree pairs checked.
    pub fn run(&self, scratch: &mut CheckScratch) -> usize {
        let CheckScratch {
            pairs,
            colliders,
            workers,
        } = scratch;

        pairs.clear();
        self.c0.check_collision_l(self.c1, pairs);

        if pairs.len() >= self.parallel_threshold {
            let num_threads = rayon::current_num_threads();
            if workers.len() < num_threads {
                workers.resize_with(num_threads, Default::default);
            }

            let workers = &*workers;
            pairs.par_iter().for_each(|&(a, b)| {
                // Each pool thread keeps to its own slot, so the lock is uncontended
                let index = rayon::current_thread_index().unwrap_or(0) % workers.len();
                let mut scratch = workers[index]
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                self.check_pair(a, b, &mut scratch);
            });
        } else {
            for &(a, b) in pairs.iter() {
                self.check_pair(a, b, colliders);
            }
        }

        pairs.len()
    }

    fn check_pair(&self, a: usize, b: usize, scratch: &mut ColliderScratch) {
        if self.results.is_full() {
            return;
        }

        let node_a = self.c0.node(a);
        let node_b = self.c1.node(b);

        // Kinematic colliders never need to meet kinematic colliders
        let size_a = if node_b.is_kinematic {
            node_a.dyn_collider
        } else {
            node_a.num_collider
        };
        let size_b = if node_a.is_kinematic {
            node_b.dyn_collider
        } else {
            node_b.num_collider
        };

        if size_a == 0 || size_b == 0 {
            return;
        }

        let res = match self.algorithm {
            CollisionCheckAlgorithmType::Refined => {
                self.check_refined(node_a, size_a, node_b, size_b, scratch)
            }
            CollisionCheckAlgorithmType::Legacy => {
                self.check_legacy(node_a, size_a, node_b, size_b, scratch)
            }
        };

        if let Some(res) = res {
            let res = if self.checker.swap_results() {
                res.swapped()
            } else {
                res
            };
            self.results.add_result(res);
        }
    }

    /// Exact test by indices local to the two nodes. The first result found is only replaced by a strictly deeper one.
    #[inline]
    fn test(
        &self,
        node_a: &ColliderTreeNode,
        i: usize,
        node_b: &ColliderTreeNode,
        j: usize,
        deepest: &mut Option<CollisionResult>,
    ) {
        let Some(res) = self
            .checker
            .check_collide(node_a.start + i, node_b.start + j)
        else {
            return;
        };

        if deepest.is_none_or(|d| res.depth < d.depth) {
            *deepest = Some(res);
        }
    }

    fn check_refined(
        &self,
        node_a: &ColliderTreeNode,
        size_a: usize,
        node_b: &ColliderTreeNode,
        size_b: usize,
        scratch: &mut ColliderScratch,
    ) -> Option<CollisionResult> {
        let ColliderScratch { list_a, list_b } = scratch;
        list_a.clear();
        list_b.clear();

        let aabbs_a = &self.c0.aabbs()[node_a.start..node_a.start + size_a];
        let aabbs_b = &self.c1.aabbs()[node_b.start..node_b.start + size_b];

        let mut aabb_a = Aabb::INVALID;
        for (i, aabb) in aabbs_a.iter().enumerate() {
            if aabb.intersects(&node_b.aabb_me) {
                list_a.push(i);
                aabb_a += *aabb;
            }
        }

        if list_a.is_empty() {
            return None;
        }

        let mut aabb_b = Aabb::INVALID;
        for (j, aabb) in aabbs_b.iter().enumerate() {
            if aabb.intersects(&aabb_a) {
                list_b.push(j);
                aabb_b += *aabb;
            }
        }

        if list_b.is_empty() {
            return None;
        }

        list_a.retain(|&i| aabbs_a[i].intersects(&aabb_b));

        let mut deepest = None;
        for &i in list_a.iter() {
            for &j in list_b.iter() {
                if aabbs_a[i].intersects(&aabbs_b[j]) {
                    self.test(node_a, i, node_b, j, &mut deepest);
                }
            }
        }

        deepest
    }

    fn check_legacy(
        &self,
        node_a: &ColliderTreeNode,
        size_a: usize,
        node_b: &ColliderTreeNode,
        size_b: usize,
        scratch: &mut ColliderScratch,
    ) -> Option<CollisionResult> {
        let list = &mut scratch.list_a;
        list.clear();

        let aabbs_a = &self.c0.aabbs()[node_a.start..node_a.start + size_a];
        let aabbs_b = &self.c1.aabbs()[node_b.start..node_b.start + size_b];

        let mut deepest = None;
        if size_a > size_b {
            list.extend(
                aabbs_b
                    .iter()
                    .enumerate()
                    .filter(|(_, aabb)| aabb.intersects(&node_a.aabb_me))
                    .map(|(j, _)| j),
            );

            for (i, aabb) in aabbs_a.iter().enumerate() {
                if !aabb.intersects(&node_b.aabb_me) {
                    continue;
                }

                for &j in list.iter() {
                    if aabb.intersects(&aabbs_b[j]) {
                        self.test(node_a, i, node_b, j, &mut deepest);
                    }
                }
            }
        } else {
            list.extend(
                aabbs_a
                    .iter()
                    .enumerate()
                    .filter(|(_, aabb)| aabb.intersects(&node_b.aabb_me))
                    .map(|(i, _)| i),
            );

            for (j, aabb) in aabbs_b.iter().enumerate() {
                if !aabb.intersects(&node_a.aabb_me) {
                    continue;
                }

                for &i in list.iter() {
                    if aabb.intersects(&aabbs_a[i]) {
                        self.test(node_a, i, node_b, j, &mut deepest);
                    }
                }
            }
        }

        deepest
    }
}
