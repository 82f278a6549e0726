use std::sync::{
    OnceLock,
    atomic::{AtomicUsize, Ordering},
};

use crate::skinned::{
    collider::{Collider, ColliderKind, VertexPos},
    collider_tree::ColliderTree,
    geometry::{CheckTriangle, CollisionResult, check_sphere_sphere, check_sphere_triangle},
    shape::{PerVertexShape, ShapeRef},
};

/// Fixed-capacity result storage shared by all workers of one check.
///
/// Workers reserve slots with a single atomic bump cursor. Once the capacity is reached,
/// further results are dropped instead of stored; nothing ever blocks or retries.
pub struct CollisionResultBuffer {
    slots: Box<[OnceLock<CollisionResult>]>,
    num_results: AtomicUsize,
}

impl CollisionResultBuffer {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| OnceLock::new()).collect(),
            num_results: AtomicUsize::new(0),
        }
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Results offered so far, including dropped ones.
    #[inline]
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.num_results.load(Ordering::Relaxed)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.attempted().min(self.capacity())
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.attempted() >= self.capacity()
    }

    /// Returns false if the buffer was already full and `res` was dropped.
    pub fn add_result(&self, res: CollisionResult) -> bool {
        let p = self.num_results.fetch_add(1, Ordering::Relaxed);
        let Some(slot) = self.slots.get(p) else {
            return false;
        };

        let stored = slot.set(res).is_ok();
        debug_assert!(stored, "result slot {p} written twice");
        stored
    }

    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.take();
        }
        *self.num_results.get_mut() = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollisionResult> {
        self.slots[..self.len()].iter().filter_map(OnceLock::get)
    }

    /// Stored results, deepest first.
    #[must_use]
    pub fn sorted_results(&self) -> Vec<CollisionResult> {
        let mut results: Vec<_> = self.iter().copied().collect();
        results.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        results
    }
}

/// The exact test for one collider of A against one collider of B, by index into their trees.
///
/// A is always a per-vertex sphere shape. Backends other than the CPU one only need to provide this.
pub trait CollisionChecker: Sync {
    fn check_collide(&self, a: usize, b: usize) -> Option<CollisionResult>;

    /// Whether results must be swapped to A/B order before they are stored.
    fn swap_results(&self) -> bool;
}

pub struct CpuCollisionChecker<'a> {
    v0: &'a [VertexPos],
    v1: &'a [VertexPos],
    c0: &'a ColliderTree,
    c1: &'a ColliderTree,
    margin0: f32,
    margin1: f32,
    penetration1: f32,
    /// Collider kind of B, which picks the exact test
    kind: ColliderKind,
    swap_results: bool,
}

impl<'a> CpuCollisionChecker<'a> {
    /// `swap_results` is set when the caller's A is the triangle side and this check runs sphere-first.
    #[must_use]
    pub fn new(
        a: &'a PerVertexShape,
        v0: &'a [VertexPos],
        b: ShapeRef<'a>,
        v1: &'a [VertexPos],
        swap_results: bool,
    ) -> Self {
        let (margin1, penetration1) = match b {
            ShapeRef::Vertex(shape) => (shape.shape_prop.margin, 0.0),
            ShapeRef::Triangle(shape) => (shape.shape_prop.margin, shape.shape_prop.penetration),
        };

        Self {
            v0,
            v1,
            c0: &a.tree,
            c1: b.tree(),
            margin0: a.shape_prop.margin,
            margin1,
            penetration1,
            kind: b.kind(),
            swap_results,
        }
    }

    fn check_sphere_sphere(&self, a: &Collider, b: &Collider) -> Option<CollisionResult> {
        let s0 = self.v0[a.vertex()];
        let s1 = self.v1[b.vertex()];
        check_sphere_sphere(
            s0.pos,
            s1.pos,
            s0.margin_multiplier * self.margin0,
            s1.margin_multiplier * self.margin1,
        )
    }

    fn check_sphere_triangle(&self, a: &Collider, b: &Collider) -> Option<CollisionResult> {
        let s = self.v0[a.vertex()];
        let [p0, p1, p2] = b.vertices.map(|i| self.v1[i as usize]);

        let multiplier = (p0.margin_multiplier + p1.margin_multiplier + p2.margin_multiplier) / 3.0;
        let tri = CheckTriangle::new(
            p0.pos,
            p1.pos,
            p2.pos,
            self.margin1 * multiplier,
            self.penetration1 * multiplier,
        );

        check_sphere_triangle(s.pos, s.margin_multiplier * self.margin0, &tri)
    }
}

impl CollisionChecker for CpuCollisionChecker<'_> {
    fn check_collide(&self, a: usize, b: usize) -> Option<CollisionResult> {
        let (ca, cb) = (&self.c0.colliders()[a], &self.c1.colliders()[b]);
        let res = match self.kind {
            ColliderKind::Sphere => self.check_sphere_sphere(ca, cb),
            ColliderKind::Triangle => self.check_sphere_triangle(ca, cb),
        }?;
        Some(CollisionResult {
            collider_a: a,
            collider_b: b,
            ..res
        })
    }

    #[inline]
    fn swap_results(&self) -> bool {
        self.swap_results
    }
}
