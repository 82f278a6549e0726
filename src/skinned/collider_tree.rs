use std::ops::Range;

use crate::{
    bullet::linear_math::aabb_util_2::Aabb,
    skinned::collider::{Collider, ColliderKind, VertexPos},
};

/// A subtree pair `(node in self, node in other)` reported by the broad phase.
pub type NodePair = (usize, usize);

#[derive(Clone, Debug)]
pub struct ColliderTreeNode {
    /// Bone index this node adds to its parent's key path. `None` for the root.
    pub key: Option<u32>,
    pub children: Vec<usize>,
    /// Offset of this node's colliders in the tree's collider buffer
    pub start: usize,
    pub num_collider: usize,
    /// Dynamic colliders come first, so this is also the length of the dynamic prefix.
    pub dyn_collider: usize,
    pub is_kinematic: bool,
    /// Bounds of this node's own colliders
    pub aabb_me: Aabb,
    /// Bounds of this node's colliders and all of its descendants'
    pub aabb_all: Aabb,
}

impl ColliderTreeNode {
    #[inline]
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.start + self.num_collider
    }
}

/// Colliders of one shape grouped by the bones that move them.
///
/// Every node owns a contiguous run of the collider buffer, and `aabbs[i]` always bounds `colliders[i]`.
/// Nodes are stored in pre-order, so a parent always comes before its children.
#[derive(Clone, Debug)]
pub struct ColliderTree {
    kind: ColliderKind,
    nodes: Vec<ColliderTreeNode>,
    colliders: Box<[Collider]>,
    aabbs: Box<[Aabb]>,
}

impl ColliderTree {
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ColliderKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[ColliderTreeNode] {
        &self.nodes
    }

    #[inline]
    #[must_use]
    pub fn node(&self, index: usize) -> &ColliderTreeNode {
        &self.nodes[index]
    }

    #[inline]
    #[must_use]
    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    #[inline]
    #[must_use]
    pub fn aabbs(&self) -> &[Aabb] {
        &self.aabbs
    }

    #[inline]
    #[must_use]
    pub fn node_aabbs(&self, index: usize) -> &[Aabb] {
        &self.aabbs[self.nodes[index].range()]
    }

    #[inline]
    #[must_use]
    pub fn node_colliders(&self, index: usize) -> &[Collider] {
        &self.colliders[self.nodes[index].range()]
    }

    #[inline]
    #[must_use]
    pub fn get_aabb(&self) -> &Aabb {
        &self.nodes[0].aabb_all
    }

    /// Recomputes every collider's bounds from the current vertex positions, then refits the nodes.
    /// Spheres use `margin` as their radius and triangles are grown by it, both scaled per vertex.
    pub fn update_aabb(&mut self, vertices: &[VertexPos], margin: f32) {
        match self.kind {
            ColliderKind::Sphere => {
                for (aabb, collider) in self.aabbs.iter_mut().zip(&self.colliders) {
                    let v = vertices[collider.vertex()];
                    *aabb = Aabb::from_sphere(v.pos, v.margin_multiplier * margin);
                }
            }
            ColliderKind::Triangle => {
                for (aabb, collider) in self.aabbs.iter_mut().zip(&self.colliders) {
                    let [p0, p1, p2] = collider.vertices.map(|i| vertices[i as usize]);
                    let multiplier =
                        (p0.margin_multiplier + p1.margin_multiplier + p2.margin_multiplier) / 3.0;
                    *aabb = Aabb::from_points(&[p0.pos, p1.pos, p2.pos], multiplier * margin);
                }
            }
        }

        self.refit();
    }

    fn refit(&mut self) {
        for i in (0..self.nodes.len()).rev() {
            let aabb_me = self.aabbs[self.nodes[i].range()]
                .iter()
                .fold(Aabb::INVALID, |acc, aabb| acc + *aabb);

            let aabb_all = self.nodes[i]
                .children
                .iter()
                .fold(aabb_me, |acc, &child| acc + self.nodes[child].aabb_all);

            let node = &mut self.nodes[i];
            node.aabb_me = aabb_me;
            node.aabb_all = aabb_all;
        }
    }

    /// Collects every pair of nodes, one from each tree, whose own colliders might touch.
    /// Pairs where both nodes are kinematic are never reported.
    pub fn check_collision_l(&self, other: &Self, pairs: &mut Vec<NodePair>) {
        if self.nodes.is_empty() || other.nodes.is_empty() {
            return;
        }

        self.check_collision_l_node(0, other, pairs);
    }

    fn check_collision_l_node(&self, node_idx: usize, other: &Self, pairs: &mut Vec<NodePair>) {
        let node = &self.nodes[node_idx];
        if !node.aabb_all.intersects(other.get_aabb()) {
            return;
        }

        if node.num_collider != 0 {
            self.check_collision_r(node_idx, other, 0, pairs);
        }

        for &child in &node.children {
            self.check_collision_l_node(child, other, pairs);
        }
    }

    fn check_collision_r(
        &self,
        node_idx: usize,
        other: &Self,
        other_idx: usize,
        pairs: &mut Vec<NodePair>,
    ) {
        let node = &self.nodes[node_idx];
        let r = &other.nodes[other_idx];
        if !node.aabb_me.intersects(&r.aabb_all) {
            return;
        }

        if r.num_collider != 0
            && !(node.is_kinematic && r.is_kinematic)
            && node.aabb_me.intersects(&r.aabb_me)
        {
            pairs.push((node_idx, other_idx));
        }

        for &child in &r.children {
            self.check_collision_r(node_idx, other, child, pairs);
        }
    }
}

#[derive(Default)]
struct BuildNode {
    key: Option<u32>,
    children: Vec<BuildNode>,
    dynamic: Vec<Collider>,
    kinematic: Vec<Collider>,
}

impl BuildNode {
    fn child_mut(&mut self, key: u32) -> &mut Self {
        let pos = match self.children.iter().position(|c| c.key == Some(key)) {
            Some(pos) => pos,
            None => {
                self.children.push(Self {
                    key: Some(key),
                    ..Default::default()
                });
                self.children.len() - 1
            }
        };

        &mut self.children[pos]
    }
}

/// Groups colliders by their bone key path before flattening them into a `ColliderTree`.
pub struct ColliderTreeBuilder {
    kind: ColliderKind,
    root: BuildNode,
    num_colliders: usize,
}

impl ColliderTreeBuilder {
    #[must_use]
    pub fn new(kind: ColliderKind) -> Self {
        Self {
            kind,
            root: BuildNode::default(),
            num_colliders: 0,
        }
    }

    /// `keys` should be the sorted, deduplicated bones influencing the collider.
    pub fn insert_collider(&mut self, keys: &[u32], collider: Collider, is_kinematic: bool) {
        let node = keys
            .iter()
            .fold(&mut self.root, |node, &key| node.child_mut(key));

        if is_kinematic {
            node.kinematic.push(collider);
        } else {
            node.dynamic.push(collider);
        }

        self.num_colliders += 1;
    }

    #[must_use]
    pub fn build(self) -> ColliderTree {
        let mut nodes = Vec::new();
        let mut colliders = Vec::with_capacity(self.num_colliders);
        Self::flatten(self.root, &mut nodes, &mut colliders);

        let aabbs = vec![Aabb::INVALID; colliders.len()].into_boxed_slice();

        ColliderTree {
            kind: self.kind,
            nodes,
            colliders: colliders.into_boxed_slice(),
            aabbs,
        }
    }

    fn flatten(
        node: BuildNode,
        nodes: &mut Vec<ColliderTreeNode>,
        colliders: &mut Vec<Collider>,
    ) -> usize {
        let index = nodes.len();
        let start = colliders.len();
        let dyn_collider = node.dynamic.len();
        let num_collider = dyn_collider + node.kinematic.len();

        colliders.extend(node.dynamic);
        colliders.extend(node.kinematic);

        nodes.push(ColliderTreeNode {
            key: node.key,
            children: Vec::with_capacity(node.children.len()),
            start,
            num_collider,
            dyn_collider,
            is_kinematic: num_collider != 0 && dyn_collider == 0,
            aabb_me: Aabb::INVALID,
            aabb_all: Aabb::INVALID,
        });

        for child in node.children {
            let child_index = Self::flatten(child, nodes, colliders);
            nodes[index].children.push(child_index);
        }

        index
    }
}
