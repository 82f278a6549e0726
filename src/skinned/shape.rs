use crate::{
    bullet::linear_math::aabb_util_2::Aabb,
    consts::{BONES_PER_TRIANGLE, BONES_PER_VERTEX},
    skinned::{
        body::SkinnedVertex,
        collider::{Collider, ColliderKind, TriangleShapeProp, VertexPos, VertexShapeProp},
        collider_tree::ColliderTree,
    },
};

/// A sphere at every vertex.
#[derive(Clone, Debug)]
pub struct PerVertexShape {
    pub tree: ColliderTree,
    pub shape_prop: VertexShapeProp,
}

impl PerVertexShape {
    pub fn internal_update(&mut self, vertices: &[VertexPos]) {
        self.tree.update_aabb(vertices, self.shape_prop.margin);
    }
}

/// A triangle per face, plus the per-vertex spheres used when colliding against triangles.
#[derive(Clone, Debug)]
pub struct PerTriangleShape {
    pub tree: ColliderTree,
    pub shape_prop: TriangleShapeProp,
    pub vertex_shape: PerVertexShape,
}

impl PerTriangleShape {
    pub fn internal_update(&mut self, vertices: &[VertexPos]) {
        let margin = self
            .shape_prop
            .margin
            .max(self.shape_prop.penetration.abs());
        self.tree.update_aabb(vertices, margin);
        self.vertex_shape.internal_update(vertices);
    }
}

#[derive(Clone, Debug)]
pub enum SkinnedMeshShape {
    PerVertex(PerVertexShape),
    PerTriangle(PerTriangleShape),
}

impl SkinnedMeshShape {
    #[must_use]
    pub const fn as_per_triangle_shape(&self) -> Option<&PerTriangleShape> {
        match self {
            Self::PerVertex(_) => None,
            Self::PerTriangle(shape) => Some(shape),
        }
    }

    #[must_use]
    pub const fn as_per_vertex_shape(&self) -> &PerVertexShape {
        match self {
            Self::PerVertex(shape) => shape,
            Self::PerTriangle(shape) => &shape.vertex_shape,
        }
    }

    pub fn internal_update(&mut self, vertices: &[VertexPos]) {
        match self {
            Self::PerVertex(shape) => shape.internal_update(vertices),
            Self::PerTriangle(shape) => shape.internal_update(vertices),
        }
    }

    #[must_use]
    pub fn get_aabb(&self) -> Aabb {
        match self {
            Self::PerVertex(shape) => *shape.tree.get_aabb(),
            Self::PerTriangle(shape) => {
                *shape.tree.get_aabb() + *shape.vertex_shape.tree.get_aabb()
            }
        }
    }
}

/// Either shape kind, seen through what the merge step needs: its tree and the bones behind each collider.
#[derive(Clone, Copy, Debug)]
pub enum ShapeRef<'a> {
    Vertex(&'a PerVertexShape),
    Triangle(&'a PerTriangleShape),
}

impl<'a> ShapeRef<'a> {
    #[inline]
    #[must_use]
    pub const fn tree(self) -> &'a ColliderTree {
        match self {
            Self::Vertex(shape) => &shape.tree,
            Self::Triangle(shape) => &shape.tree,
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(self) -> ColliderKind {
        match self {
            Self::Vertex(_) => ColliderKind::Sphere,
            Self::Triangle(_) => ColliderKind::Triangle,
        }
    }

    #[inline]
    #[must_use]
    pub const fn get_bone_per_collider(self) -> usize {
        match self {
            Self::Vertex(_) => BONES_PER_VERTEX,
            Self::Triangle(_) => BONES_PER_TRIANGLE,
        }
    }

    /// The `i`th (bone index, skinning weight) influencing `collider`.
    /// Triangles list the four slots of each of their vertices in turn.
    #[inline]
    #[must_use]
    pub fn get_collider_bone(
        self,
        vertices: &[SkinnedVertex],
        collider: &Collider,
        i: usize,
    ) -> (usize, f32) {
        let (vertex, slot) = match self {
            Self::Vertex(_) => (collider.vertex(), i),
            Self::Triangle(_) => (
                collider.vertices[i / BONES_PER_VERTEX] as usize,
                i % BONES_PER_VERTEX,
            ),
        };

        let v = &vertices[vertex];
        (v.bone_indices[slot] as usize, v.weights[slot])
    }
}
