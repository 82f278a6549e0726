use glam::Vec3A;

/// A skinned vertex position in world space, with the scale applied to shape margins at it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexPos {
    pub pos: Vec3A,
    pub margin_multiplier: f32,
}

impl Default for VertexPos {
    fn default() -> Self {
        Self {
            pos: Vec3A::ZERO,
            margin_multiplier: 1.0,
        }
    }
}

impl VertexPos {
    #[inline]
    pub const fn new(pos: Vec3A, margin_multiplier: f32) -> Self {
        Self {
            pos,
            margin_multiplier,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexShapeProp {
    /// Sphere radius at a vertex with a margin multiplier of 1.
    pub margin: f32,
}

impl Default for VertexShapeProp {
    fn default() -> Self {
        Self { margin: 1.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangleShapeProp {
    /// Thickness added in front of the face.
    pub margin: f32,
    /// How far behind the face a sphere center may sit and still collide.
    /// Near zero makes the triangle double-sided, negative flips the face.
    pub penetration: f32,
}

impl Default for TriangleShapeProp {
    fn default() -> Self {
        Self {
            margin: 1.0,
            penetration: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColliderKind {
    Sphere,
    Triangle,
}

/// A sphere at one vertex or a triangle over three, by index into the owning body's vertices.
/// Sphere colliders only use `vertices[0]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub vertices: [u32; 3],
    pub flexible: f32,
}

impl Collider {
    #[inline]
    pub const fn sphere(vertex: u32, flexible: f32) -> Self {
        Self {
            vertices: [vertex; 3],
            flexible,
        }
    }

    #[inline]
    pub const fn triangle(vertices: [u32; 3], flexible: f32) -> Self {
        Self {
            vertices,
            flexible,
        }
    }

    #[inline]
    pub const fn vertex(&self) -> usize {
        self.vertices[0] as usize
    }
}
