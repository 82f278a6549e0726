use glam::Vec3A;

/// Normal used when two sphere centers coincide and no direction can be derived.
pub const FALLBACK_NORMAL: Vec3A = Vec3A::Z;

/// One potential contact between collider `collider_a` and collider `collider_b`.
///
/// `normal_on_b` points from A's surface toward B. `depth` is the signed separation:
/// negative when the surfaces interpenetrate, more negative meaning deeper.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CollisionResult {
    pub pos_a: Vec3A,
    pub pos_b: Vec3A,
    pub normal_on_b: Vec3A,
    pub depth: f32,
    /// Index into the collider buffer of A's tree
    pub collider_a: usize,
    /// Index into the collider buffer of B's tree
    pub collider_b: usize,
}

impl CollisionResult {
    /// The same contact seen from the other side.
    #[must_use]
    pub fn swapped(self) -> Self {
        Self {
            pos_a: self.pos_b,
            pos_b: self.pos_a,
            normal_on_b: -self.normal_on_b,
            depth: self.depth,
            collider_a: self.collider_b,
            collider_b: self.collider_a,
        }
    }
}

#[must_use]
pub fn check_sphere_sphere(
    pos_a: Vec3A,
    pos_b: Vec3A,
    radius_a: f32,
    radius_b: f32,
) -> Option<CollisionResult> {
    let diff = pos_b - pos_a;
    let dist_sq = diff.length_squared();
    let bound = radius_a + radius_b;
    if dist_sq >= bound * bound {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > f32::EPSILON {
        diff / dist
    } else {
        FALLBACK_NORMAL
    };

    Some(CollisionResult {
        pos_a: pos_a + normal * radius_a,
        pos_b: pos_b - normal * radius_b,
        normal_on_b: normal,
        depth: dist - bound,
        ..Default::default()
    })
}

/// A triangle prepared for sphere tests, with its margins already scaled.
#[derive(Clone, Copy, Debug)]
pub struct CheckTriangle {
    pub points: [Vec3A; 3],
    /// `edges` = \[`p1 - p0`, `p2 - p1`, `p0 - p2`]
    pub edges: [Vec3A; 3],
    pub normal: Vec3A,
    pub margin: f32,
    /// Zero for double-sided triangles, otherwise the depth tolerated behind the face.
    pub penetration: f32,
    /// False for triangles with (near) zero area, which never collide.
    pub valid: bool,
}

impl CheckTriangle {
    #[must_use]
    pub fn new(p0: Vec3A, p1: Vec3A, p2: Vec3A, margin: f32, penetration: f32) -> Self {
        let points = [p0, p1, p2];
        let edges = [p1 - p0, p2 - p1, p0 - p2];

        let (mut normal, normal_length) = edges[0].cross(-edges[2]).normalize_and_length();
        let valid = normal_length > f32::EPSILON;

        let penetration = if penetration.abs() < f32::EPSILON {
            0.0
        } else if penetration < 0.0 {
            normal = -normal;
            -penetration
        } else {
            penetration
        };

        Self {
            points,
            edges,
            normal,
            margin,
            penetration,
            valid,
        }
    }

    /// <https://stackoverflow.com/a/74395029/10930209>
    #[must_use]
    pub fn closest_point(&self, obj_to_points: &[Vec3A; 3]) -> Vec3A {
        let ab = self.edges[0];
        let ac = -self.edges[2];

        let d1 = ab.dot(obj_to_points[0]);
        let d2 = ac.dot(obj_to_points[0]);
        if d1 <= 0. && d2 <= 0. {
            return self.points[0];
        }

        let d3 = ab.dot(obj_to_points[1]);
        let d4 = ac.dot(obj_to_points[1]);
        if d3 >= 0. && d4 <= d3 {
            return self.points[1];
        }

        let d5 = ab.dot(obj_to_points[2]);
        let d6 = ac.dot(obj_to_points[2]);
        if d6 >= 0. && d5 <= d6 {
            return self.points[2];
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0. && d1 >= 0. && d3 <= 0. {
            let v = d1 / (d1 - d3);
            return self.points[0] + v * ab;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0. && d2 >= 0. && d6 <= 0. {
            let v = d2 / (d2 - d6);
            return self.points[0] + v * ac;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0. && (d4 - d3) >= 0. && (d5 - d6) >= 0. {
            let v = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return self.points[1] + v * self.edges[1];
        }

        let denom = 1. / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        self.points[0] + v * ab + w * ac
    }
}

/// Sphere (A) against triangle (B). The contact normal always follows the face normal,
/// so every contact pushes along the surface the triangle belongs to.
#[must_use]
pub fn check_sphere_triangle(
    pos: Vec3A,
    radius: f32,
    tri: &CheckTriangle,
) -> Option<CollisionResult> {
    if !tri.valid {
        return None;
    }

    let radius_with_margin = radius + tri.margin;
    let mut face_normal = tri.normal;
    let mut distance_from_plane = (pos - tri.points[0]).dot(face_normal);

    if tri.penetration > 0.0 {
        if distance_from_plane < -tri.penetration {
            return None;
        }
    } else if distance_from_plane < 0.0 {
        distance_from_plane = -distance_from_plane;
        face_normal = -face_normal;
    }

    if distance_from_plane >= radius_with_margin {
        return None;
    }

    let obj_to_points = [
        pos - tri.points[0],
        pos - tri.points[1],
        pos - tri.points[2],
    ];
    let contact_point = tri.closest_point(&obj_to_points);
    let distance_sqr = (pos - contact_point).length_squared();

    let signed_distance = if distance_from_plane >= 0.0 {
        if distance_sqr >= radius_with_margin * radius_with_margin {
            return None;
        }
        distance_sqr.sqrt()
    } else {
        // Center is inside the penetration band behind the face
        let lateral_sqr = distance_sqr - distance_from_plane * distance_from_plane;
        if lateral_sqr >= radius_with_margin * radius_with_margin {
            return None;
        }
        -distance_sqr.sqrt()
    };

    Some(CollisionResult {
        pos_a: pos - face_normal * radius,
        pos_b: contact_point + face_normal * tri.margin,
        normal_on_b: -face_normal,
        depth: signed_distance - radius_with_margin,
        ..Default::default()
    })
}
