use arrayvec::ArrayVec;
use glam::{Vec3A, Vec4};

use super::manifold_point::ManifoldPoint;
use crate::bullet::linear_math::plane_space;

pub const MANIFOLD_CACHE_SIZE: usize = 4;

/// Contact points between one pair of rigid bodies, as handed to the solver.
#[derive(Debug)]
pub struct PersistentManifold {
    pub point_cache: ArrayVec<ManifoldPoint, MANIFOLD_CACHE_SIZE>,
    pub body0_idx: usize,
    pub body1_idx: usize,
}

impl PersistentManifold {
    #[must_use]
    pub fn new(body0_idx: usize, body1_idx: usize) -> Self {
        debug_assert_ne!(body0_idx, body1_idx);

        Self {
            point_cache: ArrayVec::new(),
            body0_idx,
            body1_idx,
        }
    }

    #[inline]
    #[must_use]
    pub fn get_num_contacts(&self) -> usize {
        self.point_cache.len()
    }

    #[inline]
    fn get_res(new_contact_local: Vec3A, point1: Vec3A, point2: Vec3A, point3: Vec3A) -> f32 {
        (new_contact_local - point1)
            .cross(point2 - point3)
            .length_squared()
    }

    /// Area spanned when the new point replaces cached point `skip`.
    fn get_res_without(&self, skip: usize, new_contact_local: Vec3A) -> f32 {
        let mut others = (0..MANIFOLD_CACHE_SIZE)
            .filter(|&i| i != skip)
            .map(|i| self.point_cache[i].local_point_a);

        let (Some(p1), Some(p2), Some(p3)) = (others.next(), others.next(), others.next()) else {
            return 0.0;
        };

        Self::get_res(new_contact_local, p1, p3, p2)
    }

    fn sort_cached_points(&self, new_contact: &ManifoldPoint) -> usize {
        let mut max_penetration_index = MANIFOLD_CACHE_SIZE;
        let mut max_penetration = new_contact.distance_1;
        for (i, contact) in self.point_cache.iter().enumerate() {
            if contact.distance_1 < max_penetration {
                max_penetration_index = i;
                max_penetration = contact.distance_1;
            }
        }

        let mut res = [0.0; MANIFOLD_CACHE_SIZE];
        for (i, r) in res.iter_mut().enumerate() {
            if i != max_penetration_index {
                *r = self.get_res_without(i, new_contact.local_point_a);
            }
        }

        Vec4::from_array(res).max_position()
    }

    /// Appends a point, or replaces a cached one when full. The deepest point is never evicted.
    pub fn add_manifold_point(&mut self, mut contact: ManifoldPoint) -> usize {
        (contact.lateral_friction_dir_1, contact.lateral_friction_dir_2) =
            plane_space(contact.normal_world_on_b);

        let num_points = self.point_cache.len();
        if num_points == MANIFOLD_CACHE_SIZE {
            let index = self.sort_cached_points(&contact);
            self.point_cache[index] = contact;
            index
        } else {
            self.point_cache.push(contact);
            num_points
        }
    }
}
