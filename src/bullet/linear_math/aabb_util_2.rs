use std::ops::{Add, AddAssign};

use glam::Vec3A;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3A,
    pub max: Vec3A,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::INVALID
    }
}

impl Aabb {
    /// An inverted box that intersects nothing and becomes the other box on merge.
    pub const INVALID: Self = Self {
        min: Vec3A::splat(f32::MAX),
        max: Vec3A::splat(-f32::MAX),
    };

    #[inline]
    pub const fn new(min: Vec3A, max: Vec3A) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn from_sphere(center: Vec3A, radius: f32) -> Self {
        Self {
            min: center - radius,
            max: center + radius,
        }
    }

    #[inline]
    pub fn from_points(points: &[Vec3A; 3], margin: f32) -> Self {
        Self {
            min: points[0].min(points[1]).min(points[2]) - margin,
            max: points[0].max(points[1]).max(points[2]) + margin,
        }
    }

    #[inline]
    pub fn intersects(&self, rhs: &Self) -> bool {
        self.min.cmple(rhs.max).all() && self.max.cmpge(rhs.min).all()
    }

    #[inline]
    pub fn invalidate(&mut self) {
        *self = Self::INVALID;
    }
}

impl Add for Aabb {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            min: self.min.min(rhs.min),
            max: self.max.max(rhs.max),
        }
    }
}

impl AddAssign for Aabb {
    fn add_assign(&mut self, rhs: Self) {
        self.min = self.min.min(rhs.min);
        self.max = self.max.max(rhs.max);
    }
}
