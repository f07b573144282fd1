//! Axis-aligned bounding boxes over model-space points.

use crate::{Vec3, vec3};

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Cube spanning `[-1, 1]` on every axis.
    pub const UNIT: Self = Self {
        min: Vec3::splat(-1.0),
        max: Vec3::splat(1.0),
    };

    /// Smallest box containing every point, or `None` for an empty set.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f32; 3]>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut aabb = Self {
            min: Vec3::from_array(first),
            max: Vec3::from_array(first),
        };
        for p in points {
            aabb.grow(Vec3::from_array(p));
        }
        Some(aabb)
    }

    /// Expand to contain `p`.
    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::UNIT
    }
}
