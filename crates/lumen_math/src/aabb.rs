use crate::{Interval, Ray, Vec3};

/// Axis-aligned bounding box for spatial acceleration structures (BVH).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Minimum extent of any axis; flat boxes are padded up to this so the
    /// slab test never degenerates.
    const MIN_EXTENT: f32 = 1e-4;

    /// Create an AABB from two corner points (in any order).
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let mut aabb = Self {
            min: a.min(b),
            max: a.max(b),
        };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn union(a: &Aabb, b: &Aabb) -> Self {
        Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }

    /// Grow this AABB to also cover a single point.
    pub fn union_point(&self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// Extent along each axis.
    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    /// Total surface area of the box faces.
    pub fn surface_area(&self) -> f32 {
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Center point of the box.
    pub fn centroid(&self) -> Vec3 {
        0.5 * (self.min + self.max)
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the largest extent.
    pub fn longest_axis(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y && d.x > d.z {
            0
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab method using the ray's precomputed inverse direction; all three
    /// axes are evaluated componentwise before the interval comparison.
    pub fn hit(&self, ray: &Ray, t_range: Interval) -> bool {
        let t0 = (self.min - ray.origin) * ray.direction_inv;
        let t1 = (self.max - ray.origin) * ray.direction_inv;

        let t_near = t0.min(t1);
        let t_far = t0.max(t1);

        let t_enter = t_near.max_element().max(t_range.min);
        let t_exit = t_far.min_element().min(t_range.max);

        t_enter <= t_exit
    }

    /// Pad flat axes so zero-thickness geometry still has a valid box.
    fn pad_to_minimums(&mut self) {
        let d = self.diagonal();
        let half = Self::MIN_EXTENT * 0.5;
        if d.x < Self::MIN_EXTENT {
            self.min.x -= half;
            self.max.x += half;
        }
        if d.y < Self::MIN_EXTENT {
            self.min.y -= half;
            self.max.y += half;
        }
        if d.z < Self::MIN_EXTENT {
            self.min.z -= half;
            self.max.z += half;
        }
    }

    /// An empty box (min > max, contains nothing). Identity for `union`.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 3.0), Vec3::new(0.0, 10.0, 7.0));

        assert_eq!(aabb.min, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(aabb.max, Vec3::new(10.0, 10.0, 7.0));
    }

    #[test]
    fn test_aabb_union() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let box2 = Aabb::from_points(Vec3::new(3.0, 3.0, 3.0), Vec3::new(10.0, 10.0, 10.0));
        let u = Aabb::union(&box1, &box2);

        assert_eq!(u.min, Vec3::ZERO);
        assert_eq!(u.max, Vec3::new(10.0, 10.0, 10.0));
    }

    #[test]
    fn test_aabb_union_empty_identity() {
        let b = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let u = Aabb::union(&Aabb::EMPTY, &b);

        assert_eq!(u, b);
    }

    #[test]
    fn test_aabb_surface_area() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(2.0, 3.0, 4.0));
        // 2 * (2*3 + 3*4 + 4*2) = 52
        assert_eq!(aabb.surface_area(), 52.0);
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let t = Interval::new(0.0, 100.0);

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.hit(&ray, t));

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!aabb.hit(&ray, t));

        // Ray missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!aabb.hit(&ray, t));

        // Ray starting inside
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(aabb.hit(&ray, t));
    }

    #[test]
    fn test_aabb_hit_flat_box() {
        // Zero-thickness box (a quad's bounds) must still be hittable
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));

        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));
    }

    #[test]
    fn test_aabb_longest_axis() {
        assert_eq!(
            Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0)).longest_axis(),
            0
        );
        assert_eq!(
            Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0)).longest_axis(),
            1
        );
        assert_eq!(
            Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 10.0)).longest_axis(),
            2
        );
    }

    #[test]
    fn test_aabb_centroid() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(aabb.centroid(), Vec3::new(5.0, 5.0, 5.0));
    }
}
