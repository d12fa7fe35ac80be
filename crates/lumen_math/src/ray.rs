use crate::Vec3;

/// A ray in 3D space with origin and direction.
///
/// The inverse direction is precomputed at construction because the BVH
/// slab test evaluates it for every node a ray visits. Rays are value
/// types and never mutated once built.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub direction_inv: Vec3,
}

impl Ray {
    /// Create a new ray. `direction` is expected to be unit length.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            // Components of a zero direction axis become +/-inf, which the
            // slab test handles through min/max ordering.
            direction_inv: direction.recip(),
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_direction_inv() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(2.0, -4.0, 0.5));

        assert_eq!(ray.direction_inv.x, 0.5);
        assert_eq!(ray.direction_inv.y, -0.25);
        assert_eq!(ray.direction_inv.z, 2.0);
    }

    #[test]
    fn test_ray_copy() {
        let ray1 = Ray::new(Vec3::ZERO, Vec3::Y);
        let ray2 = ray1; // Copy, not move

        assert_eq!(ray1.origin, ray2.origin);
        assert_eq!(ray1.at(1.0), ray2.at(1.0));
    }
}
