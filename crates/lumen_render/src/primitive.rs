//! Primitive capability trait and intersection records.

use crate::Material;
use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// A material that never scatters or emits, used for `Intersection::default()`.
struct NoHitMaterial;

impl Material for NoHitMaterial {
    fn eval(&self, _wi: Vec3, _wo: Vec3, _n: Vec3) -> Vec3 {
        Vec3::ZERO
    }

    fn sample(&self, _wi: Vec3, n: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
        n
    }

    fn pdf(&self, _wi: Vec3, _wo: Vec3, _n: Vec3) -> f32 {
        0.0
    }
}

/// Static no-hit material instance for Default impl.
static NO_HIT_MATERIAL: NoHitMaterial = NoHitMaterial;

/// Record of a ray-surface intersection.
///
/// Filled in by `Primitive::intersect`; the `t` of the current record is
/// not consulted, callers shrink the query interval instead.
#[derive(Clone)]
pub struct Intersection<'a> {
    /// Ray parameter of the hit
    pub t: f32,
    /// Point of intersection
    pub p: Vec3,
    /// Geometric surface normal (unit length, per winding)
    pub normal: Vec3,
    /// Emitted radiance of the surface at the hit
    pub emit: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
}

impl Default for Intersection<'_> {
    fn default() -> Self {
        Self {
            t: f32::INFINITY,
            p: Vec3::ZERO,
            normal: Vec3::ZERO,
            emit: Vec3::ZERO,
            material: &NO_HIT_MATERIAL,
        }
    }
}

/// A point sampled on a primitive's surface, with the area density it was
/// drawn with.
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    pub p: Vec3,
    pub normal: Vec3,
    pub emit: Vec3,
    pub pdf: f32,
}

/// A renderable primitive: something rays can hit and light sampling can
/// draw surface points from.
pub trait Primitive: Send + Sync {
    /// Test the ray against this primitive over the given t-range.
    ///
    /// Returns true on a hit and fills in the record.
    fn intersect<'a>(&'a self, ray: &Ray, t_range: Interval, hit: &mut Intersection<'a>) -> bool;

    /// Axis-aligned bounding box of this primitive.
    fn bounds(&self) -> Aabb;

    /// Total surface area.
    fn area(&self) -> f32;

    /// True if the surface material emits light.
    fn is_emissive(&self) -> bool;

    /// Draw a uniformly distributed point on the surface; `pdf` is 1/area.
    fn sample(&self, rng: &mut dyn RngCore) -> LightSample;
}
