//! Triangle and triangle-mesh primitives.
//!
//! Ray-triangle intersection uses the Möller-Trumbore algorithm. A mesh
//! carries its own BVH over its triangles, so scene-level traversal is a
//! two-level structure.

use std::sync::Arc;

use crate::bvh::{Bvh, BvhError};
use crate::gen_f32;
use crate::primitive::{Intersection, LightSample, Primitive};
use crate::Material;
use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

/// A single triangle with a precomputed face normal and area.
pub struct Triangle {
    v0: Vec3,
    /// Edges v1 - v0 and v2 - v0
    e1: Vec3,
    e2: Vec3,
    /// Face normal (unit length, follows CCW winding)
    normal: Vec3,
    area: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices in CCW winding order.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> Self {
        let e1 = v1 - v0;
        let e2 = v2 - v0;
        let cross = e1.cross(e2);

        let bbox = Aabb::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2));

        Self {
            v0,
            e1,
            e2,
            normal: cross.normalize_or_zero(),
            area: 0.5 * cross.length(),
            material,
            bbox,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Primitive for Triangle {
    /// Möller-Trumbore ray-triangle intersection.
    fn intersect<'a>(&'a self, ray: &Ray, t_range: Interval, hit: &mut Intersection<'a>) -> bool {
        let h = ray.direction.cross(self.e2);
        let det = self.e1.dot(h);

        // Ray is parallel to the triangle plane
        if det.abs() < 1e-8 {
            return false;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - self.v0;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(self.e1);
        let v = inv_det * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = inv_det * self.e2.dot(q);
        if !t_range.contains(t) {
            return false;
        }

        hit.t = t;
        hit.p = ray.at(t);
        hit.normal = self.normal;
        hit.emit = self.material.emission();
        hit.material = self.material.as_ref();

        true
    }

    fn bounds(&self) -> Aabb {
        self.bbox
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn is_emissive(&self) -> bool {
        self.material.has_emission()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> LightSample {
        // sqrt warp gives a uniform density over the triangle
        let x = gen_f32(rng).sqrt();
        let y = gen_f32(rng);
        let p = self.v0 + self.e1 * (x * (1.0 - y)) + self.e2 * (x * y);

        LightSample {
            p,
            normal: self.normal,
            emit: self.material.emission(),
            pdf: 1.0 / self.area,
        }
    }
}

/// An indexed triangle mesh sharing one material, with a BVH over its
/// triangles.
pub struct TriangleMesh {
    bvh: Bvh,
    area: f32,
    emissive: bool,
}

impl TriangleMesh {
    /// Build a mesh from vertex positions and triangle indices.
    ///
    /// Triangles referencing out-of-range vertices are skipped with a
    /// warning; a mesh with no valid triangles is a build error.
    pub fn new(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        material: Arc<dyn Material>,
    ) -> Result<Self, BvhError> {
        let mut triangles: Vec<Arc<dyn Primitive>> = Vec::with_capacity(indices.len() / 3);

        for face in indices.chunks(3) {
            if face.len() < 3 {
                continue;
            }
            let (i0, i1, i2) = (face[0] as usize, face[1] as usize, face[2] as usize);
            if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
                log::warn!(
                    "Invalid triangle indices: [{}, {}, {}], vertex count: {}",
                    i0,
                    i1,
                    i2,
                    positions.len()
                );
                continue;
            }
            triangles.push(Arc::new(Triangle::new(
                positions[i0],
                positions[i1],
                positions[i2],
                Arc::clone(&material),
            )));
        }

        let area = triangles.iter().map(|t| t.area()).sum();
        let bvh = Bvh::build(triangles)?;

        Ok(Self {
            bvh,
            area,
            emissive: material.has_emission(),
        })
    }

    /// Convenience constructor: a quad p0..p3 (CCW) split into two triangles.
    pub fn quad(
        p0: Vec3,
        p1: Vec3,
        p2: Vec3,
        p3: Vec3,
        material: Arc<dyn Material>,
    ) -> Result<Self, BvhError> {
        Self::new(vec![p0, p1, p2, p3], vec![0, 1, 2, 0, 2, 3], material)
    }
}

impl Primitive for TriangleMesh {
    fn intersect<'a>(&'a self, ray: &Ray, t_range: Interval, hit: &mut Intersection<'a>) -> bool {
        self.bvh.intersect(ray, t_range, hit)
    }

    fn bounds(&self) -> Aabb {
        self.bvh.bounds()
    }

    fn area(&self) -> f32 {
        self.area
    }

    fn is_emissive(&self) -> bool {
        self.emissive
    }

    fn sample(&self, rng: &mut dyn RngCore) -> LightSample {
        // Uniform over the whole mesh surface via area-weighted descent
        self.bvh.sample(rng)
    }
}
