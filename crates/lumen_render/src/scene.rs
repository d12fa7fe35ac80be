//! Scene ownership and light sampling.
//!
//! A `Scene` owns the primitive list and the BVH built over it, plus the
//! camera parameters and the Russian-roulette continuation probability.
//! Everything is built once up front and is immutable while rendering, so
//! worker threads share it without locks.

use std::sync::Arc;

use crate::bvh::{Bvh, BvhError};
use crate::gen_f32;
use crate::primitive::{Intersection, LightSample, Primitive};
use lumen_math::{Interval, Ray, Vec3};
use rand::RngCore;
use thiserror::Error;

/// Errors from scene construction.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error(transparent)]
    Bvh(#[from] BvhError),

    #[error("scene has no emissive surface to sample")]
    NoEmitter,
}

/// A renderable scene: primitives, their BVH, camera, and integrator
/// constants.
pub struct Scene {
    objects: Vec<Arc<dyn Primitive>>,
    /// Emissive subset of `objects`, in the same order
    lights: Vec<Arc<dyn Primitive>>,
    emissive_area: f32,
    bvh: Bvh,

    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Camera position
    pub eye: Vec3,
    /// Russian-roulette continuation probability in (0, 1]
    pub russian_roulette: f32,
}

impl Scene {
    /// Build a scene and its BVH.
    ///
    /// Fails fast on an empty object list or a scene without any emissive
    /// surface, since the integrator samples a light every bounce.
    pub fn new(
        objects: Vec<Arc<dyn Primitive>>,
        width: u32,
        height: u32,
        fov: f32,
        eye: Vec3,
        russian_roulette: f32,
    ) -> Result<Self, SceneError> {
        let lights: Vec<Arc<dyn Primitive>> = objects
            .iter()
            .filter(|o| o.is_emissive())
            .cloned()
            .collect();
        let emissive_area: f32 = lights.iter().map(|l| l.area()).sum();
        if emissive_area <= 0.0 {
            return Err(SceneError::NoEmitter);
        }

        let bvh = Bvh::build(objects.clone())?;
        log::info!(
            "scene: {} objects ({} emissive, area {:.1}), {}x{} @ fov {}",
            objects.len(),
            lights.len(),
            emissive_area,
            width,
            height,
            fov
        );

        Ok(Self {
            objects,
            lights,
            emissive_area,
            bvh,
            width,
            height,
            fov,
            eye,
            russian_roulette,
        })
    }

    /// Nearest hit against the whole scene.
    pub fn intersect<'a>(
        &'a self,
        ray: &Ray,
        t_range: Interval,
        hit: &mut Intersection<'a>,
    ) -> bool {
        self.bvh.intersect(ray, t_range, hit)
    }

    /// Draw a point on an emissive surface.
    ///
    /// Emitters are selected with probability proportional to surface area
    /// (inverse-CDF over the cumulative area), then the chosen object
    /// samples uniformly over itself. The selection probability is folded
    /// into the returned pdf, which therefore equals 1/totalEmissiveArea.
    pub fn sample_light(&self, rng: &mut dyn RngCore) -> LightSample {
        let draw = gen_f32(rng) * self.emissive_area;

        let mut acc = 0.0;
        for light in &self.lights[..self.lights.len() - 1] {
            acc += light.area();
            if draw <= acc {
                return self.sample_one(light.as_ref(), rng);
            }
        }
        // Float slack lands on the last emitter
        self.sample_one(self.lights[self.lights.len() - 1].as_ref(), rng)
    }

    fn sample_one(&self, light: &dyn Primitive, rng: &mut dyn RngCore) -> LightSample {
        let mut sample = light.sample(rng);
        sample.pdf *= light.area() / self.emissive_area;
        sample
    }

    /// Total surface area of all emissive objects.
    pub fn emissive_area(&self) -> f32 {
        self.emissive_area
    }

    /// All primitives, in insertion order.
    pub fn objects(&self) -> &[Arc<dyn Primitive>] {
        &self.objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Diffuse, Emissive};
    use crate::triangle::TriangleMesh;
    use crate::Material;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lamp(radiance: f32) -> Arc<dyn Material> {
        Arc::new(Emissive::new(Vec3::splat(0.65), Vec3::splat(radiance)))
    }

    fn quad_at_x(x0: f32, size: f32, material: Arc<dyn Material>) -> Arc<dyn Primitive> {
        Arc::new(
            TriangleMesh::quad(
                Vec3::new(x0, 0.0, 0.0),
                Vec3::new(x0 + size, 0.0, 0.0),
                Vec3::new(x0 + size, size, 0.0),
                Vec3::new(x0, size, 0.0),
                material,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_scene_without_emitter_is_error() {
        let wall = quad_at_x(0.0, 1.0, Arc::new(Diffuse::new(Vec3::splat(0.7))));
        let err = Scene::new(vec![wall], 8, 8, 40.0, Vec3::ZERO, 0.8);
        assert!(matches!(err, Err(SceneError::NoEmitter)));
    }

    #[test]
    fn test_scene_empty_is_error() {
        let err = Scene::new(vec![], 8, 8, 40.0, Vec3::ZERO, 0.8);
        assert!(matches!(err, Err(SceneError::NoEmitter)));
    }

    #[test]
    fn test_light_selection_follows_area() {
        // Two emitters with areas 1 and 4; selection frequency must
        // converge to 1/5 vs 4/5.
        let small = quad_at_x(0.0, 1.0, lamp(10.0));
        let large = quad_at_x(10.0, 2.0, lamp(10.0));
        let scene = Scene::new(vec![small, large], 8, 8, 40.0, Vec3::ZERO, 0.8).unwrap();

        assert!((scene.emissive_area() - 5.0).abs() < 1e-4);

        let mut rng = StdRng::seed_from_u64(1);
        let n = 20_000;
        let mut small_draws = 0;
        for _ in 0..n {
            let s = scene.sample_light(&mut rng);
            // Folded pdf is 1/total area for every draw
            assert!((s.pdf - 0.2).abs() < 1e-5);
            if s.p.x < 5.0 {
                small_draws += 1;
            }
        }
        let freq = small_draws as f32 / n as f32;
        assert!((freq - 0.2).abs() < 0.02, "frequency {}", freq);
    }

    #[test]
    fn test_scene_intersect_delegates_to_bvh() {
        let light = quad_at_x(0.0, 1.0, lamp(5.0));
        let scene = Scene::new(vec![light], 8, 8, 40.0, Vec3::ZERO, 0.8).unwrap();

        let ray = Ray::new(Vec3::new(0.5, 0.5, -3.0), Vec3::Z);
        let mut hit = Intersection::default();
        assert!(scene.intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut hit));
        assert!((hit.t - 3.0).abs() < 1e-4);
        assert!(hit.material.has_emission());
    }

    #[test]
    fn test_scene_intersect_matches_linear_scan() {
        // BVH answer must agree with a linear scan over the object list
        let light = quad_at_x(0.0, 1.0, lamp(5.0));
        let wall = quad_at_x(3.0, 2.0, Arc::new(Diffuse::new(Vec3::splat(0.7))));
        let scene = Scene::new(vec![light, wall], 8, 8, 40.0, Vec3::ZERO, 0.8).unwrap();

        let t_range = Interval::new(0.001, f32::INFINITY);
        for x in [0.5_f32, 3.5, 4.5, 8.0] {
            let ray = Ray::new(Vec3::new(x, 0.5, -3.0), Vec3::Z);

            let mut scene_hit = Intersection::default();
            let scene_found = scene.intersect(&ray, t_range, &mut scene_hit);

            let mut scan_hit = Intersection::default();
            let mut scan_found = false;
            let mut closest = t_range.max;
            for object in scene.objects() {
                if object.intersect(&ray, Interval::new(t_range.min, closest), &mut scan_hit) {
                    scan_found = true;
                    closest = scan_hit.t;
                }
            }

            assert_eq!(scene_found, scan_found);
            if scene_found {
                assert!((scene_hit.t - scan_hit.t).abs() < 1e-4);
            }
        }
    }
}
