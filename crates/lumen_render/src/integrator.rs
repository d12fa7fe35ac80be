//! Recursive Monte-Carlo path integrator.
//!
//! One light sample for direct illumination plus one importance-sampled
//! indirect bounce per recursion, terminated by Russian roulette. There is
//! no maximum-depth cap; expected depth is 1/(1 - continuation) and the
//! inverse weighting keeps the estimator unbiased.

use crate::gen_f32;
use crate::primitive::Intersection;
use crate::scene::Scene;
use lumen_math::{Interval, Ray, Vec3};
use rand::RngCore;

/// Slack when comparing a shadow hit against the distance to the sampled
/// light point. Too small re-introduces shadow acne on large scenes; too
/// large leaks light around silhouette edges.
pub const SHADOW_EPSILON: f32 = 1e-3;

/// Lower t bound for every ray, so a scattered ray never re-hits its own
/// origin surface at t ~ 0.
const T_MIN: f32 = 1e-3;

/// Densities below this are treated as "no contribution" instead of being
/// divided through.
const PDF_EPSILON: f32 = 1e-6;

/// Estimate the radiance arriving along `ray`.
///
/// `depth` is 0 for primary rays; emissive surfaces are only returned
/// directly at depth 0, deeper encounters are already accounted for by the
/// explicit light sampling (no double counting).
pub fn cast_ray(scene: &Scene, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Vec3 {
    let t_range = Interval::new(T_MIN, f32::INFINITY);

    let mut hit = Intersection::default();
    if !scene.intersect(ray, t_range, &mut hit) {
        return Vec3::ZERO;
    }

    if hit.material.has_emission() {
        return if depth == 0 { hit.emit } else { Vec3::ZERO };
    }

    // Direct term: one area-light sample with an occlusion test
    let mut direct = Vec3::ZERO;
    let light = scene.sample_light(rng);
    let to_light = light.p - hit.p;
    let dist = to_light.length();

    if dist > SHADOW_EPSILON && light.pdf > PDF_EPSILON {
        let ws = to_light / dist;
        let cos_surface = ws.dot(hit.normal);
        let cos_light = (-ws).dot(light.normal);

        if cos_surface > 0.0 && cos_light > 0.0 {
            let shadow_ray = Ray::new(hit.p, ws);
            let mut occluder = Intersection::default();
            let blocked = scene.intersect(&shadow_ray, t_range, &mut occluder)
                && occluder.t + SHADOW_EPSILON < dist;

            if !blocked {
                direct = light.emit
                    * hit.material.eval(ray.direction, ws, hit.normal)
                    * cos_surface
                    * cos_light
                    / (dist * dist)
                    / light.pdf;
            }
        }
    }

    // Russian roulette: stop here or pay for the survivors
    if gen_f32(rng) > scene.russian_roulette {
        return direct;
    }

    // Indirect term: importance-sample the BRDF and recurse
    let wo = hit.material.sample(ray.direction, hit.normal, rng);
    let pdf = hit.material.pdf(ray.direction, wo, hit.normal);
    let cos_out = wo.dot(hit.normal);
    if pdf <= PDF_EPSILON || cos_out <= 0.0 {
        return direct;
    }

    let indirect_ray = Ray::new(hit.p, wo);
    let radiance = cast_ray(scene, &indirect_ray, depth + 1, rng);
    let indirect = radiance * hit.material.eval(ray.direction, wo, hit.normal) * cos_out
        / pdf
        / scene.russian_roulette;

    direct + indirect
}
