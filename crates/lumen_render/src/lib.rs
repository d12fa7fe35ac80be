//! Lumen - offline CPU path tracing.
//!
//! A Monte Carlo path tracer over triangle meshes: BVH-accelerated ray
//! intersection, area-light sampling with a recursive direct+indirect
//! estimator, and a rayon-parallel render driver writing binary PPM.

mod bvh;
mod integrator;
mod material;
mod primitive;
mod renderer;
mod scene;
mod triangle;

pub use bvh::{Bvh, BvhError};
pub use integrator::{cast_ray, SHADOW_EPSILON};
pub use material::{Color, Diffuse, Emissive, Material};
pub use primitive::{Intersection, LightSample, Primitive};
pub use renderer::{color_to_rgb, render, Framebuffer, ProgressFn, RenderConfig};
pub use scene::{Scene, SceneError};
pub use triangle::{Triangle, TriangleMesh};

/// Re-export common math types from lumen_math
pub use lumen_math::{Aabb, Interval, Ray, Vec3};

use rand::RngCore;

/// Uniform f32 in [0, 1) from a dynamically dispatched RNG.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    // 24 mantissa bits keep the result strictly below 1.0
    (rng.next_u32() >> 8) as f32 * (1.0 / (1 << 24) as f32)
}
