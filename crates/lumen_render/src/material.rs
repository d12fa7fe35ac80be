//! Material trait for surface reflectance.

use crate::gen_f32;
use lumen_math::Vec3;
use rand::RngCore;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Trait for materials that describe how light reflects off surfaces.
///
/// Directions follow the integrator's convention: `wi` is the incoming ray
/// direction (pointing toward the surface), `wo` points away from it, and
/// `n` is the geometric normal.
pub trait Material: Send + Sync {
    /// BRDF value for light leaving along `wo`.
    fn eval(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color;

    /// Draw an outgoing direction from the importance distribution.
    fn sample(&self, wi: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3;

    /// Density with which `sample` would have produced `wo`.
    fn pdf(&self, wi: Vec3, wo: Vec3, n: Vec3) -> f32;

    /// Radiance emitted by the surface. Most materials emit nothing.
    fn emission(&self) -> Color {
        Color::ZERO
    }

    /// True iff `emission` is non-zero.
    fn has_emission(&self) -> bool {
        self.emission().length_squared() > 0.0
    }
}

/// Lambertian (diffuse) material with uniform-hemisphere sampling.
#[derive(Clone)]
pub struct Diffuse {
    albedo: Color,
}

impl Diffuse {
    /// Create a new diffuse material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Material for Diffuse {
    fn eval(&self, _wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        if wo.dot(n) > 0.0 {
            self.albedo * std::f32::consts::FRAC_1_PI
        } else {
            Color::ZERO
        }
    }

    fn sample(&self, _wi: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        uniform_hemisphere(n, rng)
    }

    fn pdf(&self, _wi: Vec3, wo: Vec3, n: Vec3) -> f32 {
        if wo.dot(n) > 0.0 {
            0.5 * std::f32::consts::FRAC_1_PI
        } else {
            0.0
        }
    }
}

/// Diffuse area-light emitter: a Lambertian lobe plus constant radiance.
#[derive(Clone)]
pub struct Emissive {
    surface: Diffuse,
    radiance: Color,
}

impl Emissive {
    /// Create a new emitter with the given surface albedo and radiance.
    pub fn new(albedo: Color, radiance: Color) -> Self {
        Self {
            surface: Diffuse::new(albedo),
            radiance,
        }
    }
}

impl Material for Emissive {
    fn eval(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        self.surface.eval(wi, wo, n)
    }

    fn sample(&self, wi: Vec3, n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.surface.sample(wi, n, rng)
    }

    fn pdf(&self, wi: Vec3, wo: Vec3, n: Vec3) -> f32 {
        self.surface.pdf(wi, wo, n)
    }

    fn emission(&self) -> Color {
        self.radiance
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Sample a direction uniformly over the hemisphere around `n` (pdf 1/2pi).
fn uniform_hemisphere(n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let x1 = gen_f32(rng);
    let x2 = gen_f32(rng);

    let z = (1.0 - 2.0 * x1).abs();
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = std::f32::consts::TAU * x2;

    let local = Vec3::new(r * phi.cos(), r * phi.sin(), z);
    to_world(local, n)
}

/// Rotate a z-up local direction into the frame of normal `n`.
#[inline]
fn to_world(a: Vec3, n: Vec3) -> Vec3 {
    // Branch on the dominant axis so the basis never degenerates
    let c = if n.x.abs() > n.y.abs() {
        Vec3::new(n.z, 0.0, -n.x) / (n.x * n.x + n.z * n.z).sqrt()
    } else {
        Vec3::new(0.0, n.z, -n.y) / (n.y * n.y + n.z * n.z).sqrt()
    };
    let b = c.cross(n);
    a.x * b + a.y * c + a.z * n
}
