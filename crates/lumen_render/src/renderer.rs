//! Parallel render driver and framebuffer output.
//!
//! The pixel grid is partitioned into rows; rayon renders rows in parallel
//! and each pixel cell is written by exactly one worker, so the framebuffer
//! needs no locking. Every pixel derives its own seeded RNG from the config
//! seed, which makes output bit-identical across runs and thread counts.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::integrator::cast_ray;
use crate::material::Color;
use crate::scene::Scene;
use lumen_math::{Ray, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Stochastic estimates averaged per pixel
    pub samples_per_pixel: u32,
    /// Base seed every pixel derives its RNG from
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 16,
            seed: 0,
        }
    }
}

/// Progress sink: receives a fraction in [0, 1], strictly increasing calls.
pub type ProgressFn = dyn Fn(f32) + Send + Sync;

/// Accumulated radiance per pixel, row-major top-to-bottom.
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl Framebuffer {
    /// Create a new framebuffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Serialize as binary PPM: `P6\n<w> <h>\n255\n` followed by tone-mapped
    /// RGB byte triplets.
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        for color in &self.pixels {
            out.write_all(&color_to_rgb(*color))?;
        }
        Ok(())
    }

    /// Write the PPM to a file. I/O failures are fatal for the render.
    pub fn save_ppm<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_ppm(&mut writer)?;
        writer.flush()
    }
}

/// Tone map a radiance value to 8-bit RGB: 255 * clamp(v)^0.6 per channel.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let r = (255.0 * color.x.clamp(0.0, 1.0).powf(0.6)) as u8;
    let g = (255.0 * color.y.clamp(0.0, 1.0).powf(0.6)) as u8;
    let b = (255.0 * color.z.clamp(0.0, 1.0).powf(0.6)) as u8;
    [r, g, b]
}

/// Render the scene into a framebuffer.
///
/// Casts `samples_per_pixel` primary rays through each pixel center (no
/// jitter) and averages the estimates. The returned framebuffer is complete;
/// rayon's parallel iteration is the completion barrier. The progress
/// callback, if any, is invoked at most once per finished row and only with
/// increasing fractions.
pub fn render(scene: &Scene, config: &RenderConfig, progress: Option<&ProgressFn>) -> Framebuffer {
    let width = scene.width as usize;
    let height = scene.height as usize;
    let scale = (scene.fov.to_radians() * 0.5).tan();
    let aspect = scene.width as f32 / scene.height as f32;
    let spp = config.samples_per_pixel.max(1);

    let mut framebuffer = Framebuffer::new(scene.width, scene.height);
    let rows_done = AtomicUsize::new(0);
    let last_reported = Mutex::new(0.0_f32);

    framebuffer
        .pixels
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(j, row)| {
            for (i, pixel) in row.iter_mut().enumerate() {
                let mut rng = StdRng::seed_from_u64(pixel_seed(config.seed, j * width + i));
                let ray = primary_ray(scene, i, j, scale, aspect);

                let mut color = Color::ZERO;
                for _ in 0..spp {
                    color += cast_ray(scene, &ray, 0, &mut rng);
                }
                *pixel = color / spp as f32;
            }

            let done = rows_done.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(report) = progress {
                let fraction = done as f32 / height as f32;
                // Drop out-of-order completions so the sink only ever sees
                // a non-decreasing sequence
                if let Ok(mut last) = last_reported.lock() {
                    if fraction > *last {
                        *last = fraction;
                        report(fraction);
                    }
                }
            }
        });

    framebuffer
}

/// Primary ray through the center of pixel (i, j).
///
/// The camera looks down +Z with the x axis mirrored, the viewing
/// convention the Cornell-box scene description assumes.
fn primary_ray(scene: &Scene, i: usize, j: usize, scale: f32, aspect: f32) -> Ray {
    let x = (2.0 * (i as f32 + 0.5) / scene.width as f32 - 1.0) * scale * aspect;
    let y = (1.0 - 2.0 * (j as f32 + 0.5) / scene.height as f32) * scale;

    Ray::new(scene.eye, Vec3::new(-x, y, 1.0).normalize())
}

/// Decorrelate per-pixel RNG streams from one base seed.
#[inline]
fn pixel_seed(seed: u64, pixel_index: usize) -> u64 {
    (pixel_index as u64 + 1)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(seed)
}
