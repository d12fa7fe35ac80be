//! Render the Cornell box to a binary PPM.
//!
//! Usage: `lumen [OUTPUT] [SPP]`, defaulting to `output.ppm` and 16 samples.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use lumen_render::{
    render, Diffuse, Emissive, Material, Primitive, RenderConfig, Scene, TriangleMesh, Vec3,
};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "output.ppm".to_string());
    let spp: u32 = match args.next() {
        Some(s) => s
            .parse()
            .with_context(|| format!("invalid samples-per-pixel: {}", s))?,
        None => 16,
    };

    let scene = cornell_box(784, 784)?;
    let config = RenderConfig {
        samples_per_pixel: spp,
        seed: 0,
    };
    log::info!(
        "rendering {}x{} @ {} spp",
        scene.width,
        scene.height,
        config.samples_per_pixel
    );

    let start = Instant::now();
    let last_percent = AtomicUsize::new(0);
    let progress = move |fraction: f32| {
        let percent = (fraction * 100.0) as usize;
        let previous = last_percent.load(Ordering::Relaxed);
        if percent >= previous + 5 || percent == 100 {
            last_percent.store(percent, Ordering::Relaxed);
            log::info!("rendered {}%", percent);
        }
    };
    let framebuffer = render(&scene, &config, Some(&progress));
    log::info!("render finished in {:.1?}", start.elapsed());

    framebuffer
        .save_ppm(&output)
        .with_context(|| format!("failed to write {}", output))?;
    log::info!("saved {}", output);

    Ok(())
}

/// The classic Cornell box: white floor/ceiling/back wall, red and green
/// side walls, and one area light in the ceiling. Vertex winding keeps
/// every normal pointing into the box interior.
fn cornell_box(width: u32, height: u32) -> Result<Scene> {
    let white: Arc<dyn Material> = Arc::new(Diffuse::new(Vec3::new(0.725, 0.71, 0.68)));
    let red: Arc<dyn Material> = Arc::new(Diffuse::new(Vec3::new(0.63, 0.065, 0.05)));
    let green: Arc<dyn Material> = Arc::new(Diffuse::new(Vec3::new(0.14, 0.45, 0.091)));
    let lamp: Arc<dyn Material> = Arc::new(Emissive::new(
        Vec3::splat(0.65),
        Vec3::new(47.77, 38.57, 31.08),
    ));

    let floor = quad(
        Vec3::new(552.8, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 559.2),
        Vec3::new(549.6, 0.0, 559.2),
        &white,
    )?;
    let ceiling = quad(
        Vec3::new(556.0, 548.8, 0.0),
        Vec3::new(556.0, 548.8, 559.2),
        Vec3::new(0.0, 548.8, 559.2),
        Vec3::new(0.0, 548.8, 0.0),
        &white,
    )?;
    let back_wall = quad(
        Vec3::new(549.6, 0.0, 559.2),
        Vec3::new(0.0, 0.0, 559.2),
        Vec3::new(0.0, 548.8, 559.2),
        Vec3::new(556.0, 548.8, 559.2),
        &white,
    )?;
    let left_wall = quad(
        Vec3::new(552.8, 0.0, 0.0),
        Vec3::new(549.6, 0.0, 559.2),
        Vec3::new(556.0, 548.8, 559.2),
        Vec3::new(556.0, 548.8, 0.0),
        &red,
    )?;
    let right_wall = quad(
        Vec3::new(0.0, 0.0, 559.2),
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 548.8, 0.0),
        Vec3::new(0.0, 548.8, 559.2),
        &green,
    )?;
    let light = quad(
        Vec3::new(343.0, 548.7, 227.0),
        Vec3::new(343.0, 548.7, 332.0),
        Vec3::new(213.0, 548.7, 332.0),
        Vec3::new(213.0, 548.7, 227.0),
        &lamp,
    )?;

    let objects = vec![floor, ceiling, back_wall, left_wall, right_wall, light];
    let scene = Scene::new(
        objects,
        width,
        height,
        40.0,
        Vec3::new(278.0, 273.0, -800.0),
        0.8,
    )?;

    Ok(scene)
}

fn quad(
    p0: Vec3,
    p1: Vec3,
    p2: Vec3,
    p3: Vec3,
    material: &Arc<dyn Material>,
) -> Result<Arc<dyn Primitive>> {
    let mesh = TriangleMesh::quad(p0, p1, p2, p3, Arc::clone(material))?;
    Ok(Arc::new(mesh))
}
