//! Cornell box example.
//!
//! Renders the classic Cornell box and saves it as PPM (or PNG, picked by
//! the output extension).
//!
//! ```text
//! cargo run --release --example cornell_box -- [config.json] [output.ppm]
//! ```

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use lume_renderer::{
    triangles_from_indexed, Color, Lambertian, Material, Primitive, RenderConfig, Renderer, Scene,
    Triangle, Vec3,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut config_path = None;
    let mut output = String::from("cornell_box.ppm");
    for arg in std::env::args().skip(1) {
        if arg.ends_with(".json") {
            config_path = Some(arg);
        } else {
            output = arg;
        }
    }

    let config = match &config_path {
        Some(path) => RenderConfig::from_json_file(path)
            .with_context(|| format!("loading render config {path}"))?,
        None => RenderConfig {
            // scene units are millimetres
            ray_epsilon: 0.01,
            ..Default::default()
        },
    };

    let start = Instant::now();
    let primitives = build_scene();
    let renderer = Renderer::new(config)?;
    let scene = Scene::new(&primitives, renderer.config())?;
    log::info!("Scene built in {:.2?}", start.elapsed());

    let framebuffer = renderer.render(&scene)?;
    framebuffer
        .save(&output)
        .with_context(|| format!("saving {output}"))?;

    Ok(())
}

fn build_scene() -> Vec<Primitive> {
    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.63, 0.065, 0.05)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.14, 0.45, 0.091)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.725, 0.71, 0.68)));
    let light: Arc<dyn Material> = Arc::new(Lambertian::emissive(
        Color::splat(0.65),
        8.0 * Color::new(0.747 + 0.058, 0.747 + 0.258, 0.747)
            + 15.6 * Color::new(0.740 + 0.287, 0.740 + 0.160, 0.740)
            + 18.4 * Color::new(0.737 + 0.642, 0.737 + 0.159, 0.737),
    ));

    let mut primitives = Vec::new();
    let mut quad = |a: [f32; 3], b: [f32; 3], c: [f32; 3], d: [f32; 3], m: &Arc<dyn Material>| {
        let tris = Triangle::quad(a.into(), b.into(), c.into(), d.into(), m.clone());
        primitives.extend(tris.into_iter().map(Primitive::from));
    };

    // Floor, ceiling, back wall
    quad([552.8, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 559.2], [549.6, 0.0, 559.2], &white);
    quad([556.0, 548.8, 0.0], [556.0, 548.8, 559.2], [0.0, 548.8, 559.2], [0.0, 548.8, 0.0], &white);
    quad([549.6, 0.0, 559.2], [0.0, 0.0, 559.2], [0.0, 548.8, 559.2], [556.0, 548.8, 559.2], &white);

    // Side walls
    quad([552.8, 0.0, 0.0], [549.6, 0.0, 559.2], [556.0, 548.8, 559.2], [556.0, 548.8, 0.0], &red);
    quad([0.0, 0.0, 559.2], [0.0, 0.0, 0.0], [0.0, 548.8, 0.0], [0.0, 548.8, 559.2], &green);

    // Area light, just below the ceiling and facing down
    quad([343.0, 548.7, 227.0], [343.0, 548.7, 332.0], [213.0, 548.7, 332.0], [213.0, 548.7, 227.0], &light);

    primitives.extend(block(
        [[130.0, 65.0], [82.0, 225.0], [240.0, 272.0], [290.0, 114.0]],
        165.0,
        white.clone(),
    ));
    primitives.extend(block(
        [[423.0, 247.0], [265.0, 296.0], [314.0, 456.0], [472.0, 406.0]],
        330.0,
        white,
    ));

    log::info!("Cornell box: {} triangles", primitives.len());
    primitives
}

/// Vertical prism over a quad footprint given as (x, z) corners.
fn block(footprint: [[f32; 2]; 4], height: f32, material: Arc<dyn Material>) -> Vec<Primitive> {
    let mut positions = Vec::with_capacity(8);
    for y in [0.0, height] {
        positions.extend(footprint.iter().map(|&[x, z]| Vec3::new(x, y, z)));
    }

    // 0..4 bottom ring, 4..8 top ring
    let mut indices = vec![[4, 5, 6], [4, 6, 7]];
    for i in 0..4u32 {
        let j = (i + 1) % 4;
        indices.push([i, j, j + 4]);
        indices.push([i, j + 4, i + 4]);
    }

    triangles_from_indexed(&positions, &indices, material)
}
