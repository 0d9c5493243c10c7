//! Monte Carlo estimates against closed-form answers.

use std::f32::consts::PI;
use std::sync::Arc;

use lume_renderer::{Color, Lambertian, Material, Primitive, Ray, RenderConfig, Scene, Sphere, Triangle, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn estimate(scene: &Scene<'_>, ray: &Ray, samples: u32, seed: u64) -> Color {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sum = Color::ZERO;
    for _ in 0..samples {
        let l = scene.cast_ray(ray, 0, &mut rng);
        assert!(l.is_finite() && l.min_element() >= 0.0, "bad radiance {l:?}");
        sum += l;
    }
    sum / samples as f32
}

/// Closed diffuse sphere (radius `R`, albedo `ρ`) lit by a small spherical
/// light (radius `r`, radiance `Le`) at its center.
///
/// Every wall point receives `L_dir = ρ·Le·(r/R)²` and sees the rest of the
/// wall, at the same radiance `L`, over a `1 − (r/R)²` cosine-weighted
/// fraction of its hemisphere, so `L = L_dir / (1 − ρ·(1 − (r/R)²))`. Only
/// an unbiased Russian roulette reproduces this for every survival
/// probability.
#[test]
fn test_russian_roulette_is_unbiased() {
    let (big_r, small_r, albedo, le) = (10.0f32, 0.5f32, 0.5f32, 400.0f32);
    let wall: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(albedo)));
    let light: Arc<dyn Material> = Arc::new(Lambertian::emissive(Color::ONE, Color::splat(le)));
    let primitives = vec![
        Primitive::from(Sphere::new(Vec3::ZERO, big_r, wall)),
        Primitive::from(Sphere::new(Vec3::ZERO, small_r, light)),
    ];

    let ratio = (small_r / big_r).powi(2);
    let l_dir = albedo * le * ratio;
    let expected = l_dir / (1.0 - albedo * (1.0 - ratio));

    // look at the wall from inside, away from the light
    let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.1, 1.0, 0.2));

    for (russian_roulette, seed) in [(0.5, 11), (0.8, 12), (0.95, 13)] {
        let config = RenderConfig {
            russian_roulette,
            ..Default::default()
        };
        let scene = Scene::new(&primitives, &config).unwrap();
        let l = estimate(&scene, &ray, 40_000, seed);

        for channel in l.to_array() {
            let error = (channel - expected).abs() / expected;
            assert!(
                error < 0.05,
                "rr {russian_roulette}: got {channel}, expected {expected}"
            );
        }
    }
}

/// Small emissive quad above a diffuse floor: direct lighting only, since
/// nothing the floor reflects towards can bounce light back.
#[test]
fn test_direct_light_over_floor() {
    let (kd, le, half, height) = (0.5f32, 100.0f32, 0.1f32, 2.0f32);
    let floor: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(kd)));
    let light: Arc<dyn Material> = Arc::new(Lambertian::emissive(Color::ONE, Color::splat(le)));

    let mut primitives: Vec<Primitive> = Triangle::quad(
        Vec3::new(-1.0, 0.0, -1.0),
        Vec3::new(1.0, 0.0, -1.0),
        Vec3::new(1.0, 0.0, 1.0),
        Vec3::new(-1.0, 0.0, 1.0),
        floor,
    )
    .into_iter()
    .map(Primitive::from)
    .collect();
    // wound so the geometric normal points down at the floor
    primitives.extend(
        Triangle::quad(
            Vec3::new(-half, height, -half),
            Vec3::new(half, height, -half),
            Vec3::new(half, height, half),
            Vec3::new(-half, height, half),
            light,
        )
        .into_iter()
        .map(Primitive::from),
    );

    // Reference: midpoint rule over the light for E = ∫ Le·cos·cos'/d² dA
    let steps = 64;
    let cell = 2.0 * half / steps as f32;
    let mut irradiance = 0.0f32;
    for i in 0..steps {
        for j in 0..steps {
            let p = Vec3::new(-half + (i as f32 + 0.5) * cell, height, -half + (j as f32 + 0.5) * cell);
            let d2 = p.length_squared();
            let cos = height / d2.sqrt();
            irradiance += le * cos * cos / d2 * cell * cell;
        }
    }
    let expected = kd / PI * irradiance;
    // within a percent of the point-light approximation
    let approx = kd / PI * le * (2.0 * half).powi(2) / (height * height);
    assert!((expected - approx).abs() / approx < 0.02);

    let scene = Scene::new(&primitives, &RenderConfig::default()).unwrap();
    assert!((scene.emissive_area() - 0.04).abs() < 1e-5);

    // lands on the floor at the origin without passing the light
    let ray = Ray::new(Vec3::new(0.5, 1.0, 0.3), Vec3::new(-0.5, -1.0, -0.3));
    let l = estimate(&scene, &ray, 4_000, 21);

    for channel in l.to_array() {
        let error = (channel - expected).abs() / expected;
        assert!(error < 0.02, "got {channel}, expected {expected}");
    }
}

#[test]
fn test_light_seen_directly() {
    let light: Arc<dyn Material> = Arc::new(Lambertian::emissive(Color::ONE, Color::new(1.0, 2.0, 3.0)));
    let primitives = vec![Primitive::from(Sphere::new(Vec3::new(0.0, 0.0, 10.0), 1.0, light))];
    let scene = Scene::new(&primitives, &RenderConfig::default()).unwrap();

    let ray = Ray::new(Vec3::ZERO, Vec3::Z);
    assert_eq!(estimate(&scene, &ray, 10, 1), Color::new(1.0, 2.0, 3.0));
}
