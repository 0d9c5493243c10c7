//! Scene: the BVH over the primitives, the light list and the path tracing
//! integrator.

use lume_math::{Bounds3, Ray};
use rand::RngCore;

use crate::sampling::gen_f32;
use crate::{BvhAccel, Color, Intersection, Primitive, RenderConfig, Result};

/// A renderable scene borrowing its primitives.
///
/// Immutable once built, so one scene is shared by every render worker.
pub struct Scene<'p> {
    bvh: BvhAccel<'p, Primitive>,
    /// Handles of the emissive primitives
    lights: Vec<usize>,
    /// Running sum of light areas; `light_cdf[i]` covers `lights[..=i]`
    light_cdf: Vec<f32>,
    emissive_area: f32,
    russian_roulette: f32,
    ray_epsilon: f32,
}

impl<'p> Scene<'p> {
    /// Build the BVH and the area-weighted light table.
    ///
    /// Fails with [`crate::Error::InvalidConfig`] when `config` does not validate.
    pub fn new(primitives: &'p [Primitive], config: &RenderConfig) -> Result<Self> {
        config.validate()?;
        let bvh = BvhAccel::new(primitives, &config.bvh);

        let mut lights = Vec::new();
        let mut light_cdf = Vec::new();
        let mut emissive_area = 0.0;
        for (handle, primitive) in primitives.iter().enumerate() {
            if primitive.has_emit() && primitive.area() > 0.0 {
                emissive_area += primitive.area();
                lights.push(handle);
                light_cdf.push(emissive_area);
            }
        }

        if lights.is_empty() {
            log::warn!("Scene has no emissive primitives; direct lighting is disabled");
        } else {
            log::debug!(
                "Scene lights: {} emissive primitives, total area {:.3}",
                lights.len(),
                emissive_area
            );
        }

        Ok(Self {
            bvh,
            lights,
            light_cdf,
            emissive_area,
            russian_roulette: config.russian_roulette,
            ray_epsilon: config.ray_epsilon,
        })
    }

    /// Nearest hit along `ray`.
    pub fn intersect(&self, ray: &Ray) -> Intersection<'p> {
        self.bvh.intersect(ray)
    }

    /// Pick a point on the lights, uniformly by area.
    ///
    /// Returns the sample and its pdf with respect to area
    /// (`1 / emissive_area`), or `None` when the scene has no emitters.
    pub fn sample_light(&self, rng: &mut dyn RngCore) -> Option<(Intersection<'p>, f32)> {
        if self.lights.is_empty() || !(self.emissive_area > 0.0) {
            return None;
        }

        let target = gen_f32(rng) * self.emissive_area;
        let slot = self
            .light_cdf
            .partition_point(|&area| area <= target)
            .min(self.lights.len() - 1);
        let handle = self.lights[slot];

        let primitives: &'p [Primitive] = self.bvh.primitives();
        let (mut sample, _) = primitives[handle].sample(rng);
        sample.primitive = Some(handle);
        Some((sample, 1.0 / self.emissive_area))
    }

    /// Radiance arriving along `ray`. `depth` is the number of bounces
    /// already taken (0 for camera rays).
    pub fn cast_ray(&self, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        let isect = self.intersect(ray);
        let material = match isect.material {
            Some(material) if isect.happened => material,
            _ => return Color::ZERO,
        };

        // Emitters are seen directly only by camera rays; bounces got their
        // share of the light from the direct term below
        if material.has_emission() {
            return if depth == 0 && isect.front_face {
                material.emission()
            } else {
                Color::ZERO
            };
        }

        let wi = ray.direction;
        let n = isect.normal;
        let origin = isect.point + n * self.ray_epsilon;

        let mut l_dir = Color::ZERO;
        if let Some((light, pdf)) = self.sample_light(rng) {
            let to_light = light.point - origin;
            let dist2 = to_light.length_squared();

            if dist2 > self.ray_epsilon * self.ray_epsilon {
                let shadow = Ray::between(origin, light.point, self.ray_epsilon);
                if !self.intersect(&shadow).happened {
                    let ws = shadow.direction;
                    let cos_surface = ws.dot(n).max(0.0);
                    let cos_light = (-ws).dot(light.normal).max(0.0);
                    l_dir = light.emission() * material.eval(wi, ws, n) * cos_surface * cos_light
                        / dist2
                        / pdf;
                }
            }
        }

        let mut l_indir = Color::ZERO;
        if gen_f32(rng) < self.russian_roulette {
            let wo = material.sample(wi, n, rng);
            let pdf = material.pdf(wi, wo, n);
            if pdf > 0.0 {
                let bounce = Ray::new(origin, wo);
                let li = self.cast_ray(&bounce, depth + 1, rng);
                l_indir = li * material.eval(wi, wo, n) * wo.dot(n) / pdf / self.russian_roulette;
            }
        }

        l_dir + l_indir
    }

    /// Total area of the emissive primitives.
    pub fn emissive_area(&self) -> f32 {
        self.emissive_area
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn bounds(&self) -> Bounds3 {
        self.bvh.bounds()
    }

    pub fn primitive_count(&self) -> usize {
        self.bvh.primitives().len()
    }

    pub fn bvh(&self) -> &BvhAccel<'p, Primitive> {
        &self.bvh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Lambertian, Material, Sphere, Triangle};
    use lume_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn grey() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Vec3::splat(0.5)))
    }

    fn light(le: f32) -> Arc<dyn Material> {
        Arc::new(Lambertian::emissive(Vec3::splat(0.65), Vec3::splat(le)))
    }

    /// Reflects everything but reports every sampled direction as impossible.
    #[derive(Default)]
    struct ZeroPdf {
        pdf_calls: AtomicUsize,
    }

    impl Material for ZeroPdf {
        fn sample(&self, _wi: Vec3, n: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
            n
        }

        fn pdf(&self, _wi: Vec3, _wo: Vec3, _n: Vec3) -> f32 {
            self.pdf_calls.fetch_add(1, Ordering::Relaxed);
            0.0
        }

        fn eval(&self, _wi: Vec3, _wo: Vec3, _n: Vec3) -> Color {
            Color::ONE
        }
    }

    #[test]
    fn test_empty_scene() {
        let primitives: Vec<Primitive> = Vec::new();
        let scene = Scene::new(&primitives, &RenderConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(scene.primitive_count(), 0);
        assert!(scene.bounds().is_empty());
        assert!(scene.sample_light(&mut rng).is_none());
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(!scene.intersect(&ray).happened);
        assert_eq!(scene.cast_ray(&ray, 0, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_light_selection_is_area_weighted() {
        // lights of area 1 and 3, plus a non-emissive triangle
        let small = Triangle::quad(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
            light(1.0),
        );
        let big = Triangle::quad(
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(13.0, 0.0, 0.0),
            Vec3::new(13.0, 0.0, 1.0),
            Vec3::new(10.0, 0.0, 1.0),
            light(1.0),
        );
        let mut primitives: Vec<Primitive> = vec![Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y, grey()).into()];
        primitives.extend(small.into_iter().map(Primitive::from));
        primitives.extend(big.into_iter().map(Primitive::from));

        let scene = Scene::new(&primitives, &RenderConfig::default()).unwrap();
        assert_eq!(scene.light_count(), 4);
        assert!((scene.emissive_area() - 4.0).abs() < 1e-5);

        let mut rng = StdRng::seed_from_u64(3);
        let count = 20_000;
        let mut on_big = 0;
        for _ in 0..count {
            let (sample, pdf) = scene.sample_light(&mut rng).unwrap();
            assert!((pdf - 0.25).abs() < 1e-6);
            assert!(sample.material.unwrap().has_emission());
            assert!(sample.primitive.unwrap() > 0);
            if sample.point.x >= 10.0 {
                on_big += 1;
            }
        }
        let fraction = on_big as f32 / count as f32;
        assert!((fraction - 0.75).abs() < 0.02, "fraction {fraction}");
    }

    #[test]
    fn test_camera_ray_sees_front_of_emitter_only() {
        // light faces -Z (towards the ray origin at z = -5)
        let quad = Triangle::quad(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            light(5.0),
        );
        let primitives: Vec<Primitive> = quad.into_iter().map(Primitive::from).collect();
        assert_eq!(primitives[0].sample(&mut StdRng::seed_from_u64(0)).0.normal, -Vec3::Z);

        let scene = Scene::new(&primitives, &RenderConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let front = Ray::new(Vec3::new(0.1, 0.2, -5.0), Vec3::Z);
        assert_eq!(scene.cast_ray(&front, 0, &mut rng), Vec3::splat(5.0));
        // the same emitter reached by a bounce contributes nothing
        assert_eq!(scene.cast_ray(&front, 1, &mut rng), Color::ZERO);

        let back = Ray::new(Vec3::new(0.1, 0.2, 5.0), -Vec3::Z);
        assert_eq!(scene.cast_ray(&back, 0, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_no_lights_renders_black() {
        let primitives = vec![Primitive::from(Sphere::new(Vec3::ZERO, 1.0, grey()))];
        let scene = Scene::new(&primitives, &RenderConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(2);

        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        for _ in 0..100 {
            assert_eq!(scene.cast_ray(&ray, 0, &mut rng), Color::ZERO);
        }
    }

    #[test]
    fn test_occluded_light_gives_no_direct_light() {
        // floor at y=0, light at y=2 facing down, blocker at y=1 in between
        let config = RenderConfig {
            russian_roulette: 0.0001,
            ..Default::default()
        };
        let mut primitives: Vec<Primitive> = Triangle::quad(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
            grey(),
        )
        .into_iter()
        .map(Primitive::from)
        .collect();
        primitives.extend(
            Triangle::quad(
                Vec3::new(-0.1, 2.0, -0.1),
                Vec3::new(0.1, 2.0, -0.1),
                Vec3::new(0.1, 2.0, 0.1),
                Vec3::new(-0.1, 2.0, 0.1),
                light(10.0),
            )
            .into_iter()
            .map(Primitive::from),
        );
        let open_scene = Scene::new(&primitives, &config).unwrap();

        let mut blocked_primitives = primitives.clone();
        blocked_primitives.push(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 0.5, grey()).into());
        let blocked_scene = Scene::new(&blocked_primitives, &config).unwrap();

        let mut rng = StdRng::seed_from_u64(4);
        // grazing camera ray that passes beside the blocker and lands at the origin
        let ray = Ray::new(Vec3::new(3.0, 0.2, 0.0), Vec3::new(-3.0, -0.2, 0.0));
        let open: f32 = (0..100).map(|_| open_scene.cast_ray(&ray, 0, &mut rng).x).sum();
        let blocked: f32 = (0..100).map(|_| blocked_scene.cast_ray(&ray, 0, &mut rng).x).sum();

        assert!(open > 0.0);
        assert_eq!(blocked, 0.0);
    }

    #[test]
    fn test_rejects_roulette_that_never_terminates() {
        let primitives = vec![Primitive::from(Sphere::new(Vec3::ZERO, 10.0, grey()))];
        for russian_roulette in [0.0, 1.0, 1.5] {
            let config = RenderConfig {
                russian_roulette,
                ..Default::default()
            };
            let result = Scene::new(&primitives, &config);
            assert!(matches!(result, Err(Error::InvalidConfig(_))), "accepted {russian_roulette}");
        }
    }

    #[test]
    fn test_zero_pdf_bounce_is_dropped() {
        let config = RenderConfig {
            russian_roulette: 0.99,
            ..Default::default()
        };
        let casts = 500;
        // looking at the wall of a closed sphere from inside
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.1, 1.0, 0.2));

        // no lights: nothing to gather and no bounce to follow
        let wall = Arc::new(ZeroPdf::default());
        let primitives = vec![Primitive::from(Sphere::new(Vec3::ZERO, 10.0, wall.clone()))];
        let scene = Scene::new(&primitives, &config).unwrap();
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..casts {
            assert_eq!(scene.cast_ray(&ray, 0, &mut rng), Color::ZERO);
        }
        let calls = wall.pdf_calls.load(Ordering::Relaxed);
        assert!(calls > 0 && calls <= casts, "pdf called {calls} times");

        // a light at the center: only the direct term remains, and the
        // bounce towards it would divide zero by zero if it were taken
        let wall = Arc::new(ZeroPdf::default());
        let primitives = vec![
            Primitive::from(Sphere::new(Vec3::ZERO, 10.0, wall.clone())),
            Primitive::from(Sphere::new(Vec3::ZERO, 0.5, light(100.0))),
        ];
        let scene = Scene::new(&primitives, &config).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut lit = 0;
        for _ in 0..casts {
            let l = scene.cast_ray(&ray, 0, &mut rng);
            assert!(l.is_finite() && l.min_element() >= 0.0, "bad radiance {l:?}");
            if l.max_element() > 0.0 {
                lit += 1;
            }
        }
        assert!(lit > 0);
        let calls = wall.pdf_calls.load(Ordering::Relaxed);
        assert!(calls > 0 && calls <= casts, "pdf called {calls} times");
    }
}
