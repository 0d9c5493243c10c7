//! Multi-threaded renderer.
//!
//! A fixed pool of workers pulls pixels from a shared [`TaskQueue`] until it
//! runs dry. Each pixel is averaged over `spp` camera samples and written
//! straight into its own framebuffer slot: the queue hands every index out
//! exactly once, so workers never touch the same slot and the framebuffer
//! needs neither a lock nor atomics.

use std::marker::PhantomData;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{Camera, Color, Framebuffer, PixelTask, RenderConfig, Result, Scene, TaskQueue};

/// Renders scenes with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Create a renderer; fails if the configuration is invalid.
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Path trace `scene` through the configured camera.
    pub fn render(&self, scene: &Scene<'_>) -> Result<Framebuffer> {
        let camera = Camera::from_config(&self.config);
        let spp = self.config.spp;

        log::info!(
            "Rendering {}x{} at {} spp on {} threads ({} primitives, {} lights)",
            self.config.width,
            self.config.height,
            spp,
            self.config.threads,
            scene.primitive_count(),
            scene.light_count()
        );

        self.render_with(|task, rng| {
            let mut color = Color::ZERO;
            for _ in 0..spp {
                let ray = camera.primary_ray(task.x, task.y, rng);
                color += scene.cast_ray(&ray, 0, rng);
            }
            color / spp as f32
        })
    }

    /// Run the worker pool with a caller-provided pixel shader.
    ///
    /// `shade` is called once per pixel, from whichever worker claimed it,
    /// with that worker's random number generator.
    pub fn render_with<F>(&self, shade: F) -> Result<Framebuffer>
    where
        F: Fn(PixelTask, &mut StdRng) -> Color + Sync,
    {
        let (width, height) = (self.config.width, self.config.height);
        let threads = self.config.threads;
        let seed = self.config.seed;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("lume-render-{i}"))
            .build()?;

        let mut framebuffer = Framebuffer::new(width, height);
        let queue = TaskQueue::new(width, height);
        let start = Instant::now();

        {
            let slots = DisjointSlots::new(&mut framebuffer.pixels);
            let queue = &queue;
            let slots = &slots;
            let shade = &shade;

            pool.scope(|s| {
                for worker in 0..threads {
                    s.spawn(move |_| {
                        let mut rng = StdRng::seed_from_u64(worker_seed(seed, worker));
                        let mut pixels = 0usize;

                        for task in queue.iter() {
                            let color = shade(task, &mut rng);
                            // SAFETY: the queue issues every pixel index once
                            unsafe { slots.write(task.index(width), color) };
                            pixels += 1;
                        }

                        log::debug!("Worker {} finished after {} pixels", worker, pixels);
                    });
                }
            });
        }

        log::info!(
            "Rendered {} pixels in {:.2?}",
            queue.issued(),
            start.elapsed()
        );
        Ok(framebuffer)
    }
}

/// Seed of one worker's random stream (SplitMix64 over the base seed and
/// the worker index).
pub fn worker_seed(seed: u64, worker: usize) -> u64 {
    let mut z = seed ^ (worker as u64).wrapping_add(1).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Shared write access to a slice whose slots are each written by at most
/// one thread.
struct DisjointSlots<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

// Writers only ever touch distinct slots, see `write`.
unsafe impl<T: Send> Sync for DisjointSlots<'_, T> {}

impl<'a, T> DisjointSlots<'a, T> {
    fn new(slice: &'a mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            _marker: PhantomData,
        }
    }

    /// Overwrite slot `index`.
    ///
    /// # Safety
    ///
    /// No other call may write or read `index` while this one runs.
    unsafe fn write(&self, index: usize, value: T) {
        assert!(index < self.len, "slot {index} out of range {}", self.len);
        *self.ptr.add(index) = value;
    }
}
