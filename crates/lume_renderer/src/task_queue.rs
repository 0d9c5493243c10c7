//! Lock-free pixel dispenser shared by the render workers.
//!
//! The queue never changes after creation; workers walk through it with a
//! single atomic counter. Every index in `0..width*height` is handed out to
//! exactly one caller, which is what lets workers write their pixels into
//! the framebuffer without locking.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Screen coordinates of one pixel to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelTask {
    pub x: u32,
    pub y: u32,
}

impl PixelTask {
    /// Row-major index of the pixel in an image `width` pixels wide.
    pub fn index(&self, width: u32) -> usize {
        self.y as usize * width as usize + self.x as usize
    }
}

/// Queue of the pixels of a `width × height` image, in row-major order.
#[derive(Debug)]
pub struct TaskQueue {
    width: u32,
    len: usize,
    /// Index of the next pixel; keeps counting past `len` once exhausted
    next: AtomicUsize,
}

impl TaskQueue {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            len: width as usize * height as usize,
            next: AtomicUsize::new(0),
        }
    }

    /// Claim the next pixel, or `None` once every pixel has been handed out.
    ///
    /// `None` is permanent: the counter only grows.
    pub fn fetch(&self) -> Option<PixelTask> {
        // Only uniqueness matters, no other memory is published through it
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        if index >= self.len {
            return None;
        }
        let width = self.width as usize;
        Some(PixelTask {
            x: (index % width) as u32,
            y: (index / width) as u32,
        })
    }

    /// Total number of pixels in the queue.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True once every pixel has been handed out.
    pub fn is_empty(&self) -> bool {
        self.next.load(Ordering::Relaxed) >= self.len
    }

    /// Number of pixels handed out so far.
    pub fn issued(&self) -> usize {
        self.next.load(Ordering::Relaxed).min(self.len)
    }

    /// Iterator that keeps fetching until the queue is exhausted.
    pub fn iter(&self) -> TaskQueueIter<'_> {
        TaskQueueIter { queue: self }
    }
}

/// Iterator to work through the queue from any number of threads.
pub struct TaskQueueIter<'a> {
    queue: &'a TaskQueue,
}

impl Iterator for TaskQueueIter<'_> {
    type Item = PixelTask;

    fn next(&mut self) -> Option<PixelTask> {
        self.queue.fetch()
    }
}
