//! Linear radiance image produced by a render, and its 8-bit output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::RgbImage;

use crate::{Color, Result};

/// Display gamma exponent applied on output.
const OUTPUT_GAMMA: f32 = 0.6;

/// Map one linear channel to a display byte: `round(255 · clamp(v)^0.6)`.
#[inline]
pub fn tonemap_channel(linear: f32) -> u8 {
    // NaN clamps to NaN; treat it as black
    let v = if linear.is_nan() { 0.0 } else { linear.clamp(0.0, 1.0) };
    (255.0 * v.powf(OUTPUT_GAMMA)).round() as u8
}

/// Convert a color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    [
        tonemap_channel(color.x),
        tonemap_channel(color.y),
        tonemap_channel(color.z),
    ]
}

/// Row-major buffer of per-pixel radiance.
#[derive(Debug, Clone)]
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
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Average radiance over the image.
    pub fn mean(&self) -> Color {
        if self.pixels.is_empty() {
            return Color::ZERO;
        }
        self.pixels.iter().copied().sum::<Color>() / self.pixels.len() as f32
    }

    /// Tonemapped bytes, three per pixel, in row-major order.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&c| color_to_rgb(c)).collect()
    }

    /// Write the image as binary PPM (P6).
    pub fn write_ppm<W: Write>(&self, mut writer: W) -> Result<()> {
        write!(writer, "P6\n{} {}\n255\n", self.width, self.height)?;
        writer.write_all(&self.to_rgb_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Save the image as binary PPM.
    pub fn save_ppm(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_ppm(BufWriter::new(file))?;
        log::info!("Saved {}x{} PPM to {}", self.width, self.height, path.as_ref().display());
        Ok(())
    }

    /// Tonemapped copy as an `image` buffer.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| image::Rgb(color_to_rgb(self.get(x, y))))
    }

    /// Save the image, picking the format from the extension.
    ///
    /// `.ppm` goes through [`Framebuffer::save_ppm`]; everything else is
    /// encoded by the `image` crate.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let is_ppm = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));
        if is_ppm {
            return self.save_ppm(path);
        }

        self.to_rgb_image().save(path)?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}
