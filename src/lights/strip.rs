use anyhow::{Context, Error};
use smart_leds::RGB8;

use super::driver::PixelDriver;
use super::pattern::{Pattern, BLACK};

/// One physical run of pixels and the buffer that is shown on the next flush
pub struct Strip {
    name: String,
    pixels: Vec<RGB8>,
    skip: Vec<usize>,
    driver: Box<dyn PixelDriver>,
}

impl Strip {
    pub fn new(name: &str, count: usize, skip: Vec<usize>, driver: Box<dyn PixelDriver>) -> Self {
        Self {
            name: name.to_string(),
            pixels: vec![BLACK; count],
            skip,
            driver,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    pub fn pixel(&self, index: usize) -> Option<RGB8> {
        self.pixels.get(index).copied()
    }

    /// # Panics
    ///
    /// If `index` is not below [`Strip::pixel_count`].
    pub fn set_pixel(&mut self, index: usize, color: RGB8) {
        self.pixels[index] = color;
    }

    pub fn render(&mut self, pattern: Pattern) {
        pattern.render(&mut self.pixels);
    }

    pub fn fill(&mut self, color: RGB8) {
        self.pixels.fill(color);
    }

    /// Turn off every pixel on the skip-list. Entries past the end of the
    /// strip are ignored.
    pub fn apply_mask(&mut self) {
        for &index in &self.skip {
            if let Some(pixel) = self.pixels.get_mut(index) {
                *pixel = BLACK;
            }
        }
    }

    /// Send the buffer to the hardware
    pub fn flush(&mut self) -> Result<(), Error> {
        self.driver
            .show(&self.pixels)
            .with_context(|| format!("flushing strip {}", self.name))
    }
}
