// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A dumb, row-major store of 5-6-5 pixels.  Every access is bounds
//! checked; the rasterizer never strays outside the plane, but if it
//! did the caller hears about it instead of scribbling on memory.

use errors::RenderError;
use palette::{rgb565_to_rgb8, Rgb565};

/// Anything the rasterizer can paint onto.
pub trait Surface {
    /// Width in pixels.
    fn width(&self) -> usize;
    /// Height in pixels.
    fn height(&self) -> usize;
    /// Writes one pixel.
    fn set(&mut self, x: usize, y: usize, value: Rgb565) -> Result<(), RenderError>;
    /// Reads one pixel.
    fn get(&self, x: usize, y: usize) -> Result<Rgb565, RenderError>;
}

/// An owned framebuffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb565>,
}

impl Framebuffer {
    /// Allocates a cleared (all zero) framebuffer.
    pub fn new(width: usize, height: usize) -> Framebuffer {
        Framebuffer {
            width,
            height,
            pixels: vec![0 as Rgb565; width * height],
        }
    }

    fn offset(&self, x: usize, y: usize) -> Result<usize, RenderError> {
        if x >= self.width || y >= self.height {
            return Err(RenderError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y * self.width + x)
    }

    /// Sets every pixel to `value`.
    pub fn fill(&mut self, value: Rgb565) {
        for p in self.pixels.iter_mut() {
            *p = value;
        }
    }

    /// The raw pixels, row by row.
    pub fn as_slice(&self) -> &[Rgb565] {
        &self.pixels
    }

    /// One row of pixels.
    pub fn row(&self, y: usize) -> Result<&[Rgb565], RenderError> {
        let start = self.offset(0, y)?;
        Ok(&self.pixels[start..start + self.width])
    }

    /// Expands the buffer to packed 8-bit RGB triples, ready for an
    /// image encoder.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(3 * self.pixels.len());
        for &p in self.pixels.iter() {
            rgb.extend_from_slice(&rgb565_to_rgb8(p));
        }
        rgb
    }
}

impl Surface for Framebuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, value: Rgb565) -> Result<(), RenderError> {
        let offset = self.offset(x, y)?;
        self.pixels[offset] = value;
        Ok(())
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> Result<Rgb565, RenderError> {
        let offset = self.offset(x, y)?;
        Ok(self.pixels[offset])
    }
}
