// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The colour lookup table.
//!
//! Escape counts run from 0 to 255, and each one gets a colour from a
//! fixed palette modelled on the classic 256-colour VGA/MCGA hardware
//! palette: sixteen basic colours, a sixteen-step grey ramp, a 6x6x6
//! colour cube, and eight more greys.  The palette is described with
//! six bits per channel, the way the hardware DAC took it, and only
//! the final packing step knows about the 5-6-5 pixels the surface
//! stores.

use once_cell::sync::Lazy;

/// A colour with six bits (0..=63) per channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rgb6(pub u8, pub u8, pub u8);

/// A packed 16-bit pixel: five bits of red, six of green, five of blue.
pub type Rgb565 = u16;

const BASIC: [Rgb6; 16] = [
    Rgb6(0, 0, 0),
    Rgb6(0, 0, 42),
    Rgb6(0, 42, 0),
    Rgb6(0, 42, 42),
    Rgb6(42, 0, 0),
    Rgb6(42, 0, 42),
    Rgb6(42, 21, 0),
    Rgb6(42, 42, 42),
    Rgb6(21, 21, 21),
    Rgb6(21, 21, 63),
    Rgb6(21, 63, 21),
    Rgb6(21, 63, 63),
    Rgb6(63, 21, 21),
    Rgb6(63, 21, 63),
    Rgb6(63, 63, 21),
    Rgb6(63, 63, 63),
];

const CUBE_LEVELS: [u8; 6] = [0, 12, 24, 36, 48, 63];

/// First index of the colour cube.
pub const CUBE_START: usize = 32;
/// One past the last index of the colour cube.
pub const CUBE_END: usize = CUBE_START + 216;

impl Rgb6 {
    /// A grey with all three channels at `v`.
    pub fn grey(v: u8) -> Rgb6 {
        Rgb6(v, v, v)
    }

    /// Packs the colour as a 5-6-5 pixel.  Red and blue lose their low
    /// bit; the result is narrowed to sixteen bits, so a channel above
    /// 63 spills into its neighbour exactly as the hardware table did.
    pub fn to_rgb565(self) -> Rgb565 {
        let r5 = u32::from(self.0 >> 1);
        let g6 = u32::from(self.1);
        let b5 = u32::from(self.2 >> 1);
        ((r5 << 11) | (g6 << 5) | b5) as Rgb565
    }
}

/// Expands a 5-6-5 pixel to eight bits per channel, replicating the
/// high bits into the low ones so that full intensity stays 255.
pub fn rgb565_to_rgb8(pixel: Rgb565) -> [u8; 3] {
    let r = ((pixel >> 11) & 0x1f) as u8;
    let g = ((pixel >> 5) & 0x3f) as u8;
    let b = (pixel & 0x1f) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

/// The 256 logical colours, indexed by escape count.  Independent of
/// any pixel format.
pub fn palette() -> [Rgb6; 256] {
    let mut colors = [Rgb6(0, 0, 0); 256];
    colors[..16].copy_from_slice(&BASIC);

    for (i, color) in colors.iter_mut().enumerate().take(32).skip(16) {
        *color = Rgb6::grey(((i - 16) * 4) as u8);
    }

    let cube = iproduct!(
        CUBE_LEVELS.iter(),
        CUBE_LEVELS.iter(),
        CUBE_LEVELS.iter()
    );
    for (color, (&r, &g, &b)) in colors[CUBE_START..CUBE_END].iter_mut().zip(cube) {
        *color = Rgb6(r, g, b);
    }

    for (i, color) in colors.iter_mut().enumerate().skip(CUBE_END) {
        *color = Rgb6::grey(((i - CUBE_END) * 8 + 8) as u8);
    }
    colors
}

/// The escape-count to pixel table.  Built once, read-only afterward.
#[derive(Clone)]
pub struct ColorLut([Rgb565; 256]);

impl ColorLut {
    /// Builds the table by packing every palette entry.
    pub fn build() -> ColorLut {
        let mut table = [0; 256];
        for (slot, color) in table.iter_mut().zip(palette().iter()) {
            *slot = color.to_rgb565();
        }
        ColorLut(table)
    }

    /// The pixel for an escape count.
    #[inline]
    pub fn get(&self, count: u8) -> Rgb565 {
        self.0[count as usize]
    }

    /// All 256 entries.
    pub fn entries(&self) -> &[Rgb565; 256] {
        &self.0
    }
}

impl PartialEq for ColorLut {
    fn eq(&self, other: &ColorLut) -> bool {
        self.0[..] == other.0[..]
    }
}

impl std::fmt::Debug for ColorLut {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

static LUT: Lazy<ColorLut> = Lazy::new(|| {
    debug!("building the 256-entry colour table");
    ColorLut::build()
});

/// Builds a fresh table.
pub fn build_lut() -> ColorLut {
    ColorLut::build()
}

/// The process-wide table, built the first time anybody asks for it.
pub fn shared_lut() -> &'static ColorLut {
    &LUT
}
