#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which the orbit of `z = z^2 + c` stays bounded.  Points outside
//! the set are coloured by how quickly their orbit escapes, which
//! draws the familiar bands around the black heart.
//!
//! Evaluating every pixel is expensive, and most of the picture is
//! large areas of a single colour.  This renderer traces the border of
//! a rectangle first; if the border is a single colour the inside is
//! painted without further evaluation, and if not the rectangle is
//! split into quarters.  See the `subdivide` module for the details
//! and the caveats.
//!
//! Escape times come from either floating-point or Q16.16 fixed-point
//! arithmetic, and are turned into 16-bit 5-6-5 pixels through a fixed
//! 256-colour table.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate once_cell;

pub mod config;
pub mod errors;
pub mod escape;
pub mod framebuffer;
pub mod palette;
pub mod planes;
pub mod render;
pub mod subdivide;

pub use config::{Method, RenderConfig};
pub use errors::RenderError;
pub use escape::{Evaluator, FixedEvaluator, FloatEvaluator, Regime};
pub use framebuffer::{Framebuffer, Surface};
pub use palette::{build_lut, ColorLut, Rgb565};
pub use planes::{Mode, Pixel, Region, Viewport};
pub use render::{render, render_with};
pub use subdivide::{RenderStats, Subdivider};
