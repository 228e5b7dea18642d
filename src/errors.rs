// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The single error type shared by the renderer, the surfaces, and the
//! configuration parsers.  The rasterizer itself cannot fail once its
//! preconditions hold, so almost everything here is reported once, at
//! the entry to a render, before any pixel is painted.

/// Everything that can go wrong while setting up or running a render.
#[derive(Debug, Fail, PartialEq)]
pub enum RenderError {
    /// A pixel access landed outside the surface.
    #[fail(
        display = "pixel ({}, {}) is outside the {}x{} surface",
        x, y, width, height
    )]
    OutOfBounds {
        /// Column of the offending access.
        x: usize,
        /// Row of the offending access.
        y: usize,
        /// Width of the surface.
        width: usize,
        /// Height of the surface.
        height: usize,
    },

    /// The pixel plane is too small to map onto the complex plane.  The
    /// mapping divides by `W - 1` and `H - 1`, so both must be at least 2.
    #[fail(display = "invalid plane dimensions {}x{}", width, height)]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// The complex-plane corners are non-finite or out of order.
    #[fail(display = "invalid viewport: {}", _0)]
    InvalidViewport(String),

    /// The minimum tile size must be at least one pixel, or subdivision
    /// never bottoms out.
    #[fail(display = "invalid tile size {}", _0)]
    InvalidTileSize(usize),

    /// The surface handed to the renderer is not the size of the viewport.
    #[fail(
        display = "surface is {}x{} but the viewport expects {}x{}",
        _2, _3, _0, _1
    )]
    SizeMismatch(usize, usize, usize, usize),

    /// A configuration string could not be understood.
    #[fail(display = "{}", _0)]
    Parse(String),
}
