// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The entry points.  Everything is checked here, once, before the
//! first pixel is painted; a render that starts always finishes.

use config::{Method, RenderConfig};
use errors::RenderError;
use framebuffer::Surface;
use palette::shared_lut;
use planes::Viewport;
use subdivide::{scan, RenderStats, Subdivider};

/// Renders the whole viewport onto the surface with the default
/// configuration: fixed-point arithmetic, subdivision, and a minimum
/// tile of four pixels.
pub fn render<S: Surface>(surface: &mut S, viewport: &Viewport) -> Result<RenderStats, RenderError> {
    render_with(surface, viewport, &RenderConfig::default())
}

/// Renders the whole viewport onto the surface.  The surface must be
/// exactly the size of the viewport's pixel plane.
pub fn render_with<S: Surface>(
    surface: &mut S,
    viewport: &Viewport,
    config: &RenderConfig,
) -> Result<RenderStats, RenderError> {
    config.validate()?;
    let viewport = Viewport::new(
        viewport.width(),
        viewport.height(),
        viewport.complex_plane.0,
        viewport.complex_plane.1,
    )?;
    if surface.width() != viewport.width() || surface.height() != viewport.height() {
        return Err(RenderError::SizeMismatch(
            viewport.width(),
            viewport.height(),
            surface.width(),
            surface.height(),
        ));
    }

    debug!(
        "rendering {}x{} with {:?}",
        viewport.width(),
        viewport.height(),
        config
    );
    let lut = shared_lut();
    let evaluator = config.regime.evaluator(&viewport)?;
    let stats = match config.method {
        Method::Subdivide => {
            Subdivider::new(evaluator, lut, config.tile_min)?.rasterize(surface, viewport.region())?
        }
        Method::Scan => scan(surface, &evaluator, lut, viewport.region())?,
    };
    debug!(
        "evaluated {} pixels, filled {}, {} regions, {} splits",
        stats.evaluated, stats.filled, stats.regions, stats.splits
    );
    Ok(stats)
}
