// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The knobs a render takes.  Once built, a configuration is not
//! mutated; the driver assembles one from its command line.

use errors::RenderError;
use escape::Regime;
use planes::Mode;
use std::str::FromStr;

/// The tile size used when nobody asks for another.  Matches the
/// high-resolution mode.
pub const DEFAULT_TILE_MIN: usize = 4;

/// How the plane is rasterized.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Method {
    /// Border-tracing subdivision: regions with a single-coloured
    /// border are filled without evaluating their interior.
    Subdivide,
    /// Evaluate every pixel.  Slow, exact, and the reference the
    /// subdivision is checked against.
    Scan,
}

impl Default for Method {
    fn default() -> Method {
        Method::Subdivide
    }
}

impl FromStr for Method {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Method, RenderError> {
        match s {
            "subdivide" | "recursive" => Ok(Method::Subdivide),
            "scan" | "naive" => Ok(Method::Scan),
            _ => Err(RenderError::Parse(format!("unknown method '{}'", s))),
        }
    }
}

/// Everything a render needs to know besides the viewport.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    /// Float or fixed-point arithmetic.
    pub regime: Regime,
    /// Subdivision or a full scan.
    pub method: Method,
    /// Regions with a side at or below this size are evaluated pixel
    /// by pixel.
    pub tile_min: usize,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            regime: Regime::default(),
            method: Method::default(),
            tile_min: DEFAULT_TILE_MIN,
        }
    }
}

impl RenderConfig {
    /// The default configuration with the mode's own tile size.
    pub fn for_mode(mode: Mode) -> RenderConfig {
        RenderConfig {
            tile_min: mode.tile_min(),
            ..RenderConfig::default()
        }
    }

    /// Builder-style setter for the regime.
    pub fn with_regime(self, regime: Regime) -> RenderConfig {
        RenderConfig { regime, ..self }
    }

    /// Builder-style setter for the method.
    pub fn with_method(self, method: Method) -> RenderConfig {
        RenderConfig { method, ..self }
    }

    /// Builder-style setter for the tile size.
    pub fn with_tile_min(self, tile_min: usize) -> RenderConfig {
        RenderConfig { tile_min, ..self }
    }

    /// Checks the configuration can drive a render.  A zero tile size
    /// would split one-pixel regions into empty ones forever.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.tile_min == 0 {
            return Err(RenderError::InvalidTileSize(self.tile_min));
        }
        Ok(())
    }
}
