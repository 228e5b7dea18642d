// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Viewport struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a rectangle on the complex plane with an arbitrary pair of
//! corners.  Also contains the Region, the rectangle of pixels the
//! rasterizer works on, and the fixed display modes.
use errors::RenderError;
use num::Complex;
use std::str::FromStr;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the minimum corner and maximum corner of the Complex
/// plane, treating the real part of each value as the x-component and
/// the imaginary part of each value as the y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexPlane(pub Complex<f64>, pub Complex<f64>);

/// Describes the x, y of a point in a region.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// An immutable affine map from the pixel plane `[0,W)x[0,H)` onto the
/// complex rectangle `[xmin,xmax]x[ymin,ymax]`.  Pixel column 0 maps to
/// `xmin` and column `W-1` maps to `xmax`; rows likewise.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// The size of the pixel plane.
    pub integral_plane: IntegralPlane,
    /// The (min, max) corners of the complex plane.
    pub complex_plane: ComplexPlane,
}

impl Viewport {
    /// Constructor.  Takes the dimensions of the integral plane, and the
    /// two corners of the complex plane.  Refuses planes that cannot be
    /// mapped: fewer than two pixels along an axis, non-finite corners,
    /// or corners that are not strictly ordered.
    pub fn new(
        width: usize,
        height: usize,
        min: Complex<f64>,
        max: Complex<f64>,
    ) -> Result<Viewport, RenderError> {
        if width < 2 || height < 2 {
            return Err(RenderError::InvalidDimensions { width, height });
        }

        if !(min.re.is_finite() && min.im.is_finite() && max.re.is_finite() && max.im.is_finite())
        {
            return Err(RenderError::InvalidViewport(
                "The viewport corners must be finite.".to_string(),
            ));
        }

        if max.re <= min.re {
            return Err(RenderError::InvalidViewport(
                "The minimum corner is not to the left of the maximum corner.".to_string(),
            ));
        }

        if max.im <= min.im {
            return Err(RenderError::InvalidViewport(
                "The minimum corner is not below the maximum corner.".to_string(),
            ));
        }

        Ok(Viewport {
            integral_plane: IntegralPlane(width, height),
            complex_plane: ComplexPlane(min, max),
        })
    }

    /// Width of the pixel plane.
    pub fn width(&self) -> usize {
        self.integral_plane.0
    }

    /// Height of the pixel plane.
    pub fn height(&self) -> usize {
        self.integral_plane.1
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// A viewport is never empty; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole pixel plane as a single region.
    pub fn region(&self) -> Region {
        Region::new(0, 0, self.width(), self.height())
    }

    /// Given a pixel on the integral plane, map it to the equivalent
    /// point on the complex plane.  The multiplication happens before
    /// the division so that the far edge lands on the maximum corner.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let ComplexPlane(min, max) = self.complex_plane;
        Complex::new(
            min.re + (pixel.0 as f64) * (max.re - min.re) / ((self.width() - 1) as f64),
            min.im + (pixel.1 as f64) * (max.im - min.im) / ((self.height() - 1) as f64),
        )
    }

    /// Given a point on the complex plane, return the pixel whose centre
    /// lies nearest to it, clamped to the plane.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Pixel {
        let ComplexPlane(min, max) = self.complex_plane;
        let scale = |v: f64, lo: f64, hi: f64, extent: usize| {
            let last = (extent - 1) as f64;
            let p = ((v - lo) * last / (hi - lo)).round();
            p.max(0.0).min(last) as usize
        };
        Pixel(
            scale(point.re, min.re, max.re, self.width()),
            scale(point.im, min.im, max.im, self.height()),
        )
    }
}

/// A rectangle of pixels: top-left corner at (`x`, `y`), `w` wide and
/// `h` tall.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    /// Left column.
    pub x: usize,
    /// Top row.
    pub y: usize,
    /// Width in pixels.
    pub w: usize,
    /// Height in pixels.
    pub h: usize,
}

impl Region {
    /// Constructor.
    pub fn new(x: usize, y: usize, w: usize, h: usize) -> Region {
        Region { x, y, w, h }
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.w * self.h
    }

    /// One past the right-most column.
    pub fn right(&self) -> usize {
        self.x + self.w
    }

    /// One past the bottom row.
    pub fn bottom(&self) -> usize {
        self.y + self.h
    }

    /// Whether the pixel lies inside the region.
    pub fn contains(&self, pixel: &Pixel) -> bool {
        pixel.0 >= self.x && pixel.0 < self.right() && pixel.1 >= self.y && pixel.1 < self.bottom()
    }

    /// Splits the region into four children that tile it exactly, in
    /// the order top-left, top-right, bottom-left, bottom-right.  Odd
    /// sizes put the extra row and column in the right and bottom
    /// children.
    pub fn quadrants(&self) -> [Region; 4] {
        let (w2, h2) = (self.w / 2, self.h / 2);
        [
            Region::new(self.x, self.y, w2, h2),
            Region::new(self.x + w2, self.y, self.w - w2, h2),
            Region::new(self.x, self.y + h2, w2, self.h - h2),
            Region::new(self.x + w2, self.y + h2, self.w - w2, self.h - h2),
        ]
    }
}

/// The display configurations the renderer is tuned for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// 640x400, sixteen bits per pixel.
    High,
    /// 320x200.
    Low,
    /// 320x240, for displays that are not VGA monitors.
    Low240,
}

/// The complex rectangle every mode shows: real axis -2.4 to 0.8,
/// imaginary axis -1.2 to 1.2.
pub const DEFAULT_MIN: Complex<f64> = Complex { re: -2.4, im: -1.2 };
/// See `DEFAULT_MIN`.
pub const DEFAULT_MAX: Complex<f64> = Complex { re: 0.8, im: 1.2 };

impl Mode {
    /// Pixel dimensions of the mode.
    pub fn dimensions(self) -> (usize, usize) {
        match self {
            Mode::High => (640, 400),
            Mode::Low => (320, 200),
            Mode::Low240 => (320, 240),
        }
    }

    /// The tile size below which subdivision gives way to evaluating
    /// every pixel.
    pub fn tile_min(self) -> usize {
        match self {
            Mode::High => 4,
            Mode::Low | Mode::Low240 => 8,
        }
    }

    /// The viewport for this mode.
    pub fn viewport(self) -> Viewport {
        let (width, height) = self.dimensions();
        Viewport {
            integral_plane: IntegralPlane(width, height),
            complex_plane: ComplexPlane(DEFAULT_MIN, DEFAULT_MAX),
        }
    }
}

impl FromStr for Mode {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Mode, RenderError> {
        match s {
            "hires" | "640x400" => Ok(Mode::High),
            "lores" | "320x200" => Ok(Mode::Low),
            "lores240" | "320x240" => Ok(Mode::Low240),
            _ => Err(RenderError::Parse(format!("unknown mode '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_fails_on_bad_shape() {
        let vp = Viewport::new(4, 4, Complex::new(1.0, -1.0), Complex::new(-1.0, 1.0));
        assert!(vp.is_err());
        let vp = Viewport::new(4, 4, Complex::new(-1.0, 1.0), Complex::new(1.0, -1.0));
        assert!(vp.is_err());
    }

    #[test]
    fn viewport_fails_on_degenerate_planes() {
        let vp = Viewport::new(1, 4, Complex::new(-1.0, -1.0), Complex::new(1.0, 1.0));
        assert_eq!(
            vp,
            Err(RenderError::InvalidDimensions {
                width: 1,
                height: 4
            })
        );
        let vp = Viewport::new(4, 4, Complex::new(std::f64::NAN, -1.0), Complex::new(1.0, 1.0));
        assert!(vp.is_err());
    }

    #[test]
    fn viewport_passes_on_good_shape() {
        let vp = Viewport::new(4, 4, Complex::new(-1.0, -1.0), Complex::new(1.0, 1.0));
        assert!(vp.is_ok());
    }

    #[test]
    fn pixel_to_point_is_exact_at_the_corners() {
        let vp = Viewport::new(5, 5, Complex::new(-2.0, -2.0), Complex::new(2.0, 2.0)).unwrap();
        assert_eq!(vp.pixel_to_point(&Pixel(0, 0)), Complex::new(-2.0, -2.0));
        assert_eq!(vp.pixel_to_point(&Pixel(4, 4)), Complex::new(2.0, 2.0));
        assert_eq!(vp.pixel_to_point(&Pixel(2, 2)), Complex::new(0.0, 0.0));
        assert_eq!(vp.pixel_to_point(&Pixel(0, 4)), Complex::new(-2.0, 2.0));
    }

    #[test]
    fn pixel_to_point_on_the_default_plane() {
        let vp = Mode::High.viewport();
        let p = vp.pixel_to_point(&Pixel(639, 399));
        assert!((p.re - 0.8).abs() < 1e-12);
        assert!((p.im - 1.2).abs() < 1e-12);
        assert_eq!(vp.pixel_to_point(&Pixel(0, 0)), DEFAULT_MIN);
    }

    #[test]
    fn point_to_pixel_rounds_and_clamps() {
        let vp = Mode::Low.viewport();
        assert_eq!(vp.point_to_pixel(&Complex::new(-0.5, 0.0)), Pixel(189, 100));
        assert_eq!(vp.point_to_pixel(&Complex::new(-9.0, 9.0)), Pixel(0, 199));
    }

    #[test]
    fn quadrants_tile_the_parent() {
        let parent = Region::new(3, 5, 7, 9);
        let kids = parent.quadrants();
        assert_eq!(kids[0], Region::new(3, 5, 3, 4));
        assert_eq!(kids[1], Region::new(6, 5, 4, 4));
        assert_eq!(kids[2], Region::new(3, 9, 3, 5));
        assert_eq!(kids[3], Region::new(6, 9, 4, 5));
        assert_eq!(kids.iter().map(|r| r.area()).sum::<usize>(), parent.area());
        for y in parent.y..parent.bottom() {
            for x in parent.x..parent.right() {
                let owners = kids.iter().filter(|k| k.contains(&Pixel(x, y))).count();
                assert_eq!(owners, 1);
            }
        }
    }

    #[test]
    fn modes_parse_and_describe_themselves() {
        assert_eq!("hires".parse::<Mode>(), Ok(Mode::High));
        assert_eq!("320x240".parse::<Mode>(), Ok(Mode::Low240));
        assert!("ega".parse::<Mode>().is_err());
        assert_eq!(Mode::High.dimensions(), (640, 400));
        assert_eq!(Mode::Low.tile_min(), 8);
        assert_eq!(Mode::Low240.viewport().height(), 240);
    }
}
