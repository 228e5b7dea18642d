// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time evaluation.
//!
//! A pixel is mapped to a point `c` on the complex plane, and the
//! recurrence `z = z^2 + c` is iterated from `z = c` until `|z|`
//! reaches 2 or 255 iterations have run.  The number of iterations is
//! the escape time; 255 means the point never escaped and is simply
//! the last colour in the table.
//!
//! There are two interchangeable ways to do the arithmetic: ordinary
//! double-precision floats, and Q16.16 fixed point, which is what the
//! integer-only hardware this renderer was first written for could do
//! quickly.  Both implement `Evaluator`, and both give the same count
//! for the overwhelming majority of pixels; they part ways only on the
//! boundary of the set, where any rounding difference is amplified.

use errors::RenderError;
use num::Complex;
use planes::{Pixel, Viewport};
use std::str::FromStr;

/// The iteration cap.  A point still bounded after this many
/// iterations is considered inside the set.
pub const MAX_COUNT: u8 = 255;

/// Anything that can compute an escape time for a pixel.
pub trait Evaluator {
    /// The escape time of the pixel at (`x`, `y`).
    fn escape(&self, x: usize, y: usize) -> u8;

    /// Convenience wrapper for `escape` taking a `Pixel`.
    fn escape_pixel(&self, pixel: &Pixel) -> u8 {
        self.escape(pixel.0, pixel.1)
    }
}

impl<'a, E: Evaluator + ?Sized> Evaluator for &'a E {
    fn escape(&self, x: usize, y: usize) -> u8 {
        (**self).escape(x, y)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn escape(&self, x: usize, y: usize) -> u8 {
        (**self).escape(x, y)
    }
}

/// Iterates the recurrence from `z = c`.
#[inline]
pub fn escape_time(c: Complex<f64>) -> u8 {
    let mut z = c;
    let mut count = 0;
    while z.norm_sqr() < 4.0 && count != MAX_COUNT {
        count += 1;
        z = z * z + c;
    }
    count
}

/// The floating-point evaluator.
#[derive(Clone, Debug)]
pub struct FloatEvaluator {
    viewport: Viewport,
}

impl FloatEvaluator {
    /// Constructor.
    pub fn new(viewport: &Viewport) -> FloatEvaluator {
        FloatEvaluator {
            viewport: *viewport,
        }
    }
}

impl Evaluator for FloatEvaluator {
    #[inline]
    fn escape(&self, x: usize, y: usize) -> u8 {
        escape_time(self.viewport.pixel_to_point(&Pixel(x, y)))
    }
}

/// A Q16.16 fixed-point number: sixteen integer bits and sixteen
/// fractional bits in an `i32`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Q16(pub i32);

impl Q16 {
    /// Number of fractional bits.
    pub const FRACTION_BITS: u32 = 16;
    /// 1.0 in Q16.16.
    pub const ONE: Q16 = Q16(1 << 16);

    /// Converts a float, truncating toward zero.
    pub fn from_f64(v: f64) -> Q16 {
        Q16((v * f64::from(Q16::ONE.0)) as i32)
    }

    /// Converts back to a float.
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / f64::from(Q16::ONE.0)
    }

    /// The raw product of two values: a Q32.32 number in an `i64`.
    #[inline]
    pub fn wide_mul(self, other: Q16) -> i64 {
        i64::from(self.0) * i64::from(other.0)
    }
}

/// `|z|^2 < 4` in Q32.32: four shifted up by twice the fraction width.
const ESCAPE_RADIUS_SQ: i64 = 4 << (2 * Q16::FRACTION_BITS);

/// The largest corner magnitude the fixed-point evaluator accepts.
/// With `|c|` below this, `4 + |c|` fits the sixteen integer bits, the
/// spans stay below 32768, and the sum of squares of any iterate fits
/// an `i64`.
pub const FIXED_LIMIT: f64 = 16384.0;

/// The fixed-point evaluator.  The viewport's corners and spans are
/// scaled to Q16.16 once, at construction.
#[derive(Clone, Debug)]
pub struct FixedEvaluator {
    xmin: Q16,
    ymin: Q16,
    xspan: Q16,
    yspan: Q16,
    xsteps: i64,
    ysteps: i64,
}

impl FixedEvaluator {
    /// Constructor.  Refuses viewports whose corners Q16.16 cannot
    /// hold with enough headroom for the iteration.
    pub fn new(viewport: &Viewport) -> Result<FixedEvaluator, RenderError> {
        let (min, max) = (viewport.complex_plane.0, viewport.complex_plane.1);
        let corners = [min.re, min.im, max.re, max.im];
        if corners.iter().any(|v| !(v.abs() < FIXED_LIMIT)) {
            return Err(RenderError::InvalidViewport(format!(
                "fixed point needs every corner within +/-{}",
                FIXED_LIMIT
            )));
        }
        Ok(FixedEvaluator {
            xmin: Q16::from_f64(min.re),
            ymin: Q16::from_f64(min.im),
            xspan: Q16::from_f64(max.re - min.re),
            yspan: Q16::from_f64(max.im - min.im),
            xsteps: (viewport.width() - 1) as i64,
            ysteps: (viewport.height() - 1) as i64,
        })
    }

    /// The point on the complex plane for a pixel, in Q16.16.
    pub fn pixel_to_point(&self, x: usize, y: usize) -> (Q16, Q16) {
        let cr = i64::from(self.xmin.0) + (x as i64) * i64::from(self.xspan.0) / self.xsteps;
        let ci = i64::from(self.ymin.0) + (y as i64) * i64::from(self.yspan.0) / self.ysteps;
        (Q16(cr as i32), Q16(ci as i32))
    }
}

/// Iterates the recurrence in fixed point.  Products are taken in
/// 64 bits and shifted back down by the fraction width; the sum of
/// squares stays at full width for the comparison.
#[inline]
pub fn escape_time_fixed(cr: Q16, ci: Q16) -> u8 {
    let (mut zr, mut zi) = (cr, ci);
    let mut count = 0;
    while count != MAX_COUNT {
        let rr = zr.wide_mul(zr);
        let ii = zi.wide_mul(zi);
        if rr + ii >= ESCAPE_RADIUS_SQ {
            break;
        }
        count += 1;
        let ri = zr.wide_mul(zi);
        zr = Q16((((rr - ii) >> Q16::FRACTION_BITS) + i64::from(cr.0)) as i32);
        zi = Q16((((2 * ri) >> Q16::FRACTION_BITS) + i64::from(ci.0)) as i32);
    }
    count
}

impl Evaluator for FixedEvaluator {
    #[inline]
    fn escape(&self, x: usize, y: usize) -> u8 {
        let (cr, ci) = self.pixel_to_point(x, y);
        escape_time_fixed(cr, ci)
    }
}

/// Which arithmetic to evaluate escape times with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Regime {
    /// Double-precision floating point.
    Float,
    /// Q16.16 fixed point.
    Fixed,
}

impl Regime {
    /// Builds the evaluator for this regime over a viewport.  Only the
    /// fixed-point regime can refuse one.
    pub fn evaluator(self, viewport: &Viewport) -> Result<Box<dyn Evaluator>, RenderError> {
        let evaluator: Box<dyn Evaluator> = match self {
            Regime::Float => Box::new(FloatEvaluator::new(viewport)),
            Regime::Fixed => Box::new(FixedEvaluator::new(viewport)?),
        };
        Ok(evaluator)
    }
}

impl Default for Regime {
    fn default() -> Regime {
        Regime::Fixed
    }
}

impl FromStr for Regime {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Regime, RenderError> {
        match s {
            "float" | "fp" => Ok(Regime::Float),
            "fixed" | "fx" => Ok(Regime::Fixed),
            _ => Err(RenderError::Parse(format!("unknown regime '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planes::Mode;

    fn both(viewport: &Viewport) -> Vec<Box<dyn Evaluator>> {
        vec![
            Regime::Float.evaluator(viewport).unwrap(),
            Regime::Fixed.evaluator(viewport).unwrap(),
        ]
    }

    #[test]
    fn origin_never_escapes() {
        // An odd-sized plane puts the origin exactly on the centre pixel.
        let vp = Viewport::new(5, 5, Complex::new(-2.0, -2.0), Complex::new(2.0, 2.0)).unwrap();
        for e in both(&vp) {
            assert_eq!(e.escape(2, 2), MAX_COUNT);
        }
        assert_eq!(escape_time(Complex::new(0.0, 0.0)), MAX_COUNT);
        assert_eq!(escape_time_fixed(Q16(0), Q16(0)), MAX_COUNT);
    }

    #[test]
    fn far_points_escape_at_once() {
        let vp = Viewport::new(5, 5, Complex::new(-5.0, -5.0), Complex::new(5.0, 5.0)).unwrap();
        for e in both(&vp) {
            assert!(e.escape(4, 4) <= 2);
            assert!(e.escape(0, 0) <= 2);
        }
        assert!(escape_time(Complex::new(5.0, 5.0)) <= 2);
        assert!(escape_time_fixed(Q16::from_f64(5.0), Q16::from_f64(5.0)) <= 2);
    }

    #[test]
    fn known_points_take_known_times() {
        // c = 1: z starts at 1, then 2, which is already on the circle.
        assert_eq!(escape_time(Complex::new(1.0, 0.0)), 1);
        assert_eq!(escape_time_fixed(Q16::ONE, Q16(0)), 1);
        // c = -1 cycles between -1 and 0 forever.
        assert_eq!(escape_time(Complex::new(-1.0, 0.0)), MAX_COUNT);
        assert_eq!(escape_time_fixed(Q16(-Q16::ONE.0), Q16(0)), MAX_COUNT);
    }

    #[test]
    fn fixed_constants_are_truncated_toward_zero() {
        let fx = FixedEvaluator::new(&Mode::High.viewport()).unwrap();
        assert_eq!(fx.xmin, Q16(-157_286));
        assert_eq!(fx.xspan, Q16(209_715));
        assert_eq!(fx.ymin, Q16(-78_643));
        assert_eq!(fx.yspan, Q16(157_286));
        assert_eq!(fx.pixel_to_point(0, 0), (Q16(-157_286), Q16(-78_643)));
        assert_eq!(fx.pixel_to_point(639, 399), (Q16(52_429), Q16(78_643)));
    }

    #[test]
    fn fixed_point_refuses_unrepresentable_planes() {
        let huge = Viewport::new(
            4,
            4,
            Complex::new(-40_000.0, -40_000.0),
            Complex::new(40_000.0, 40_000.0),
        )
        .unwrap();
        match FixedEvaluator::new(&huge) {
            Err(RenderError::InvalidViewport(_)) => (),
            Err(e) => panic!("unexpected error {:?}", e),
            Ok(_) => panic!("accepted a viewport fixed point cannot hold"),
        }
        assert!(Regime::Fixed.evaluator(&huge).is_err());
        assert!(Regime::Float.evaluator(&huge).is_ok());

        let wide = Viewport::new(3, 3, Complex::new(-100_000.0, -1.0), Complex::new(0.5, 1.0)).unwrap();
        assert!(FixedEvaluator::new(&wide).is_err());
    }

    #[test]
    fn fixed_point_is_safe_at_the_edge_of_its_range() {
        let edge = Viewport::new(
            3,
            3,
            Complex::new(-16_383.0, -16_383.0),
            Complex::new(16_383.0, 16_383.0),
        )
        .unwrap();
        let fx = FixedEvaluator::new(&edge).unwrap();
        for y in 0..3 {
            for x in 0..3 {
                let far = x != 1 || y != 1;
                assert_eq!(fx.escape(x, y) == 0, far);
            }
        }
        assert_eq!(escape_time_fixed(Q16::from_f64(16_383.0), Q16::from_f64(-16_383.0)), 0);
    }

    #[test]
    fn q16_round_trips_simple_values() {
        assert_eq!(Q16::from_f64(1.5), Q16(98_304));
        assert_eq!(Q16(98_304).to_f64(), 1.5);
        assert_eq!(Q16::from_f64(-0.25).to_f64(), -0.25);
    }

    #[test]
    fn regimes_parse() {
        assert_eq!("float".parse::<Regime>(), Ok(Regime::Float));
        assert_eq!("fixed".parse::<Regime>(), Ok(Regime::Fixed));
        assert!("double".parse::<Regime>().is_err());
        assert_eq!(Regime::default(), Regime::Fixed);
    }
}
