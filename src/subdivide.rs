// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Border-tracing subdivision (the Mariani-Silver trick).
//!
//! The Mandelbrot set is connected, and so are the bands of equal
//! escape time around it.  If every pixel on the border of a rectangle
//! has the same colour, then, very probably, so does every pixel
//! inside it, and the inside can be painted without being evaluated.
//! If the border is not uniform the rectangle is cut into quarters and
//! each quarter is tried again, until the pieces are small enough that
//! it is cheaper just to evaluate every pixel.
//!
//! "Very probably" is doing real work there: a feature smaller than the
//! tile that sits entirely inside a uniform border is painted over.
//! That is the price of the speed, and it is kept.
//!
//! Pending regions live on an explicit stack rather than the call
//! stack.  Children are pushed in reverse so they come off in the
//! order top-left, top-right, bottom-left, bottom-right, which is the
//! order the recursive formulation visits them.

use errors::RenderError;
use escape::Evaluator;
use framebuffer::Surface;
use palette::{ColorLut, Rgb565};
use planes::Region;

/// Counters from one rasterization.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Pixels whose escape time was computed.
    pub evaluated: usize,
    /// Pixels painted from a uniform border without being evaluated.
    pub filled: usize,
    /// Regions taken off the work stack.
    pub regions: usize,
    /// Regions that failed the border test and were split.
    pub splits: usize,
}

/// The subdivision rasterizer.  Borrows the colour table and owns an
/// evaluator; holds no state of its own between calls.
pub struct Subdivider<'a, E: Evaluator> {
    evaluator: E,
    lut: &'a ColorLut,
    tile_min: usize,
}

impl<'a, E: Evaluator> Subdivider<'a, E> {
    /// Constructor.  `tile_min` must be at least one.
    pub fn new(evaluator: E, lut: &'a ColorLut, tile_min: usize) -> Result<Self, RenderError> {
        if tile_min == 0 {
            return Err(RenderError::InvalidTileSize(tile_min));
        }
        Ok(Subdivider {
            evaluator,
            lut,
            tile_min,
        })
    }

    /// Evaluates one pixel, writes its colour, and returns the colour.
    #[inline]
    fn paint<S: Surface>(
        &self,
        surface: &mut S,
        x: usize,
        y: usize,
        stats: &mut RenderStats,
    ) -> Result<Rgb565, RenderError> {
        let color = self.lut.get(self.evaluator.escape(x, y));
        stats.evaluated += 1;
        surface.set(x, y, color)?;
        Ok(color)
    }

    fn paint_all<S: Surface>(
        &self,
        surface: &mut S,
        region: Region,
        stats: &mut RenderStats,
    ) -> Result<(), RenderError> {
        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                self.paint(surface, x, y, stats)?;
            }
        }
        Ok(())
    }

    /// Paints the border of the region: the top and bottom rows first,
    /// a column at a time, then the left and right columns without the
    /// corners.  Stops at the first pixel that differs from the top-left
    /// corner.  Returns the border colour if the whole border matched.
    fn trace_border<S: Surface>(
        &self,
        surface: &mut S,
        region: Region,
        stats: &mut RenderStats,
    ) -> Result<Option<Rgb565>, RenderError> {
        let (left, right) = (region.x, region.right() - 1);
        let (top, bottom) = (region.y, region.bottom() - 1);

        let cref = self.paint(surface, left, top, stats)?;
        if self.paint(surface, left, bottom, stats)? != cref {
            return Ok(None);
        }

        for x in left + 1..=right {
            if self.paint(surface, x, top, stats)? != cref
                || self.paint(surface, x, bottom, stats)? != cref
            {
                return Ok(None);
            }
        }

        for y in top + 1..bottom {
            if self.paint(surface, left, y, stats)? != cref
                || self.paint(surface, right, y, stats)? != cref
            {
                return Ok(None);
            }
        }

        Ok(Some(cref))
    }

    fn fill_interior<S: Surface>(
        &self,
        surface: &mut S,
        region: Region,
        color: Rgb565,
        stats: &mut RenderStats,
    ) -> Result<(), RenderError> {
        for y in region.y + 1..region.bottom() - 1 {
            for x in region.x + 1..region.right() - 1 {
                surface.set(x, y, color)?;
                stats.filled += 1;
            }
        }
        Ok(())
    }

    /// Rasterizes `region` onto the surface.
    pub fn rasterize<S: Surface>(
        &self,
        surface: &mut S,
        region: Region,
    ) -> Result<RenderStats, RenderError> {
        let mut stats = RenderStats::default();
        let mut pending = vec![region];

        while let Some(region) = pending.pop() {
            stats.regions += 1;
            if region.w <= self.tile_min || region.h <= self.tile_min {
                self.paint_all(surface, region, &mut stats)?;
                continue;
            }

            match self.trace_border(surface, region, &mut stats)? {
                Some(color) => {
                    trace!("{:?} is uniform ({:#06x})", region, color);
                    self.fill_interior(surface, region, color, &mut stats)?;
                }
                None => {
                    trace!("{:?} split", region);
                    stats.splits += 1;
                    pending.extend(region.quadrants().iter().rev().cloned());
                }
            }
        }

        Ok(stats)
    }
}

/// Evaluates and paints every pixel of the region, row by row.
pub fn scan<S: Surface, E: Evaluator>(
    surface: &mut S,
    evaluator: &E,
    lut: &ColorLut,
    region: Region,
) -> Result<RenderStats, RenderError> {
    let mut stats = RenderStats {
        regions: 1,
        ..RenderStats::default()
    };
    for (y, x) in iproduct!(region.y..region.bottom(), region.x..region.right()) {
        surface.set(x, y, lut.get(evaluator.escape(x, y)))?;
        stats.evaluated += 1;
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use framebuffer::Framebuffer;
    use palette::build_lut;
    use std::cell::Cell;

    /// An evaluator defined by a closure, counting its calls.
    struct FnEvaluator<F: Fn(usize, usize) -> u8> {
        f: F,
        calls: Cell<usize>,
    }

    impl<F: Fn(usize, usize) -> u8> FnEvaluator<F> {
        fn new(f: F) -> Self {
            FnEvaluator {
                f,
                calls: Cell::new(0),
            }
        }
    }

    impl<F: Fn(usize, usize) -> u8> Evaluator for FnEvaluator<F> {
        fn escape(&self, x: usize, y: usize) -> u8 {
            self.calls.set(self.calls.get() + 1);
            (self.f)(x, y)
        }
    }

    /// Records every write so tests can look at the order and count.
    struct Recorder {
        inner: Framebuffer,
        writes: Vec<(usize, usize)>,
    }

    impl Recorder {
        fn new(width: usize, height: usize) -> Self {
            Recorder {
                inner: Framebuffer::new(width, height),
                writes: vec![],
            }
        }
    }

    impl Surface for Recorder {
        fn width(&self) -> usize {
            self.inner.width()
        }
        fn height(&self) -> usize {
            self.inner.height()
        }
        fn set(&mut self, x: usize, y: usize, value: Rgb565) -> Result<(), RenderError> {
            self.writes.push((x, y));
            self.inner.set(x, y, value)
        }
        fn get(&self, x: usize, y: usize) -> Result<Rgb565, RenderError> {
            self.inner.get(x, y)
        }
    }

    #[test]
    fn zero_tile_is_refused() {
        let lut = build_lut();
        assert!(Subdivider::new(FnEvaluator::new(|_, _| 0), &lut, 0).is_err());
    }

    #[test]
    fn uniform_plane_evaluates_only_the_border() {
        let lut = build_lut();
        let sub = Subdivider::new(FnEvaluator::new(|_, _| 40), &lut, 4).unwrap();
        let mut fb = Framebuffer::new(20, 10);
        let stats = sub.rasterize(&mut fb, Region::new(0, 0, 20, 10)).unwrap();

        assert_eq!(stats.evaluated, 2 * 20 + 2 * 8);
        assert_eq!(stats.filled, 18 * 8);
        assert_eq!(stats.splits, 0);
        assert_eq!(sub.evaluator.calls.get(), stats.evaluated);
        assert!(fb.as_slice().iter().all(|&p| p == lut.get(40)));
    }

    #[test]
    fn small_regions_are_scanned() {
        let lut = build_lut();
        let sub = Subdivider::new(FnEvaluator::new(|x, y| (x + y) as u8), &lut, 4).unwrap();
        let mut fb = Framebuffer::new(4, 30);
        let stats = sub.rasterize(&mut fb, Region::new(0, 0, 4, 30)).unwrap();
        assert_eq!(stats.evaluated, 120);
        assert_eq!(stats.filled, 0);
        assert_eq!(fb.get(3, 29), Ok(lut.get(32)));
    }

    #[test]
    fn a_split_visits_children_in_order() {
        let lut = build_lut();
        // Different colours on the left and right halves force a split
        // of the root, and every child is uniform.
        let sub = Subdivider::new(FnEvaluator::new(|x, _| if x < 8 { 1 } else { 2 }), &lut, 2)
            .unwrap();
        let mut rec = Recorder::new(16, 16);
        let stats = sub.rasterize(&mut rec, Region::new(0, 0, 16, 16)).unwrap();
        assert_eq!(stats.splits, 1);
        assert_eq!(stats.regions, 5);

        // The first write after the root gives up is each child's
        // top-left corner.
        let corners: Vec<(usize, usize)> = rec
            .writes
            .iter()
            .cloned()
            .filter(|&w| w == (0, 0) || w == (8, 0) || w == (0, 8) || w == (8, 8))
            .collect();
        let expected: [(usize, usize); 4] = [(0, 0), (8, 0), (0, 8), (8, 8)];
        assert_eq!(&corners[corners.len() - 4..], &expected[..]);

        for y in 0..16 {
            for x in 0..16 {
                let expected = lut.get(if x < 8 { 1 } else { 2 });
                assert_eq!(rec.get(x, y), Ok(expected));
            }
        }
    }

    #[test]
    fn islands_inside_a_uniform_border_are_missed() {
        let lut = build_lut();
        let island = |x: usize, y: usize| if (x, y) == (10, 10) { 200 } else { 3 };
        let sub = Subdivider::new(FnEvaluator::new(island), &lut, 4).unwrap();
        let mut fb = Framebuffer::new(21, 21);
        sub.rasterize(&mut fb, Region::new(0, 0, 21, 21)).unwrap();
        assert_eq!(fb.get(10, 10), Ok(lut.get(3)));

        let mut exact = Framebuffer::new(21, 21);
        scan(&mut exact, &FnEvaluator::new(island), &lut, Region::new(0, 0, 21, 21)).unwrap();
        assert_eq!(exact.get(10, 10), Ok(lut.get(200)));
    }

    #[test]
    fn homogeneity_is_judged_on_colours() {
        let lut = build_lut();
        // Counts 0, 16 and 32 are all packed to black.
        let sub = Subdivider::new(
            FnEvaluator::new(|x, _| [0u8, 16, 32][x % 3]),
            &lut,
            2,
        )
        .unwrap();
        let mut fb = Framebuffer::new(12, 12);
        let stats = sub.rasterize(&mut fb, Region::new(0, 0, 12, 12)).unwrap();
        assert_eq!(stats.splits, 0);
        assert_eq!(stats.filled, 100);
    }

    #[test]
    fn out_of_range_regions_are_reported() {
        let lut = build_lut();
        let sub = Subdivider::new(FnEvaluator::new(|_, _| 0), &lut, 4).unwrap();
        let mut fb = Framebuffer::new(8, 8);
        let err = sub.rasterize(&mut fb, Region::new(0, 0, 9, 9)).unwrap_err();
        match err {
            RenderError::OutOfBounds { .. } => (),
            e => panic!("unexpected error {:?}", e),
        }
    }

    #[test]
    fn scan_paints_everything_once() {
        let lut = build_lut();
        let mut rec = Recorder::new(7, 5);
        let stats = scan(
            &mut rec,
            &FnEvaluator::new(|x, y| (x * y) as u8),
            &lut,
            Region::new(0, 0, 7, 5),
        )
        .unwrap();
        assert_eq!(stats.evaluated, 35);
        assert_eq!(rec.writes.len(), 35);
        assert_eq!(rec.writes[1], (1, 0));
        assert_eq!(rec.get(6, 4), Ok(lut.get(24)));
    }
}
