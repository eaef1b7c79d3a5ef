use crate::core::color::{Color, pack_rgb};
use crate::core::math::numeric::Real;
use nalgebra::Point3;

/// What won a pixel. Indices refer to the render's flattened surface list,
/// or to the overlay line/point lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupant {
    Surface(usize),
    Line(usize),
    Point(usize),
}

/// Nearest-hit bookkeeping for one pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelRecord<T: Real> {
    /// Squared distance from the focus to `hit`.
    pub distance: T,
    pub occupant: Occupant,
    pub hit: Point3<T>,
    pub color: Color,
}

/// Square grid of nearest-hit records, `dim x dim`, indexed `(row, col)`
/// with row 0 at the bottom of the image.
///
/// Updates happen on a single thread; parallel passes produce candidates
/// that are merged here in a fixed order, which keeps the strictly-closer
/// replacement rule deterministic.
#[derive(Debug, Clone)]
pub struct FrameBuffer<T: Real> {
    dim: usize,
    records: Vec<Option<PixelRecord<T>>>,
}

impl<T: Real> FrameBuffer<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            records: vec![None; dim * dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline(always)]
    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.dim && col < self.dim
    }

    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.dim + col
    }

    /// Recorded squared distance at a pixel, if anything has been resolved there.
    pub fn distance(&self, row: usize, col: usize) -> Option<&T> {
        self.record(row, col).map(|r| &r.distance)
    }

    pub fn record(&self, row: usize, col: usize) -> Option<&PixelRecord<T>> {
        if !self.in_bounds(row, col) {
            return None;
        }
        self.records[self.index(row, col)].as_ref()
    }

    /// Whether a hit at squared distance `distance` would win this pixel.
    #[inline]
    pub fn would_accept(&self, row: usize, col: usize, distance: &T) -> bool {
        if !self.in_bounds(row, col) {
            return false;
        }
        match &self.records[self.index(row, col)] {
            Some(current) => *distance < current.distance,
            None => true,
        }
    }

    /// Depth test and update: the record is replaced only when the new
    /// distance is strictly less, so ties keep the earlier winner.
    /// Returns true if the record was written.
    pub fn depth_test_and_update(&mut self, row: usize, col: usize, record: PixelRecord<T>) -> bool {
        if !self.would_accept(row, col, &record.distance) {
            return false;
        }
        let idx = self.index(row, col);
        self.records[idx] = Some(record);
        true
    }

    /// Overwrites the output color of an already resolved pixel.
    pub fn set_color(&mut self, row: usize, col: usize, color: Color) {
        if !self.in_bounds(row, col) {
            return;
        }
        let idx = self.index(row, col);
        if let Some(record) = self.records[idx].as_mut() {
            record.color = color;
        }
    }

    /// Every resolved pixel as `(row, col, record)`, row-major.
    pub fn resolved(&self) -> impl Iterator<Item = (usize, usize, &PixelRecord<T>)> {
        let dim = self.dim;
        self.records
            .iter()
            .enumerate()
            .filter_map(move |(i, r)| r.as_ref().map(|r| (i / dim, i % dim, r)))
    }

    pub fn resolved_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_some()).count()
    }

    /// Assembles the `width x height` packed RGB buffer, top row first.
    ///
    /// Internal row `r` lands on output row `height - 1 - r`; rows and
    /// columns beyond the requested size are dropped. Unresolved pixels keep
    /// `background`.
    pub fn to_packed(&self, width: usize, height: usize, background: u32) -> Vec<u32> {
        let mut out = vec![background; width * height];
        for (row, col, record) in self.resolved() {
            if row >= height || col >= width {
                continue;
            }
            let out_row = height - 1 - row;
            out[out_row * width + col] = pack_rgb(&record.color);
        }
        out
    }
}
