use crate::core::color::Color;
use crate::core::framebuffer::{FrameBuffer, Occupant, PixelRecord};
use crate::core::geometry::LineSegment;
use crate::core::intersect::clip_segment_to_rect;
use crate::core::math::numeric::{Real, max_of, min_of};
use crate::core::math::vector::{distance_squared, is_parallel};
use crate::scene::camera::Camera;
use crate::scene::primitive::{Line, Marker};
use nalgebra::{Point2, Point3};
use rayon::prelude::*;

/// Lines whose endpoints are closer to the focus plane than this fraction
/// of the viewport depth are clipped there before projection.
const NEAR_CLIP_DIVISOR: usize = 1024;

/// Draws points and line segments into the same nearest-hit buffer the
/// surfaces use, so overlays and surfaces occlude each other.
pub struct Rasterizer<'a, T: Real> {
    camera: &'a Camera<T>,
    tolerance: T,
}

impl<'a, T: Real> Rasterizer<'a, T> {
    pub fn new(camera: &'a Camera<T>, tolerance: T) -> Self {
        Self { camera, tolerance }
    }

    /// Plots a marker into the single pixel it projects to.
    /// Returns true if the marker won that pixel.
    pub fn draw_point(&self, framebuffer: &mut FrameBuffer<T>, index: usize, marker: &Marker<T>) -> bool {
        self.plot(
            framebuffer,
            Occupant::Point(index),
            &marker.position,
            marker,
        )
    }

    fn plot(
        &self,
        framebuffer: &mut FrameBuffer<T>,
        occupant: Occupant,
        p: &Point3<T>,
        source: &impl HasColor,
    ) -> bool {
        let focus = self.camera.focus();
        if p == focus {
            return false;
        }
        let Some((row, col)) = self.camera.pixel_of(p) else {
            return false;
        };
        framebuffer.depth_test_and_update(
            row,
            col,
            PixelRecord {
                distance: distance_squared(focus, p),
                occupant,
                hit: p.clone(),
                color: source.color(),
            },
        )
    }

    /// Rasterizes a segment. Returns the number of pixels it won.
    ///
    /// A segment collinear with the focus projects to a single point and is
    /// drawn as its two endpoints. Otherwise the part in front of the focus
    /// is projected, clipped to the grid, and every pixel cell the projected
    /// segment touches (scanned with a one pixel pad) takes the depth of the
    /// segment point closest to that pixel's primary ray.
    pub fn draw_line(&self, framebuffer: &mut FrameBuffer<T>, index: usize, line: &Line<T>) -> usize {
        let occupant = Occupant::Line(index);
        let segment = &line.segment;
        if segment.is_degenerate() {
            return self.plot(framebuffer, occupant, &segment.start, line) as usize;
        }

        let focus = self.camera.focus();
        let to_start = &segment.start - focus;
        let to_end = &segment.end - focus;
        if is_parallel(&to_start, &to_end, &self.tolerance) {
            let first = self.plot(framebuffer, occupant, &segment.start, line);
            let second = self.plot(framebuffer, occupant, &segment.end, line);
            return first as usize + second as usize;
        }

        let Some(visible) = self.clip_to_front(segment) else {
            return 0;
        };
        let (Some((r0, c0)), Some((r1, c1))) = (
            self.camera.project(&visible.start),
            self.camera.project(&visible.end),
        ) else {
            return 0;
        };

        let dim = self.camera.dim();
        let dim_t = T::from_usize(dim);
        let Some((p, q)) = clip_segment_to_rect(
            &Point2::new(r0, c0),
            &Point2::new(r1, c1),
            &Point2::new(T::zero(), T::zero()),
            &Point2::new(dim_t.clone(), dim_t),
        ) else {
            return 0;
        };

        let rows = pixel_span(&min_of(p.x.clone(), q.x.clone()), &max_of(p.x.clone(), q.x.clone()), dim);
        let cols = pixel_span(&min_of(p.y.clone(), q.y.clone()), &max_of(p.y.clone(), q.y.clone()), dim);
        let (Some((row_lo, row_hi)), Some((col_lo, col_hi))) = (rows, cols) else {
            return 0;
        };

        let cells: Vec<(usize, usize)> = (row_lo..=row_hi)
            .flat_map(|r| (col_lo..=col_hi).map(move |c| (r, c)))
            .collect();

        let camera = self.camera;
        let candidates: Vec<(usize, usize, PixelRecord<T>)> = cells
            .par_iter()
            .filter_map(|&(row, col)| {
                let lo = Point2::new(T::from_usize(row), T::from_usize(col));
                let hi = Point2::new(T::from_usize(row + 1), T::from_usize(col + 1));
                clip_segment_to_rect(&p, &q, &lo, &hi)?;
                let ray = camera.primary_ray(row, col);
                let hit = visible.closest_point_to_ray(&ray);
                Some((
                    row,
                    col,
                    PixelRecord {
                        distance: distance_squared(focus, &hit),
                        occupant,
                        hit,
                        color: line.color,
                    },
                ))
            })
            .collect();

        let mut won = 0;
        for (row, col, record) in candidates {
            if framebuffer.depth_test_and_update(row, col, record) {
                won += 1;
            }
        }
        won
    }

    /// Part of the segment at least `viewport_depth / 1024` in front of the
    /// focus plane, or `None` if nothing remains.
    fn clip_to_front(&self, segment: &LineSegment<T>) -> Option<LineSegment<T>> {
        let frustum = self.camera.frustum();
        let eps = frustum.viewport_depth().clone() / T::from_usize(NEAR_CLIP_DIVISOR);
        let sa = frustum.depth(&segment.start);
        let sb = frustum.depth(&segment.end);
        if sa < eps && sb < eps {
            return None;
        }
        let mut clipped = segment.clone();
        // One endpoint is at or beyond eps, so the denominators below are non-zero.
        if sa < eps {
            let s = (eps.clone() - sa.clone()) / (sb.clone() - sa.clone());
            clipped.start = segment.at(&s);
        } else if sb < eps {
            let s = (eps - sa.clone()) / (sb - sa);
            clipped.end = segment.at(&s);
        }
        Some(clipped)
    }
}

/// Inclusive pixel range covering fractional grid coordinates `[lo, hi]`,
/// padded by one pixel on each side and clamped to `[0, dim)`.
pub fn pixel_span<T: Real>(lo: &T, hi: &T, dim: usize) -> Option<(usize, usize)> {
    let start = lo.floor_to_i64().saturating_sub(1).max(0);
    let end = hi.floor_to_i64().saturating_add(1).min(dim as i64 - 1);
    if dim == 0 || start > end {
        None
    } else {
        Some((start as usize, end as usize))
    }
}

/// Anything drawn with a single flat color.
trait HasColor {
    fn color(&self) -> Color;
}

impl<T: Real> HasColor for Marker<T> {
    fn color(&self) -> Color {
        self.color
    }
}

impl<T: Real> HasColor for Line<T> {
    fn color(&self) -> Color {
        self.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::numeric::Exact;
    use crate::core::math::vector::point_from_array;
    use crate::scene::viewport::Viewport;
    use nalgebra::Vector3;

    fn camera() -> Camera<Exact> {
        let corners = [
            point_from_array([-1.0, -1.0, 9.0]),
            point_from_array([1.0, -1.0, 9.0]),
            point_from_array([1.0, 1.0, 9.0]),
            point_from_array([-1.0, 1.0, 9.0]),
        ];
        let viewport = Viewport::new(corners, 20, 20).unwrap();
        Camera::new(point_from_array([0.0, 0.0, 10.0]), viewport).unwrap()
    }

    fn red() -> Color {
        Vector3::new(1.0, 0.0, 0.0)
    }

    #[test]
    fn horizontal_line_covers_the_cells_it_crosses() {
        let cam = camera();
        let raster = Rasterizer::new(&cam, <Exact as Real>::default_tolerance());
        let mut fb = FrameBuffer::new(cam.dim());
        let line = Line::new(
            point_from_array([-0.5, 0.25, 0.0]),
            point_from_array([0.5, 0.25, 0.0]),
            red(),
        );
        // projects to row 10.25, cols 9.5..10.5
        assert_eq!(raster.draw_line(&mut fb, 0, &line), 2);
        assert_eq!(fb.record(10, 9).unwrap().occupant, Occupant::Line(0));
        assert_eq!(fb.record(10, 10).unwrap().occupant, Occupant::Line(0));
        assert!(fb.record(9, 10).is_none());
    }

    #[test]
    fn line_through_focus_is_drawn_as_endpoints() {
        let cam = camera();
        let raster = Rasterizer::new(&cam, <Exact as Real>::default_tolerance());
        let mut fb = FrameBuffer::new(cam.dim());
        let line = Line::new(
            point_from_array([0.0, 0.0, 0.0]),
            point_from_array([0.0, 0.0, -5.0]),
            red(),
        );
        // both endpoints land on the same pixel; the nearer one wins
        assert_eq!(raster.draw_line(&mut fb, 3, &line), 1);
        let record = fb.record(10, 10).unwrap();
        assert_eq!(record.distance, <Exact as Real>::from_usize(100));
    }

    #[test]
    fn points_at_the_focus_are_skipped() {
        let cam = camera();
        let raster = Rasterizer::new(&cam, <Exact as Real>::default_tolerance());
        let mut fb = FrameBuffer::new(cam.dim());
        let at_focus = Marker::new(cam.focus().clone(), red());
        assert!(!raster.draw_point(&mut fb, 0, &at_focus));
        let visible = Marker::new(point_from_array([0.25, -0.55, 0.0]), red());
        assert!(raster.draw_point(&mut fb, 1, &visible));
        assert_eq!(fb.record(9, 10).unwrap().occupant, Occupant::Point(1));
    }

    #[test]
    fn line_behind_the_focus_is_not_drawn() {
        let cam = camera();
        let raster = Rasterizer::new(&cam, <Exact as Real>::default_tolerance());
        let mut fb = FrameBuffer::new(cam.dim());
        let line = Line::new(
            point_from_array([-1.0, 0.5, 12.0]),
            point_from_array([1.0, 0.5, 15.0]),
            red(),
        );
        assert_eq!(raster.draw_line(&mut fb, 0, &line), 0);
        assert_eq!(fb.resolved_count(), 0);
    }

    #[test]
    fn span_is_padded_and_clamped() {
        assert_eq!(pixel_span(&2.5, &4.0, 10), Some((1, 5)));
        assert_eq!(pixel_span(&-3.0, &0.2, 10), Some((0, 1)));
        assert_eq!(pixel_span(&12.0, &15.0, 10), None);
    }
}
