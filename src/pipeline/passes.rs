use crate::core::framebuffer::{FrameBuffer, Occupant, PixelRecord};
use crate::core::geometry::Ray;
use crate::core::intersect::Intersection;
use crate::core::math::numeric::{Real, max_of, min_of};
use crate::core::math::vector::{distance_squared, vector_from_f64};
use crate::core::rasterizer::{Rasterizer, pixel_span};
use crate::error::RenderError;
use crate::pipeline::renderer::{CancelToken, RenderStats};
use crate::scene::camera::Camera;
use crate::scene::light::Lighting;
use crate::scene::primitive::{Facet, Line, Marker};
use log::{debug, trace};
use nalgebra::Point3;
use rayon::prelude::*;
use std::cmp::Ordering;

/// Shadow rays are traced in batches of this many pixels so cancellation is
/// noticed between batches.
const SHADOW_BATCH: usize = 4096;

/// Surfaces worth scanning, as `(surface index, bound)` sorted by bound.
///
/// The bound is the exact squared distance from the focus to the closest
/// point of the surface, so no hit on that surface can be nearer. Surfaces
/// that are degenerate or lie entirely outside the view volume are dropped.
/// The sort is stable: equal bounds keep insertion order.
pub fn order_surfaces<T: Real>(
    camera: &Camera<T>,
    surfaces: &[&Facet<T>],
    tolerance: &T,
) -> Vec<(usize, T)> {
    let focus = camera.focus();
    let frustum = camera.frustum();
    let mut order: Vec<(usize, T)> = surfaces
        .par_iter()
        .enumerate()
        .filter_map(|(index, facet)| {
            if facet.is_degenerate(tolerance) {
                trace!("Surface {index} is degenerate, skipped");
                return None;
            }
            if frustum.excludes(facet.vertices()) {
                return None;
            }
            facet.distance_squared_from(focus).map(|bound| (index, bound))
        })
        .collect();
    order.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    order
}

/// Pixels whose primary ray could hit `facet`.
///
/// When the whole facet is in front of the focus, its projection is convex
/// hull of the projected vertices and the padded bounding box of those is
/// enough. Otherwise every pixel of the grid is a candidate.
pub fn candidate_pixels<T: Real>(camera: &Camera<T>, facet: &Facet<T>) -> Vec<(usize, usize)> {
    let dim = camera.dim();
    let whole_grid = || -> Vec<(usize, usize)> {
        (0..dim).flat_map(|r| (0..dim).map(move |c| (r, c))).collect()
    };

    let frustum = camera.frustum();
    if !facet.vertices().iter().all(|v| frustum.in_front(v)) {
        return whole_grid();
    }

    let mut extent: Option<(T, T, T, T)> = None;
    for v in facet.vertices() {
        let Some((row, col)) = camera.project(v) else {
            return whole_grid();
        };
        extent = Some(match extent {
            None => (row.clone(), row, col.clone(), col),
            Some((r0, r1, c0, c1)) => (
                min_of(r0, row.clone()),
                max_of(r1, row),
                min_of(c0, col.clone()),
                max_of(c1, col),
            ),
        });
    }
    let Some((r0, r1, c0, c1)) = extent else {
        return Vec::new();
    };
    match (pixel_span(&r0, &r1, dim), pixel_span(&c0, &c1, dim)) {
        (Some((row_lo, row_hi)), Some((col_lo, col_hi))) => (row_lo..=row_hi)
            .flat_map(|r| (col_lo..=col_hi).map(move |c| (r, c)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Finds the nearest surface hit for every pixel.
///
/// Surfaces are visited in `order`. A pixel is skipped for a surface when it
/// already holds a hit nearer than that surface's bound; the remaining
/// intersections run in parallel and are merged in pixel order, so the
/// result does not depend on thread scheduling. Ties keep the earlier
/// surface. An intersection that cannot be decided is logged, counted in
/// `stats.indeterminate` and leaves the pixel to the other surfaces.
pub fn resolve_surfaces<T: Real>(
    camera: &mut Camera<T>,
    surfaces: &[&Facet<T>],
    order: &[(usize, T)],
    frame: &mut FrameBuffer<T>,
    tolerance: &T,
    cancel: &CancelToken,
    stats: &mut RenderStats,
) -> Result<(), RenderError> {
    for (index, bound) in order {
        cancel.check()?;
        let facet = surfaces[*index];
        let pixels: Vec<(usize, usize)> = candidate_pixels(camera, facet)
            .into_iter()
            .filter(|&(row, col)| frame.distance(row, col).is_none_or(|d| bound <= d))
            .collect();
        if pixels.is_empty() {
            continue;
        }

        camera.warm_rays(&pixels);
        let cam: &Camera<T> = camera;
        let hits: Vec<(usize, usize, Intersection<T>)> = pixels
            .par_iter()
            .filter_map(|&(row, col)| {
                let hit = match cam.cached_ray(row, col) {
                    Some(ray) => facet.intersect(ray, tolerance),
                    None => facet.intersect(&cam.primary_ray(row, col), tolerance),
                };
                match hit {
                    Intersection::Miss => None,
                    other => Some((row, col, other)),
                }
            })
            .collect();

        let focus = cam.focus();
        for (row, col, hit) in hits {
            match hit {
                Intersection::Point(p) => {
                    frame.depth_test_and_update(
                        row,
                        col,
                        PixelRecord {
                            distance: distance_squared(focus, &p),
                            occupant: Occupant::Surface(*index),
                            hit: p,
                            color: *facet.lighting_color(),
                        },
                    );
                }
                Intersection::Indeterminate(reason) => {
                    debug!("Surface {index} at pixel ({row}, {col}) skipped: {reason}");
                    stats.indeterminate += 1;
                }
                // Edge-on overlaps have no area to show.
                Intersection::Segment(..) | Intersection::Miss => {}
            }
        }
    }
    Ok(())
}

/// Draws lines, then points, into the frame with the same depth rule as
/// surfaces.
pub fn draw_overlays<T: Real>(
    camera: &Camera<T>,
    lines: &[&Line<T>],
    points: &[Marker<T>],
    frame: &mut FrameBuffer<T>,
    tolerance: &T,
    cancel: &CancelToken,
    stats: &mut RenderStats,
) -> Result<(), RenderError> {
    let rasterizer = Rasterizer::new(camera, tolerance.clone());
    for (index, line) in lines.iter().enumerate() {
        cancel.check()?;
        stats.overlay_pixels += rasterizer.draw_line(frame, index, line);
    }
    cancel.check()?;
    for (index, point) in points.iter().enumerate() {
        if rasterizer.draw_point(frame, index, point) {
            stats.overlay_pixels += 1;
        }
    }
    Ok(())
}

/// Darkens every surface pixel whose hit point cannot see the light.
///
/// A shadow ray leaves the hit point towards the light; any hit on another
/// surface, including an edge-on overlap, puts the pixel in shadow and its
/// color becomes the winning surface's ambient-only color. Line and point
/// pixels are never shadowed.
pub fn resolve_shadows<T: Real>(
    surfaces: &[&Facet<T>],
    frame: &mut FrameBuffer<T>,
    lighting: &Lighting,
    tolerance: &T,
    cancel: &CancelToken,
    stats: &mut RenderStats,
) -> Result<(), RenderError> {
    let towards_light = vector_from_f64::<T>(&lighting.towards_light());
    let lit: Vec<(usize, usize, usize, Point3<T>)> = frame
        .resolved()
        .filter_map(|(row, col, record)| match record.occupant {
            Occupant::Surface(index) => Some((row, col, index, record.hit.clone())),
            _ => None,
        })
        .collect();

    for batch in lit.chunks(SHADOW_BATCH) {
        cancel.check()?;
        let shadowed: Vec<(usize, usize, usize)> = batch
            .par_iter()
            .filter(|(_, _, owner, hit)| {
                let ray = Ray::new(hit.clone(), towards_light.clone());
                surfaces
                    .iter()
                    .enumerate()
                    .any(|(other, facet)| other != *owner && facet.intersect(&ray, tolerance).is_hit())
            })
            .map(|(row, col, owner, _)| (*row, *col, *owner))
            .collect();

        for (row, col, owner) in shadowed {
            frame.set_color(row, col, *surfaces[owner].ambient_color());
            stats.shadowed_pixels += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::Color;
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

    fn white() -> Color {
        Vector3::new(1.0, 1.0, 1.0)
    }

    fn triangle(points: [[f64; 3]; 3]) -> Facet<Exact> {
        Facet::triangle(
            point_from_array(points[0]),
            point_from_array(points[1]),
            point_from_array(points[2]),
            white(),
        )
    }

    #[test]
    fn ordering_is_by_closest_point_and_drops_culled_surfaces() {
        let cam = camera();
        let far = triangle([[-1.0, -1.0, -10.0], [1.0, -1.0, -10.0], [0.0, 1.0, -10.0]]);
        let near = triangle([[-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [0.0, 1.0, 0.0]]);
        let behind = triangle([[-1.0, -1.0, 20.0], [1.0, -1.0, 20.0], [0.0, 1.0, 20.0]]);
        let flat = triangle([[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [2.0, 2.0, 0.0]]);
        let surfaces = vec![&far, &near, &behind, &flat];

        let order = order_surfaces(&cam, &surfaces, &<Exact as Real>::default_tolerance());
        let indices: Vec<usize> = order.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![1, 0]);
        assert_eq!(order[0].1, <Exact as Real>::from_usize(100));
        assert_eq!(order[1].1, <Exact as Real>::from_usize(400));
    }

    #[test]
    fn candidates_cover_the_projection() {
        let cam = camera();
        // projects to cols 9.5..10.5, rows 9.5..10.5
        let small = triangle([[-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [0.0, 0.5, 0.0]]);
        let pixels = candidate_pixels(&cam, &small);
        assert_eq!(pixels.len(), 16);
        assert!(pixels.contains(&(8, 8)));
        assert!(pixels.contains(&(11, 11)));

        let crossing = triangle([[-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [0.0, 0.5, 30.0]]);
        assert_eq!(candidate_pixels(&cam, &crossing).len(), 400);
    }

    #[test]
    fn cancelled_token_stops_surface_resolution() {
        let mut cam = camera();
        let near = triangle([[-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [0.0, 1.0, 0.0]]);
        let surfaces = vec![&near];
        let tol = <Exact as Real>::default_tolerance();
        let order = order_surfaces(&cam, &surfaces, &tol);
        let mut frame = FrameBuffer::new(cam.dim());
        let mut stats = RenderStats::default();
        let token = CancelToken::new();
        token.cancel();
        let result = resolve_surfaces(&mut cam, &surfaces, &order, &mut frame, &tol, &token, &mut stats);
        assert_eq!(result, Err(RenderError::Cancelled));
        assert_eq!(frame.resolved_count(), 0);
    }

    #[test]
    fn nearer_surface_wins_its_pixels() {
        let mut cam = camera();
        let far = triangle([[-5.0, -5.0, -10.0], [5.0, -5.0, -10.0], [0.0, 5.0, -10.0]]);
        let near = triangle([[-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [0.0, 1.0, 0.0]]);
        let surfaces = vec![&far, &near];
        let tol = <Exact as Real>::default_tolerance();
        let order = order_surfaces(&cam, &surfaces, &tol);
        let mut frame = FrameBuffer::new(cam.dim());
        let mut stats = RenderStats::default();
        resolve_surfaces(&mut cam, &surfaces, &order, &mut frame, &tol, &CancelToken::new(), &mut stats)
            .unwrap();
        // the ray through the viewport center meets `near` at the origin
        let center = frame.record(10, 10).unwrap();
        assert_eq!(center.occupant, Occupant::Surface(1));
        assert_eq!(center.distance, <Exact as Real>::from_usize(100));
        assert!(cam.cached_rays() > 0);
    }

    #[test]
    fn undecidable_pairs_are_counted_and_skipped() {
        let mut cam = camera();
        // collinear vertices: every ray against it is indeterminate
        let sliver = triangle([[-1.0, -1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 1.0, 1.0]]);
        let near = triangle([[-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [0.0, 1.0, 0.0]]);
        let surfaces = vec![&sliver, &near];
        let tol = <Exact as Real>::default_tolerance();
        let mut order = vec![(0, <Exact as Real>::from_usize(81))];
        order.extend(order_surfaces(&cam, &surfaces, &tol));
        assert_eq!(order.len(), 2);

        let mut frame = FrameBuffer::new(cam.dim());
        let mut stats = RenderStats::default();
        resolve_surfaces(&mut cam, &surfaces, &order, &mut frame, &tol, &CancelToken::new(), &mut stats)
            .unwrap();
        assert!(stats.indeterminate > 0);
        assert_eq!(frame.record(10, 10).unwrap().occupant, Occupant::Surface(1));
        assert!(frame.resolved().all(|(_, _, r)| r.occupant == Occupant::Surface(1)));
    }
}
