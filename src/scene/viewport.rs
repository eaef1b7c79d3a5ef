use crate::core::geometry::Plane;
use crate::core::math::aabb::Aabb;
use crate::core::math::numeric::Real;
use crate::core::math::transform::rotate_about;
use crate::core::math::vector::{
    distance_squared, is_parallel, length_squared, point_from_array, to_f64_vector,
};
use crate::error::CameraError;
use nalgebra::{Point3, Vector3};

/// The synthetic image plane primary rays pass through.
///
/// Corners are ordered bottom-left, bottom-right, top-right, top-left. The
/// raster is always `dim x dim` with `dim = max(width, height)`; a
/// non-square request keeps the square grid and crops at buffer assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport<T: Real> {
    corners: [Point3<T>; 4],
    width: usize,
    height: usize,
    dim: usize,
    /// Step between adjacent columns (bottom edge / dim).
    col_step: Vector3<T>,
    /// Step between adjacent rows (left edge / dim).
    row_step: Vector3<T>,
    pixel_size: T,
}

impl<T: Real> Viewport<T> {
    /// Viewport from an explicit rectangle.
    pub fn new(corners: [Point3<T>; 4], width: usize, height: usize) -> Result<Self, CameraError> {
        if width == 0 || height == 0 {
            return Err(CameraError::ZeroResolution { width, height });
        }
        let bottom = &corners[1] - &corners[0];
        let left = &corners[3] - &corners[0];
        if length_squared(&bottom).is_zero() {
            return Err(CameraError::DegenerateViewport("zero-length bottom edge"));
        }
        if length_squared(&left).is_zero() {
            return Err(CameraError::DegenerateViewport("zero-length left edge"));
        }
        let tolerance = T::default_tolerance();
        if is_parallel(&bottom, &left, &tolerance) {
            return Err(CameraError::DegenerateViewport("edges are parallel"));
        }
        let expected_top_right = &corners[1] + &left;
        let diagonal = length_squared(&(&bottom + &left));
        if distance_squared(&expected_top_right, &corners[2])
            > tolerance.clone() * tolerance * diagonal
        {
            return Err(CameraError::DegenerateViewport(
                "corners do not form a parallelogram",
            ));
        }

        let dim = width.max(height);
        let dim_t = T::from_usize(dim);
        let pixel_size = length_squared(&bottom).sqrt() / T::from_usize(width);
        Ok(Self {
            col_step: &bottom / dim_t.clone(),
            row_step: &left / dim_t,
            corners,
            width,
            height,
            dim,
            pixel_size,
        })
    }

    /// Square viewport framing `bounds` as seen from `focus`.
    ///
    /// The image plane sits halfway between the focus and the centroid of
    /// `bounds`, perpendicular to that axis. Its half-size is chosen so the
    /// bounding sphere of `bounds` fits (or a 90 degree field of view when the
    /// focus is inside the sphere), then divided by `zoom`. The geometry is
    /// computed in `f64` and converted to `T`.
    pub fn framing(
        focus: &Point3<T>,
        bounds: &Aabb<T>,
        up: &Vector3<T>,
        zoom: f64,
        width: usize,
        height: usize,
    ) -> Result<Self, CameraError> {
        if !(zoom > 0.0 && zoom.is_finite()) {
            return Err(CameraError::InvalidZoom(zoom));
        }
        let f = Point3::from(to_f64_vector(&focus.coords));
        let target = Point3::from(to_f64_vector(&bounds.centroid().coords));
        let forward = target - f;
        let dist = forward.norm();
        if dist == 0.0 {
            return Err(CameraError::FocusAtTarget);
        }
        let forward = forward / dist;

        let up = to_f64_vector(up);
        let right = forward.cross(&up);
        let right_norm = right.norm();
        if right_norm <= 1e-12 * up.norm() {
            return Err(CameraError::UpParallelToView);
        }
        let right = right / right_norm;
        let view_up = right.cross(&forward);

        let radius = Real::to_f64(&bounds.diagonal_length_squared()).sqrt() / 2.0;
        let tan_half = if dist > radius {
            radius / (dist * dist - radius * radius).sqrt()
        } else {
            1.0
        };
        let plane_dist = dist / 2.0;
        let half = plane_dist * tan_half / zoom;
        if !(half > 0.0 && half.is_finite()) {
            return Err(CameraError::DegenerateViewport("framing target has no extent"));
        }

        let center = f + forward * plane_dist;
        let corner = |sx: f64, sy: f64| {
            let p = center + right * (sx * half) + view_up * (sy * half);
            point_from_array::<T>([p.x, p.y, p.z])
        };
        let bottom_left = corner(-1.0, -1.0);
        let bottom_right = corner(1.0, -1.0);
        let top_left = corner(-1.0, 1.0);
        // Rounding each f64 corner separately would break the parallelogram
        // under exact arithmetic, so the fourth corner is derived in `T`.
        let top_right = &bottom_right + (&top_left - &bottom_left);
        Self::new(
            [bottom_left, bottom_right, top_right, top_left],
            width,
            height,
        )
    }

    pub fn corners(&self) -> &[Point3<T>; 4] {
        &self.corners
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn col_step(&self) -> &Vector3<T> {
        &self.col_step
    }

    pub fn row_step(&self) -> &Vector3<T> {
        &self.row_step
    }

    /// Bottom edge length divided by the requested width.
    pub fn pixel_size(&self) -> &T {
        &self.pixel_size
    }

    pub fn center(&self) -> Point3<T> {
        Point3::from((&self.corners[0].coords + &self.corners[2].coords) * T::half())
    }

    /// Plane of the rectangle, normal `col_step x row_step`.
    pub fn plane(&self) -> Plane<T> {
        Plane::new(self.corners[0].clone(), self.col_step.cross(&self.row_step))
    }

    /// Point the primary ray of pixel `(row, col)` passes through:
    /// `corner + row * row_step + col * col_step`.
    pub fn sample_point(&self, row: usize, col: usize) -> Point3<T> {
        &self.corners[0]
            + &self.row_step * T::from_usize(row)
            + &self.col_step * T::from_usize(col)
    }

    /// Fractional `(row, col)` grid coordinates of a point in the viewport plane.
    pub fn grid_coordinates(&self, p: &Point3<T>) -> Option<(T, T)> {
        let g = p - &self.corners[0];
        let a = length_squared(&self.row_step);
        let b = self.row_step.dot(&self.col_step);
        let c = length_squared(&self.col_step);
        let det = a.clone() * c.clone() - b.clone() * b.clone();
        if det.is_zero() {
            return None;
        }
        let pr = g.dot(&self.row_step);
        let pc = g.dot(&self.col_step);
        let row = (pr.clone() * c - pc.clone() * b.clone()) / det.clone();
        let col = (pc * a - pr * b) / det;
        Some((row, col))
    }

    pub fn translate(&mut self, offset: &Vector3<T>) {
        for corner in self.corners.iter_mut() {
            *corner += offset;
        }
    }

    /// Viewport rotated about the line through `pivot` along `axis`.
    pub fn rotated(
        &self,
        pivot: &Point3<T>,
        axis: &Vector3<T>,
        angle_rad: f64,
    ) -> Result<Self, CameraError> {
        let mut corners = self.corners.clone();
        for corner in corners.iter_mut() {
            *corner =
                rotate_about(corner, pivot, axis, angle_rad).ok_or(CameraError::ZeroRotationAxis)?;
        }
        Self::new(corners, self.width, self.height)
    }
}

//=================================
// Frustum
//=================================

/// Half-spaces bounding what the viewport can see from the focus: four side
/// planes through the focus and the viewport edges (normals pointing inward)
/// and the focus plane parallel to the viewport (normal pointing forward).
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum<T: Real> {
    sides: [Plane<T>; 4],
    near: Plane<T>,
    /// Forward offset of the viewport plane from the focus, in `near` units.
    viewport_depth: T,
}

impl<T: Real> Frustum<T> {
    pub fn new(focus: &Point3<T>, viewport: &Viewport<T>) -> Result<Self, CameraError> {
        let c = viewport.corners();
        let mut near = Plane::new(focus.clone(), viewport.plane().normal);
        let mut viewport_depth = near.signed_offset(&c[0]);
        if viewport_depth.is_zero() {
            return Err(CameraError::FocusOnViewport);
        }
        if viewport_depth < T::zero() {
            near = near.flipped();
            viewport_depth = -viewport_depth;
        }

        let side = |i: usize| {
            let plane = Plane::from_points(focus, &c[i], &c[(i + 1) % 4]);
            if plane.signed_offset(&c[(i + 2) % 4]) < T::zero() {
                plane.flipped()
            } else {
                plane
            }
        };
        Ok(Self {
            sides: [side(0), side(1), side(2), side(3)],
            near,
            viewport_depth,
        })
    }

    /// Forward distance of `p` from the focus plane, scaled like `viewport_depth`.
    pub fn depth(&self, p: &Point3<T>) -> T {
        self.near.signed_offset(p)
    }

    pub fn viewport_depth(&self) -> &T {
        &self.viewport_depth
    }

    /// Unit-free forward direction (the focus plane normal).
    pub fn forward(&self) -> &Vector3<T> {
        &self.near.normal
    }

    pub fn in_front(&self, p: &Point3<T>) -> bool {
        self.depth(p) > T::zero()
    }

    /// Conservative culling test: true only if no point spanned by `vertices`
    /// can be seen, i.e. all of them lie behind (or on) the focus plane, or
    /// strictly outside one side plane.
    pub fn excludes(&self, vertices: &[Point3<T>]) -> bool {
        if vertices.iter().all(|v| !self.in_front(v)) {
            return true;
        }
        self.sides
            .iter()
            .any(|side| vertices.iter().all(|v| side.signed_offset(v) < T::zero()))
    }
}
