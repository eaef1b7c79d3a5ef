use crate::core::geometry::Ray;
use crate::core::math::aabb::Aabb;
use crate::core::math::numeric::Real;
use crate::core::math::vector::length_squared;
use crate::error::CameraError;
use crate::scene::viewport::{Frustum, Viewport};
use log::debug;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

/// A focal point looking through a viewport, with a per-pixel cache of
/// primary rays.
///
/// The cache belongs to the camera and is cleared in full by every transform
/// (`translate`, `rotate`, `reframe`), since all rays depend on the viewport
/// geometry.
#[derive(Debug, Clone)]
pub struct Camera<T: Real> {
    focus: Point3<T>,
    viewport: Viewport<T>,
    frustum: Frustum<T>,
    rays: HashMap<(usize, usize), Ray<T>>,
}

impl<T: Real> Camera<T> {
    pub fn new(focus: Point3<T>, viewport: Viewport<T>) -> Result<Self, CameraError> {
        let frustum = Frustum::new(&focus, &viewport)?;
        Ok(Self {
            focus,
            viewport,
            frustum,
            rays: HashMap::new(),
        })
    }

    /// Camera whose viewport frames `bounds`; see [`Viewport::framing`].
    pub fn framing(
        focus: Point3<T>,
        bounds: &Aabb<T>,
        up: &Vector3<T>,
        zoom: f64,
        width: usize,
        height: usize,
    ) -> Result<Self, CameraError> {
        let viewport = Viewport::framing(&focus, bounds, up, zoom, width, height)?;
        Self::new(focus, viewport)
    }

    pub fn focus(&self) -> &Point3<T> {
        &self.focus
    }

    pub fn viewport(&self) -> &Viewport<T> {
        &self.viewport
    }

    pub fn frustum(&self) -> &Frustum<T> {
        &self.frustum
    }

    pub fn dim(&self) -> usize {
        self.viewport.dim()
    }

    //=================================
    // Transforms
    //=================================

    /// Moves focus and viewport together.
    pub fn translate(&mut self, offset: &Vector3<T>) {
        self.focus += offset;
        self.viewport.translate(offset);
        // A rigid translation keeps the frustum shape; rebuilding it cannot fail.
        if let Ok(frustum) = Frustum::new(&self.focus, &self.viewport) {
            self.frustum = frustum;
        }
        self.clear_cache();
    }

    /// Rotates the viewport about the axis through the focus.
    pub fn rotate(&mut self, axis: &Vector3<T>, angle_rad: f64) -> Result<(), CameraError> {
        if length_squared(axis).is_zero() {
            return Err(CameraError::ZeroRotationAxis);
        }
        let viewport = self.viewport.rotated(&self.focus, axis, angle_rad)?;
        self.frustum = Frustum::new(&self.focus, &viewport)?;
        self.viewport = viewport;
        self.clear_cache();
        Ok(())
    }

    /// Rebuilds the viewport to frame `bounds` from the current focus,
    /// keeping the requested resolution.
    pub fn reframe(&mut self, bounds: &Aabb<T>, up: &Vector3<T>, zoom: f64) -> Result<(), CameraError> {
        let viewport = Viewport::framing(
            &self.focus,
            bounds,
            up,
            zoom,
            self.viewport.width(),
            self.viewport.height(),
        )?;
        self.frustum = Frustum::new(&self.focus, &viewport)?;
        self.viewport = viewport;
        self.clear_cache();
        Ok(())
    }

    //=================================
    // Ray cache
    //=================================

    /// Primary ray for a pixel, computed on first use and cached.
    pub fn ray(&mut self, row: usize, col: usize) -> &Ray<T> {
        let (focus, viewport) = (&self.focus, &self.viewport);
        self.rays
            .entry((row, col))
            .or_insert_with(|| Ray::through(focus.clone(), &viewport.sample_point(row, col)))
    }

    /// Fills the cache for every listed pixel that is not cached yet.
    pub fn warm_rays(&mut self, pixels: &[(usize, usize)]) {
        for &(row, col) in pixels {
            self.ray(row, col);
        }
    }

    pub fn cached_ray(&self, row: usize, col: usize) -> Option<&Ray<T>> {
        self.rays.get(&(row, col))
    }

    /// Primary ray without touching the cache.
    pub fn primary_ray(&self, row: usize, col: usize) -> Ray<T> {
        match self.cached_ray(row, col) {
            Some(ray) => ray.clone(),
            None => Ray::through(self.focus.clone(), &self.viewport.sample_point(row, col)),
        }
    }

    pub fn cached_rays(&self) -> usize {
        self.rays.len()
    }

    pub fn clear_cache(&mut self) {
        if !self.rays.is_empty() {
            debug!("Clearing {} cached rays", self.rays.len());
        }
        self.rays.clear();
    }

    //=================================
    // Projection
    //=================================

    /// Central projection of `p` onto the viewport, as fractional
    /// `(row, col)` grid coordinates. `None` unless `p` lies in front of the
    /// focus plane.
    pub fn project(&self, p: &Point3<T>) -> Option<(T, T)> {
        let depth = self.frustum.depth(p);
        if depth <= T::zero() {
            return None;
        }
        let t = self.frustum.viewport_depth().clone() / depth;
        let on_plane = &self.focus + (p - &self.focus) * t;
        self.viewport.grid_coordinates(&on_plane)
    }

    /// Pixel whose cell `[row, row + 1) x [col, col + 1)` contains the
    /// projection of `p`, if it falls on the grid.
    pub fn pixel_of(&self, p: &Point3<T>) -> Option<(usize, usize)> {
        let (row, col) = self.project(p)?;
        let (row, col) = (row.floor_to_i64(), col.floor_to_i64());
        let dim = self.dim() as i64;
        if (0..dim).contains(&row) && (0..dim).contains(&col) {
            Some((row as usize, col as usize))
        } else {
            None
        }
    }
}
