use crate::core::framebuffer::FrameBuffer;
use crate::core::math::numeric::Real;
use crate::error::RenderError;
use crate::pipeline::passes::{draw_overlays, order_surfaces, resolve_shadows, resolve_surfaces};
use crate::scene::camera::Camera;
use crate::scene::light::Lighting;
use crate::scene::primitive::Line;
use crate::scene::universe::Universe;
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Per-render options.
#[derive(Debug, Clone)]
pub struct RenderSettings<T: Real> {
    pub lighting: Lighting,
    pub cast_shadows: bool,
    /// Draw the coordinate axes and the `z = 0` graticule over the scene.
    pub overlay: bool,
    pub graticule_divisions: usize,
    /// Slack for intersection tests; zero for exact arithmetic.
    pub tolerance: T,
    /// Packed `0x00RRGGBB` color of unresolved pixels.
    pub background: u32,
}

impl<T: Real> Default for RenderSettings<T> {
    fn default() -> Self {
        Self {
            lighting: Lighting::default(),
            cast_shadows: true,
            overlay: false,
            graticule_divisions: 10,
            tolerance: T::default_tolerance(),
            background: 0,
        }
    }
}

/// Cooperative cancellation flag, shared between the caller and a render.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<(), RenderError> {
        if self.is_cancelled() {
            Err(RenderError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Counters collected during one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Surfaces that passed culling and were scanned.
    pub ordered: usize,
    /// Surfaces culled by the frustum or skipped as degenerate.
    pub excluded: usize,
    /// (surface, pixel) pairs skipped because the intersection was indeterminate.
    pub indeterminate: usize,
    pub resolved_pixels: usize,
    pub overlay_pixels: usize,
    pub shadowed_pixels: usize,
}

/// A finished render: the packed output buffer plus the nearest-hit grid it
/// was assembled from.
#[derive(Debug, Clone)]
pub struct RenderOutput<T: Real> {
    /// `width * height` packed `0x00RRGGBB`, top row first.
    pub pixels: Vec<u32>,
    pub width: usize,
    pub height: usize,
    pub frame: FrameBuffer<T>,
    pub stats: RenderStats,
}

impl<T: Real> RenderOutput<T> {
    /// Packed color at output coordinates (row 0 at the top).
    pub fn pixel(&self, row: usize, col: usize) -> Option<u32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.pixels.get(row * self.width + col).copied()
    }
}

/// Drives one render: ordering, surface resolution, overlays, shadows and
/// buffer assembly.
pub struct Renderer<T: Real> {
    pub settings: RenderSettings<T>,
    cancel: CancelToken,
}

impl<T: Real> Renderer<T> {
    pub fn new(settings: RenderSettings<T>) -> Self {
        Self {
            settings,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Renders `universe` through `camera`.
    ///
    /// Surface colors are recomputed from the current lighting first. The
    /// camera's ray cache is filled as pixels are scanned and survives the
    /// call.
    pub fn render(
        &self,
        camera: &mut Camera<T>,
        universe: &mut Universe<T>,
    ) -> Result<RenderOutput<T>, RenderError> {
        let mut frame = FrameBuffer::new(camera.dim());
        let mut stats = RenderStats::default();
        self.render_into(camera, universe, &mut frame, &mut stats)?;

        let viewport = camera.viewport();
        let (width, height) = (viewport.width(), viewport.height());
        let pixels = frame.to_packed(width, height, self.settings.background);
        Ok(RenderOutput {
            pixels,
            width,
            height,
            frame,
            stats,
        })
    }

    /// Same as [`Renderer::render`] but resolves into a caller-owned frame.
    /// On cancellation the frame keeps every pixel resolved so far.
    pub fn render_into(
        &self,
        camera: &mut Camera<T>,
        universe: &mut Universe<T>,
        frame: &mut FrameBuffer<T>,
        stats: &mut RenderStats,
    ) -> Result<(), RenderError> {
        let start = Instant::now();
        let settings = &self.settings;
        info!(
            "Rendering {} surfaces, {} lines, {} points on a {}x{} grid",
            universe.surface_count(),
            universe.lines().len(),
            universe.points().len(),
            camera.dim(),
            camera.dim()
        );

        universe.relight(&settings.lighting);
        let surfaces = universe.surfaces();

        // 1. Ordering
        let phase = Instant::now();
        let order = order_surfaces(camera, &surfaces, &settings.tolerance);
        stats.ordered = order.len();
        stats.excluded = surfaces.len() - order.len();
        debug!(
            "Ordered {} surfaces ({} excluded) in {:.2?}",
            stats.ordered,
            stats.excluded,
            phase.elapsed()
        );

        // 2. Nearest surface per pixel
        let phase = Instant::now();
        resolve_surfaces(
            camera,
            &surfaces,
            &order,
            frame,
            &settings.tolerance,
            &self.cancel,
            stats,
        )?;
        debug!("Resolved surfaces in {:.2?}", phase.elapsed());

        // 3. Lines and points
        let overlay_lines: Vec<Line<T>> = if settings.overlay {
            let mut extra = universe.axis_overlay();
            extra.extend(universe.graticule(settings.graticule_divisions));
            extra
        } else {
            Vec::new()
        };
        let lines: Vec<&Line<T>> = universe.lines().iter().chain(overlay_lines.iter()).collect();
        draw_overlays(
            camera,
            &lines,
            universe.points(),
            frame,
            &settings.tolerance,
            &self.cancel,
            stats,
        )?;

        // 4. Shadows
        if settings.cast_shadows {
            let phase = Instant::now();
            resolve_shadows(
                &surfaces,
                frame,
                &settings.lighting,
                &settings.tolerance,
                &self.cancel,
                stats,
            )?;
            debug!("Resolved shadows in {:.2?}", phase.elapsed());
        }

        stats.resolved_pixels = frame.resolved_count();
        if stats.indeterminate > 0 {
            warn!(
                "Skipped {} indeterminate surface/pixel intersections",
                stats.indeterminate
            );
        }
        info!(
            "Render completed in {:.2?}: {} pixels resolved, {} in shadow",
            start.elapsed(),
            stats.resolved_pixels,
            stats.shadowed_pixels
        );
        Ok(())
    }
}
