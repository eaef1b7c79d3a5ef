use crate::core::color::{color_from_array, pack_rgb};
use crate::core::math::aabb::Aabb;
use crate::core::math::numeric::Real;
use crate::core::math::vector::{point_from_array, vector_from_array};
use crate::error::{CameraError, Error, SceneError};
use crate::io::config::{CameraConfig, Config, ObjectConfig};
use crate::io::obj_loader::{MeshPlacement, load_obj};
use crate::pipeline::renderer::RenderSettings;
use crate::scene::camera::Camera;
use crate::scene::light::Lighting;
use crate::scene::primitive::{Facet, Line, Marker, Polygon, Tetrahedron};
use crate::scene::universe::Universe;
use crate::scene::viewport::Viewport;
use log::{info, warn};
use nalgebra::Vector3;

/// Everything a render needs, built from one config for one number type.
#[derive(Debug, Clone)]
pub struct SceneSetup<T: Real> {
    pub universe: Universe<T>,
    pub camera: Camera<T>,
    pub settings: RenderSettings<T>,
}

/// Builds the scene, camera and render settings described by `config`.
/// Any malformed object or camera setting fails here, before rendering.
pub fn build_scene<T: Real>(config: &Config) -> Result<SceneSetup<T>, Error> {
    let tolerance = config
        .render
        .tolerance
        .map(T::from_f64)
        .unwrap_or_else(T::default_tolerance);

    let universe = build_universe(config, &tolerance)?;
    let lighting = Lighting::new(
        Vector3::from(config.lighting.direction),
        config.lighting.ambient,
    )?;
    let camera = build_camera(
        &config.camera,
        config.render.width,
        config.render.height,
        universe.bounds(),
    )?;

    let settings = RenderSettings {
        lighting,
        cast_shadows: config.render.cast_shadows,
        overlay: config.render.overlay,
        graticule_divisions: config.render.graticule_divisions,
        tolerance,
        background: pack_rgb(&color_from_array(config.render.background)),
    };

    info!(
        "Scene ready: {} surfaces, {} lines, {} points",
        universe.surface_count(),
        universe.lines().len(),
        universe.points().len()
    );
    Ok(SceneSetup {
        universe,
        camera,
        settings,
    })
}

/// Converts every `[[objects]]` entry into primitives.
pub fn build_universe<T: Real>(config: &Config, tolerance: &T) -> Result<Universe<T>, SceneError> {
    let mut universe = Universe::new();
    for (index, object) in config.objects.iter().enumerate() {
        match object {
            ObjectConfig::Mesh {
                path,
                position,
                scale,
                color,
            } => {
                let resolved = config.resolve_path(path);
                let placement = MeshPlacement {
                    position: *position,
                    scale: *scale,
                };
                let mesh = load_obj::<T>(&resolved, placement)?;
                if mesh.is_empty() {
                    warn!("Mesh '{}' contains no triangles", resolved.display());
                }
                universe.add_mesh(&mesh, color_from_array(*color));
            }
            ObjectConfig::Triangle {
                vertices,
                normal,
                color,
            } => {
                let [a, b, c] = vertices.map(point_from_array::<T>);
                let mut facet = Facet::triangle(a, b, c, color_from_array(*color));
                if let Some(n) = normal {
                    facet = facet.with_normal(vector_from_array(*n));
                }
                universe.add_facet(facet);
            }
            ObjectConfig::Polygon { vertices, color } => {
                if vertices.len() < 3 {
                    return Err(SceneError::MalformedPrimitive(format!(
                        "objects[{index}]: polygon needs at least 3 vertices, got {}",
                        vertices.len()
                    )));
                }
                let ring = vertices.iter().copied().map(point_from_array::<T>).collect();
                universe.add_polygon(Polygon::new(ring, color_from_array(*color), tolerance)?);
            }
            ObjectConfig::Tetrahedron { vertices, color } => {
                universe.add_tetrahedron(Tetrahedron::new(
                    vertices.map(point_from_array::<T>),
                    color_from_array(*color),
                ));
            }
            ObjectConfig::Line { start, end, color } => {
                universe.add_line(Line::new(
                    point_from_array(*start),
                    point_from_array(*end),
                    color_from_array(*color),
                ));
            }
            ObjectConfig::Point { position, color } => {
                universe.add_point(Marker::new(
                    point_from_array(*position),
                    color_from_array(*color),
                ));
            }
        }
    }
    Ok(universe)
}

/// Camera from an explicit viewport, or framed around `bounds`.
///
/// Scenes with no extent (empty, or a single point) are framed as if they
/// filled a unit box around their center.
pub fn build_camera<T: Real>(
    camera: &CameraConfig,
    width: usize,
    height: usize,
    bounds: Option<&Aabb<T>>,
) -> Result<Camera<T>, CameraError> {
    let focus = point_from_array::<T>(camera.focus);
    if let Some(corners) = camera.viewport {
        let viewport = Viewport::new(corners.map(point_from_array::<T>), width, height)?;
        return Camera::new(focus, viewport);
    }

    let target = match bounds {
        Some(b) if !b.diagonal_length_squared().is_zero() => b.clone(),
        other => {
            let center = other
                .map(|b| b.centroid())
                .unwrap_or_else(nalgebra::Point3::origin);
            let pad = Vector3::repeat(T::one());
            Aabb::new(&center - &pad, &center + &pad)
        }
    };
    Camera::framing(
        focus,
        &target,
        &vector_from_array(camera.up),
        camera.zoom,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::numeric::Exact;
    use num_traits::Zero;

    #[test]
    fn builds_every_object_kind() {
        let config = Config::from_toml(
            r#"
            [render]
            width = 40
            height = 20
            background = [1.0, 0.0, 0.0]

            [[objects]]
            kind = "triangle"
            vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]

            [[objects]]
            kind = "polygon"
            vertices = [[0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [1.0, 1.0, -1.0], [0.0, 1.0, -1.0]]

            [[objects]]
            kind = "tetrahedron"
            vertices = [[0.0, 0.0, -3.0], [1.0, 0.0, -3.0], [0.0, 1.0, -3.0], [0.0, 0.0, -2.0]]

            [[objects]]
            kind = "line"
            start = [-1.0, 0.0, 0.0]
            end = [1.0, 0.0, 0.0]

            [[objects]]
            kind = "point"
            position = [0.0, 0.0, 1.0]
            "#,
        )
        .unwrap();

        let setup: SceneSetup<Exact> = build_scene(&config).unwrap();
        assert_eq!(setup.universe.surface_count(), 6);
        assert_eq!(setup.universe.lines().len(), 1);
        assert_eq!(setup.universe.points().len(), 1);
        assert_eq!(setup.camera.dim(), 40);
        assert_eq!(setup.settings.background, 0x00FF0000);
        assert!(setup.settings.tolerance.is_zero());
    }

    #[test]
    fn non_planar_polygon_is_rejected() {
        let config = Config::from_toml(
            r#"
            [[objects]]
            kind = "polygon"
            vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0, 0.0]]
            "#,
        )
        .unwrap();
        let result = build_scene::<f64>(&config);
        assert!(matches!(
            result,
            Err(Error::Scene(SceneError::NonPlanarPolygon(4)))
        ));
    }

    #[test]
    fn camera_errors_surface_before_rendering() {
        let config = Config::from_toml("[render]\nwidth = 0\nheight = 10").unwrap();
        assert!(matches!(
            build_scene::<f64>(&config),
            Err(Error::Camera(CameraError::ZeroResolution { .. }))
        ));

        let config = Config::from_toml("[camera]\nup = [0.0, 0.0, 1.0]").unwrap();
        assert!(matches!(
            build_scene::<f64>(&config),
            Err(Error::Camera(CameraError::UpParallelToView))
        ));
    }

    #[test]
    fn empty_scene_gets_a_default_frame() {
        let config = Config::default();
        let setup = build_scene::<f64>(&config).unwrap();
        assert!(setup.universe.is_empty());
        assert_eq!(setup.camera.dim(), 800);
    }
}
