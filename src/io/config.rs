use crate::error::ConfigError;
use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Scene file layout. Every section is optional; an empty file yields an
/// empty scene seen from the default camera.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub lighting: LightingConfig,
    #[serde(default)]
    pub objects: Vec<ObjectConfig>,

    /// Directory relative mesh paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Numeric backend used for geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// `f64` with a small comparison tolerance.
    #[default]
    Float,
    /// Exact `BigRational` arithmetic.
    Rational,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    // --- Output ---
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_background")]
    pub background: [f32; 3],

    // --- Arithmetic ---
    #[serde(default)]
    pub precision: Precision,
    /// Overrides the backend's default comparison tolerance.
    #[serde(default)]
    pub tolerance: Option<f64>,

    // --- Passes ---
    #[serde(default = "default_true")]
    pub cast_shadows: bool,
    #[serde(default)]
    pub overlay: bool,
    #[serde(default = "default_graticule_divisions")]
    pub graticule_divisions: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            output: default_output(),
            background: default_background(),
            precision: Precision::default(),
            tolerance: None,
            cast_shadows: true,
            overlay: false,
            graticule_divisions: default_graticule_divisions(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_focus")]
    pub focus: [f64; 3],
    /// Explicit viewport corners: bottom-left, bottom-right, top-right,
    /// top-left. When absent the viewport is framed around the scene bounds.
    #[serde(default)]
    pub viewport: Option<[[f64; 3]; 4]>,
    #[serde(default = "default_up")]
    pub up: [f64; 3],
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            focus: default_focus(),
            viewport: None,
            up: default_up(),
            zoom: default_zoom(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LightingConfig {
    /// Direction the light travels in.
    #[serde(default = "default_light_direction")]
    pub direction: [f64; 3],
    #[serde(default = "default_ambient")]
    pub ambient: f64,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            direction: default_light_direction(),
            ambient: default_ambient(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ObjectConfig {
    Mesh {
        path: String,
        #[serde(default)]
        position: [f64; 3],
        #[serde(default = "default_scale")]
        scale: f64,
        #[serde(default = "default_color")]
        color: [f32; 3],
    },
    Triangle {
        vertices: [[f64; 3]; 3],
        #[serde(default)]
        normal: Option<[f64; 3]>,
        #[serde(default = "default_color")]
        color: [f32; 3],
    },
    Polygon {
        vertices: Vec<[f64; 3]>,
        #[serde(default = "default_color")]
        color: [f32; 3],
    },
    Tetrahedron {
        vertices: [[f64; 3]; 4],
        #[serde(default = "default_color")]
        color: [f32; 3],
    },
    Line {
        start: [f64; 3],
        end: [f64; 3],
        #[serde(default = "default_color")]
        color: [f32; 3],
    },
    Point {
        position: [f64; 3],
        #[serde(default = "default_color")]
        color: [f32; 3],
    },
}

fn default_width() -> usize {
    800
}
fn default_height() -> usize {
    800
}
fn default_output() -> String {
    "output.png".to_string()
}
fn default_background() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}
fn default_true() -> bool {
    true
}
fn default_graticule_divisions() -> usize {
    10
}
fn default_focus() -> [f64; 3] {
    [0.0, 0.0, 10.0]
}
fn default_up() -> [f64; 3] {
    [0.0, 1.0, 0.0]
}
fn default_zoom() -> f64 {
    1.0
}
fn default_light_direction() -> [f64; 3] {
    [0.0, 0.0, -1.0]
}
fn default_ambient() -> f64 {
    0.2
}
fn default_scale() -> f64 {
    1.0
}
fn default_color() -> [f32; 3] {
    [0.8, 0.8, 0.8]
}

impl Config {
    /// Reads and validates a TOML scene file. Relative mesh paths are later
    /// resolved against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Range checks serde cannot express. Resolution, zoom and lighting are
    /// checked where they are consumed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(tol) = self.render.tolerance
            && !(tol.is_finite() && tol >= 0.0)
        {
            return Err(ConfigError::InvalidValue(format!(
                "render.tolerance must be a non-negative number, got {tol}"
            )));
        }
        if self
            .render
            .background
            .iter()
            .any(|c| !(0.0..=1.0).contains(c))
        {
            return Err(ConfigError::InvalidValue(
                "render.background components must lie in [0, 1]".to_string(),
            ));
        }
        for (i, object) in self.objects.iter().enumerate() {
            if let ObjectConfig::Mesh { scale, .. } = object
                && !(scale.is_finite() && *scale > 0.0)
            {
                return Err(ConfigError::InvalidValue(format!(
                    "objects[{i}].scale must be positive, got {scale}"
                )));
            }
        }
        Ok(())
    }

    /// Mesh path as given, or joined onto the config file's directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        match &self.base_dir {
            Some(dir) if p.is_relative() => dir.join(p),
            _ => p.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.render.width, 800);
        assert_eq!(config.render.precision, Precision::Float);
        assert!(config.render.cast_shadows);
        assert!(config.camera.viewport.is_none());
        assert_eq!(config.lighting.ambient, 0.2);
        assert!(config.objects.is_empty());
    }

    #[test]
    fn objects_are_tagged_by_kind() {
        let config = Config::from_toml(
            r#"
            [render]
            precision = "rational"
            width = 64
            height = 32

            [camera]
            focus = [0.0, 0.0, 5.0]
            viewport = [[-1.0, -1.0, 4.0], [1.0, -1.0, 4.0], [1.0, 1.0, 4.0], [-1.0, 1.0, 4.0]]

            [[objects]]
            kind = "triangle"
            vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
            color = [1.0, 0.0, 0.0]

            [[objects]]
            kind = "point"
            position = [0.5, 0.5, 1.0]

            [[objects]]
            kind = "mesh"
            path = "cube.obj"
            scale = 2.0
            "#,
        )
        .unwrap();

        assert_eq!(config.render.precision, Precision::Rational);
        assert_eq!(config.render.height, 32);
        assert!(config.camera.viewport.is_some());
        assert_eq!(config.objects.len(), 3);
        assert!(matches!(
            config.objects[0],
            ObjectConfig::Triangle { color, normal: None, .. } if color == [1.0, 0.0, 0.0]
        ));
        assert!(matches!(
            config.objects[1],
            ObjectConfig::Point { color, .. } if color == [0.8, 0.8, 0.8]
        ));
        assert!(matches!(config.objects[2], ObjectConfig::Mesh { scale, .. } if scale == 2.0));
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(matches!(
            Config::from_toml("[render]\nprecision = \"double\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Config::from_toml("[[objects]]\nkind = \"sphere\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Config::from_toml("[render]\ntolerance = -1.0"),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn mesh_paths_resolve_against_the_config_directory() {
        let mut config = Config::default();
        assert_eq!(config.resolve_path("a.obj"), PathBuf::from("a.obj"));
        config.base_dir = Some(PathBuf::from("scenes"));
        assert_eq!(config.resolve_path("a.obj"), PathBuf::from("scenes/a.obj"));
    }
}
