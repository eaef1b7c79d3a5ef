//! Error types for scene construction, camera setup and rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading or validating a scene configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected layout.
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is syntactically fine but out of range.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Malformed scene input, surfaced before any rendering starts.
#[derive(Error, Debug)]
pub enum SceneError {
    /// A primitive cannot be built from the supplied points.
    #[error("Malformed primitive: {0}")]
    MalformedPrimitive(String),

    /// Polygon vertices do not share one plane.
    #[error("Polygon with {0} vertices is not planar")]
    NonPlanarPolygon(usize),

    /// A mesh file could not be loaded.
    #[error("Failed to load mesh '{path}': {reason}")]
    MeshLoad { path: String, reason: String },

    /// Light direction or ambient fraction out of range.
    #[error("Invalid lighting: {0}")]
    InvalidLighting(String),
}

/// Camera configuration rejected at construction time.
#[derive(Error, Debug, PartialEq)]
pub enum CameraError {
    #[error("Pixel resolution must be non-zero (got {width}x{height})")]
    ZeroResolution { width: usize, height: usize },

    #[error("Viewport is degenerate: {0}")]
    DegenerateViewport(&'static str),

    #[error("Up vector is parallel to the view axis")]
    UpParallelToView,

    #[error("Focal point coincides with the framing target")]
    FocusAtTarget,

    #[error("Focal point lies in the viewport plane")]
    FocusOnViewport,

    #[error("Zoom factor must be positive and finite (got {0})")]
    InvalidZoom(f64),

    #[error("Rotation axis must be non-zero")]
    ZeroRotationAxis,
}

/// Failures that abort a render in progress.
#[derive(Error, Debug, PartialEq)]
pub enum RenderError {
    /// The caller's cancellation token fired; resolved pixels are left intact.
    #[error("Render cancelled")]
    Cancelled,
}

/// Top-level error used by the binary.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
