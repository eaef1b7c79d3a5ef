use crate::core::color::{Color, scale_color};
use crate::core::math::vector::{normalized, reversed};
use crate::error::SceneError;
use nalgebra::Vector3;

/// A single directional light plus an ambient floor.
///
/// `direction` is the direction the light travels (e.g. `(0, 0, -1)` shines
/// down the z axis) and is stored normalized. Shading runs in `f64` for both
/// numeric backends.
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    direction: Vector3<f64>,
    ambient: f64,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            direction: Vector3::new(0.0, 0.0, -1.0),
            ambient: 0.2,
        }
    }
}

impl Lighting {
    pub fn new(direction: Vector3<f64>, ambient: f64) -> Result<Self, SceneError> {
        // zero, overflowing or non-finite input does not come back unit length
        let Some(unit) = normalized(&direction).filter(|u| (u.norm() - 1.0).abs() < 1e-9) else {
            return Err(SceneError::InvalidLighting(format!(
                "light direction {:?} cannot be normalized",
                direction.as_slice()
            )));
        };
        if !(0.0..=1.0).contains(&ambient) {
            return Err(SceneError::InvalidLighting(format!(
                "ambient fraction {ambient} is outside [0, 1]"
            )));
        }
        Ok(Self {
            direction: unit,
            ambient,
        })
    }

    pub fn direction(&self) -> &Vector3<f64> {
        &self.direction
    }

    /// Direction from a surface towards the light.
    pub fn towards_light(&self) -> Vector3<f64> {
        reversed(&self.direction)
    }

    pub fn ambient(&self) -> f64 {
        self.ambient
    }

    /// Intensity for a surface with the given normal.
    ///
    /// `d = |n . l|`, `scaled = (d^3 + 1) / (2 (1 - ambient))`, and the result
    /// is `ambient + scaled` clamped to `[0, 1]`. The absolute value makes
    /// front- and back-facing surfaces shade alike. A zero normal counts as
    /// `d = 0`; a full ambient fraction always yields 1.
    pub fn intensity(&self, normal: &Vector3<f64>) -> f64 {
        if self.ambient >= 1.0 {
            return 1.0;
        }
        let n = normal.norm();
        let d = if n > 0.0 && n.is_finite() {
            (normal.dot(&self.direction) / n).abs()
        } else {
            0.0
        };
        let raw = d * d * d;
        let scaled = (raw + 1.0) / (2.0 * (1.0 - self.ambient));
        (self.ambient + scaled).clamp(0.0, 1.0)
    }

    /// Lit and ambient-only colors for a base color: the lit color is the base
    /// scaled by [`Lighting::intensity`], the ambient-only color is the lit
    /// color scaled by the ambient fraction.
    pub fn shade(&self, base: &Color, normal: &Vector3<f64>) -> (Color, Color) {
        let lit = scale_color(base, self.intensity(normal) as f32);
        let ambient = scale_color(&lit, self.ambient as f32);
        (lit, ambient)
    }
}
