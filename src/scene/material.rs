use crate::core::color::Color;
use crate::scene::light::Lighting;
use nalgebra::Vector3;

/// Surface colors: the base color plus the lit and ambient-only variants
/// derived from it. The derived colors are recomputed by [`Material::relight`]
/// at the start of every render and never set directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    base: Color,
    lighting: Color,
    ambient: Color,
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Vector3::new(0.8, 0.8, 0.8))
    }
}

impl Material {
    pub fn new(base: Color) -> Self {
        Self {
            base,
            lighting: base,
            ambient: base,
        }
    }

    pub fn base(&self) -> &Color {
        &self.base
    }

    pub fn lighting_color(&self) -> &Color {
        &self.lighting
    }

    /// Stand-in color for pixels in shadow.
    pub fn ambient_color(&self) -> &Color {
        &self.ambient
    }

    pub fn relight(&mut self, normal: &Vector3<f64>, lighting: &Lighting) {
        let (lit, ambient) = lighting.shade(&self.base, normal);
        self.lighting = lit;
        self.ambient = ambient;
    }
}
