use nalgebra::Vector3;

/// Linear RGB in `[0, 1]` per channel.
pub type Color = Vector3<f32>;

pub fn color_from_array(rgb: [f32; 3]) -> Color {
    Vector3::new(rgb[0], rgb[1], rgb[2])
}

/// Multiplies every channel by `factor`, clamping the result to `[0, 1]`.
pub fn scale_color(color: &Color, factor: f32) -> Color {
    (color * factor).map(|c| c.clamp(0.0, 1.0))
}

/// Packs a color as `0x00RRGGBB`.
pub fn pack_rgb(color: &Color) -> u32 {
    let r = (color.x.clamp(0.0, 1.0) * 255.0).round() as u32;
    let g = (color.y.clamp(0.0, 1.0) * 255.0).round() as u32;
    let b = (color.z.clamp(0.0, 1.0) * 255.0).round() as u32;
    (r << 16) | (g << 8) | b
}

pub fn unpack_rgb(packed: u32) -> [u8; 3] {
    [
        ((packed >> 16) & 0xFF) as u8,
        ((packed >> 8) & 0xFF) as u8,
        (packed & 0xFF) as u8,
    ]
}
