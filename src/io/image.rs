use image::{ImageBuffer, ImageError, Rgb};
use log::info;
use std::path::Path;

/// Saves a packed `0x00RRGGBB` buffer (top row first) as an image; the format
/// follows the file extension.
pub fn save_buffer_to_image(
    buffer: &[u32],
    width: usize,
    height: usize,
    path: &Path,
) -> Result<(), ImageError> {
    let img_buf = ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
        let idx = (y as usize) * width + (x as usize);
        let color = buffer.get(idx).copied().unwrap_or(0);
        Rgb([
            ((color >> 16) & 0xFF) as u8,
            ((color >> 8) & 0xFF) as u8,
            (color & 0xFF) as u8,
        ])
    });
    img_buf.save(path)?;
    info!("Saved {}x{} image to '{}'", width, height, path.display());
    Ok(())
}
