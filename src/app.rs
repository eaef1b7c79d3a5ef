use crate::core::math::numeric::{Exact, Real};
use crate::error::Error;
use crate::io::config::{Config, Precision};
use crate::io::image::save_buffer_to_image;
use crate::pipeline::renderer::{RenderOutput, Renderer};
use crate::scene::loader::{SceneSetup, build_scene};
use log::info;
use std::path::Path;
use std::time::Instant;

/// Builds the configured scene and renders it with backend `T`.
pub fn render_config<T: Real>(config: &Config) -> Result<RenderOutput<T>, Error> {
    let start_time = Instant::now();
    let SceneSetup {
        mut universe,
        mut camera,
        settings,
    } = build_scene::<T>(config)?;
    info!("Scene built in {:.2?}", start_time.elapsed());

    let renderer = Renderer::new(settings);
    let output = renderer.render(&mut camera, &mut universe)?;
    Ok(output)
}

/// Runs a single headless render and writes the image to `render.output`.
pub fn run(config: &Config) -> Result<(), Error> {
    info!(
        "Starting render ({}x{}, {:?} precision)...",
        config.render.width, config.render.height, config.render.precision
    );
    let start_time = Instant::now();

    let (pixels, width, height) = match config.render.precision {
        Precision::Float => {
            let out = render_config::<f64>(config)?;
            (out.pixels, out.width, out.height)
        }
        Precision::Rational => {
            let out = render_config::<Exact>(config)?;
            (out.pixels, out.width, out.height)
        }
    };

    info!("Saving output to '{}'...", config.render.output);
    save_buffer_to_image(&pixels, width, height, Path::new(&config.render.output))?;
    info!("Done in {:.2?}.", start_time.elapsed());
    Ok(())
}
