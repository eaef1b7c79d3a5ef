use clap::Parser;
use log::{error, info};
use raycaster::app::run;
use raycaster::error::Error;
use raycaster::io::config::{Config, Precision};
use std::process::ExitCode;

/// Ray-casting renderer driven by a TOML scene file.
#[derive(Parser, Debug)]
#[command(name = "raycaster", version, about)]
struct Cli {
    /// Scene file (TOML). Without it an empty default scene is rendered.
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Output image path, overriding `render.output`.
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Numeric backend, overriding `render.precision`.
    #[arg(long, value_enum)]
    precision: Option<Precision>,

    /// Disable shadow rays.
    #[arg(long)]
    no_shadows: bool,

    /// Draw coordinate axes and the ground graticule.
    #[arg(long)]
    overlay: bool,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,
}

impl Cli {
    fn load_config(&self) -> Result<Config, Error> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading config from '{}'", path);
                Config::load(path)?
            }
            None => {
                info!("No config given, using defaults");
                Config::default()
            }
        };

        if let Some(output) = &self.output {
            config.render.output = output.clone();
        }
        if let Some(precision) = self.precision {
            config.render.precision = precision;
        }
        if self.no_shadows {
            config.render.cast_shadows = false;
        }
        if self.overlay {
            config.render.overlay = true;
        }
        if let Some(width) = self.width {
            config.render.width = width;
        }
        if let Some(height) = self.height {
            config.render.height = height;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.load_config().and_then(|config| run(&config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
