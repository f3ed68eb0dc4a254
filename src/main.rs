mod camera;
mod geom;
mod material;
mod output;
mod progress;
mod render;
mod scene;
mod surfaces;
mod trace;
mod util;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{
    Parser,
    ValueEnum,
};
use log::LevelFilter;
use once_cell::sync::Lazy;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::render::RenderSettings;
use crate::scene::example::Example;

static NUM_CPUS: Lazy<String> = Lazy::new(|| {
    ::std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .to_string()
});

static THREADS_HELP: Lazy<String> = Lazy::new(|| {
    format!(
        "Number of threads to use [default: {}]\n\n\
             Defaults to the number of logical cpus.",
        &*NUM_CPUS
    )
});

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser)]
/// A simple sphere path tracer in rust.
struct TracerOpt {
    /// Number of samples to take per pixel.
    #[arg(long, short, default_value_t = 16)]
    num_samples: usize,
    /// Maximum number of bounces per ray.
    #[arg(long, default_value_t = 50)]
    max_depth: usize,
    /// Destination of the output image.
    ///
    /// supported formats: png, ppm
    #[arg(long, short, default_value = "output.png")]
    output: PathBuf,
    /// Number of threads to use.
    ///
    /// Defaults to the logical number of cpus.
    #[arg(long, short = 't', help = THREADS_HELP.as_str(), default_value = NUM_CPUS.as_str())]
    threads: usize,
    /// Output image width.
    #[arg(long, default_value_t = 400)]
    width: usize,
    /// Output image height.
    #[arg(long)]
    height: Option<usize>,
    /// Output image aspect ratio [default: 1.5].
    #[arg(long, conflicts_with = "height")]
    aspect_ratio: Option<f64>,
    /// Seed to use for RNG.
    ///
    /// By default the RNG will be seeded through the OS-provided entropy source.
    #[arg(long)]
    seed: Option<u64>,
    /// A scene file to load from configuration.
    #[arg(long, conflicts_with = "example")]
    scene: Option<PathBuf>,
    /// Built-in scene to render: random-spheres, materials or two-spheres.
    #[arg(long, default_value = "random-spheres")]
    example: Example,
    /// Log level, overridden by RUST_LOG.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
    /// Don't draw the progress bar.
    #[arg(long)]
    no_progress: bool,
}

impl TracerOpt {
    const DEFAULT_ASPECT_RATIO: f64 = 1.5;

    fn aspect_ratio(&self) -> anyhow::Result<f64> {
        let aspect_ratio = if let Some(height) = self.height {
            self.width as f64 / height as f64
        } else if let Some(aspect_ratio) = self.aspect_ratio {
            aspect_ratio
        } else {
            TracerOpt::DEFAULT_ASPECT_RATIO
        };
        if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
            anyhow::bail!("aspect ratio must be finite and positive, got {}", aspect_ratio);
        }
        Ok(aspect_ratio)
    }

    fn settings(&self) -> anyhow::Result<RenderSettings> {
        if self.width == 0 || self.height == Some(0) {
            anyhow::bail!(
                "image must be at least 1x1, got {}x{}",
                self.width,
                self.height.unwrap_or(0)
            );
        }
        let height = match self.height {
            Some(height) => height as f64,
            None => (self.width as f64 / self.aspect_ratio()?).floor(),
        };
        // PNG dimensions are 32 bit.
        if height < 1.0 || height > u32::MAX as f64 || self.width > u32::MAX as usize {
            anyhow::bail!(
                "image must be between 1x1 and {0}x{0}, got {1}x{2}",
                u32::MAX,
                self.width,
                height
            );
        }
        Ok(RenderSettings {
            width: self.width,
            height: height as usize,
            samples_per_pixel: self.num_samples,
            max_depth: self.max_depth,
            seed: self.seed,
        })
    }
}

fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> anyhow::Result<()> {
    let config = TracerOpt::parse();
    init_logger(config.log_level.into());

    let settings = config.settings()?;
    let aspect_ratio = config.aspect_ratio()?;
    let rays = settings
        .width
        .checked_mul(settings.height)
        .and_then(|pixels| pixels.checked_mul(settings.samples_per_pixel))
        .map(|rays| rays as f64)
        .unwrap_or(f64::INFINITY);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .context("could not start render threads")?;

    let (scene, camera) = if let Some(ref path) = config.scene {
        scene::load_scene(path, aspect_ratio)
            .with_context(|| format!("load scene file '{}'", path.display()))?
    } else {
        let mut rng = config
            .seed
            .map(SmallRng::seed_from_u64)
            .unwrap_or_else(SmallRng::from_entropy);
        config.example.scene(aspect_ratio, &mut rng)
    };
    log::info!(
        "rendering {} objects at {}x{}, {} samples per pixel on {} threads",
        scene.world().len(),
        settings.width,
        settings.height,
        settings.samples_per_pixel,
        pool.current_num_threads()
    );

    let start = Instant::now();
    let progress = progress::ProgressBar::new(settings.height);
    let recorder = progress.create_recorder();
    let image = ::std::thread::scope(|s| {
        if !config.no_progress {
            s.spawn(|| progress.run(settings.width, settings.samples_per_pixel));
        }
        pool.install(|| render::render(&scene, &camera, &settings, Some(&recorder)))
    });

    let elapsed_sec = start.elapsed().as_secs_f64();
    let rays_per_sec = rays / elapsed_sec;
    log::info!("done in {elapsed_sec:.2}s ({rays_per_sec:.0} rays/s)");

    output::save(&config.output, &image)?;
    log::info!("wrote {}", config.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> TracerOpt {
        TracerOpt::try_parse_from(::std::iter::once("sphere-tracer").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn height_follows_aspect_ratio() {
        let opt = parse(&["--width", "300"]);
        assert_eq!(opt.settings().unwrap().height, 200);
        assert_eq!(opt.aspect_ratio().unwrap(), 1.5);

        let opt = parse(&["--width", "300", "--aspect-ratio", "3"]);
        assert_eq!(opt.settings().unwrap().height, 100);

        let opt = parse(&["--width", "300", "--height", "300"]);
        assert_eq!(opt.aspect_ratio().unwrap(), 1.0);
    }

    #[test]
    fn rejects_degenerate_aspect_ratios() {
        for aspect in ["0", "-1", "1e-300", "NaN", "inf"] {
            let arg = format!("--aspect-ratio={}", aspect);
            let opt = parse(&[arg.as_str()]);
            assert!(opt.settings().is_err(), "aspect ratio {} accepted", aspect);
        }
    }

    #[test]
    fn rejects_empty_images() {
        assert!(parse(&["--width", "0"]).settings().is_err());
        assert!(parse(&["--height", "0"]).settings().is_err());
        // Rounds down to a zero height.
        assert!(parse(&["--width", "1", "--aspect-ratio", "2"]).settings().is_err());
    }
}
