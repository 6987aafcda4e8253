use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::{ArgAction, Parser};
use stitch_cli::{PanoramaError, PanoramaOrchestrator, io, visualize};
use stitch_core::{ProjectionMode, StitchConfig, init_thread_pool};
use stitch_features::OrbFinder;

/// Stitch images taken by rotating about the optical centre into one panorama.
#[derive(Debug, Parser)]
#[command(author, version, about = "Radial panorama stitcher")]
struct Args {
    /// Input images, ordered left to right
    #[arg(required_unless_present = "dump_config")]
    images: Vec<PathBuf>,

    /// Output file; the format follows the extension
    #[arg(short, long, default_value = "panorama.jpg")]
    output: PathBuf,

    /// Also write the canvas alpha coverage as a greyscale image
    #[arg(long)]
    alpha_output: Option<PathBuf>,

    /// JSON or TOML configuration file. Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Focal length in pixels
    #[arg(long)]
    focal: Option<f64>,

    /// Projection surface: spherical or cylindrical
    #[arg(long)]
    projection: Option<ProjectionMode>,

    /// RANSAC agreement tolerance in pixels
    #[arg(long)]
    tolerance: Option<f64>,

    /// RANSAC trials per pair (default: one per correspondence)
    #[arg(long)]
    trials: Option<usize>,

    /// RANSAC random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Fail a pair instead of falling back when no hypothesis gains support
    #[arg(long)]
    require_consensus: bool,

    /// Worker threads for per-pixel work
    #[arg(long)]
    threads: Option<usize>,

    /// Write a match visualisation per adjacent pair into this directory
    #[arg(long)]
    matches_dir: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            _ => "trace",
        }
    }

    fn build_config(&self) -> Result<StitchConfig, PanoramaError> {
        let mut cfg = match &self.config {
            Some(path) => StitchConfig::load(path).map_err(|e| PanoramaError::Config {
                path: path.clone(),
                message: e.to_string(),
            })?,
            None => StitchConfig::default(),
        };

        if let Some(focal) = self.focal {
            cfg.projection.focal_length = focal;
        }
        if let Some(mode) = self.projection {
            cfg.projection.mode = mode;
        }
        if let Some(tolerance) = self.tolerance {
            cfg.ransac.tolerance = tolerance;
        }
        if self.trials.is_some() {
            cfg.ransac.trials = self.trials;
        }
        if let Some(seed) = self.seed {
            cfg.ransac.seed = seed;
        }
        if self.require_consensus {
            cfg.ransac.require_consensus = true;
        }
        if let Some(threads) = self.threads {
            cfg.n_threads = threads;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .format_timestamp(Some(env_logger::fmt::TimestampPrecision::Seconds))
        .init();

    let cfg = args.build_config()?;
    if args.dump_config {
        print!("{}", cfg.to_toml()?);
        return Ok(());
    }

    init_thread_pool(cfg.n_threads).map_err(PanoramaError::from)?;
    log::info!("{}", cfg.summary());

    let images = io::load_sequence(&args.images)?;
    log::info!("Stitching {} images...", images.len());

    let t0 = Instant::now();
    let orchestrator = PanoramaOrchestrator::new(OrbFinder::new(cfg.features.clone()), &cfg);
    let projected = orchestrator.prepare(&images)?;
    let panorama = orchestrator.stitch_prepared(&projected)?;
    log::info!("Stitched in {:.2?}", t0.elapsed());

    for pair in &panorama.report.pairs {
        log::info!(
            "Image {} placed at {} ({} matches, consensus {})",
            pair.index,
            panorama.report.transforms[pair.index],
            pair.correspondences.len(),
            pair.fit.consensus
        );
    }
    let fallbacks = panorama.report.fallback_pairs();
    if !fallbacks.is_empty() {
        log::warn!("Images placed without consensus: {:?}", fallbacks);
    }

    if let Some(dir) = &args.matches_dir {
        std::fs::create_dir_all(dir)?;
        for pair in &panorama.report.pairs {
            visualize::save_matches(
                dir,
                pair.index,
                &projected[pair.index].image,
                &projected[pair.index - 1].image,
                &pair.correspondences,
            )?;
        }
    }

    io::save_image(&panorama.canvas, &args.output)?;
    if let Some(path) = &args.alpha_output {
        io::save_alpha(&panorama.alpha, path)?;
    }
    Ok(())
}
