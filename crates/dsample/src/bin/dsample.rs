use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use dsample::gray::{self, GrayImageError};
use dsample::planar::DsampleIoError;
use dsample::volume::{volume_gauss_fast_with, volume_gauss_slow_with};
use dsample::{
    DegeneratePolicy, DownsampleConfig, DownsampleError, DownsampleParams, DownsampleReport,
    DownsampleStats, Downsampler, FloatGrid, FloatGridView, VolumeError, VolumeGaussParams,
};
use log::LevelFilter;

#[cfg(not(feature = "tracing"))]
use log::{error, info};
#[cfg(feature = "tracing")]
use tracing::{error, info};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] DsampleIoError),
    #[error(transparent)]
    Image(#[from] GrayImageError),
    #[error(transparent)]
    Downsample(#[from] DownsampleError),
    #[error(transparent)]
    Volume(#[from] VolumeError),
    #[error("logger setup failed: {0}")]
    Logger(String),
    #[error("{0}")]
    Usage(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "dsample",
    version,
    about = "Content-adaptive downsampling of medical images and volumes"
)]
struct Cli {
    /// Log verbosity.
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,

    /// Emit tracing spans as JSON.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Downsample a grayscale image and write every stage as a PNG.
    Image(ImageArgs),
    /// Smooth a raw 8-bit volume.
    Volume(VolumeArgs),
}

#[derive(Args, Debug)]
struct ImageArgs {
    /// Input image; overrides `input_path` from the config.
    input: Option<PathBuf>,

    /// JSON run config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scale applied to both sides when no explicit size is given.
    #[arg(long, conflicts_with_all = ["width", "height"])]
    scale: Option<f32>,

    #[arg(long, requires = "height")]
    width: Option<usize>,

    #[arg(long, requires = "width")]
    height: Option<usize>,

    /// Positional sigma of the bilateral stage.
    #[arg(long)]
    sigma_pos: Option<f32>,

    /// Value sigma of the bilateral stage.
    #[arg(long)]
    sigma_val: Option<f32>,

    /// Skip the diagnostic stages and compute only the final result.
    #[arg(long)]
    final_only: bool,

    /// Fail instead of falling back when residual weights vanish.
    #[arg(long)]
    strict: bool,

    /// Directory for stage images and `report.json`.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct VolumeArgs {
    /// Raw voxels, one byte each, x fastest.
    input: PathBuf,

    /// Volume size as `WxHxD`.
    #[arg(long, value_parser = parse_dims)]
    dims: (usize, usize, usize),

    /// Use the table-driven pass.
    #[arg(long)]
    fast: bool,

    #[arg(long)]
    radius: Option<usize>,

    #[arg(long)]
    sigma: Option<f32>,

    #[arg(long)]
    output: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn parse_dims(raw: &str) -> Result<(usize, usize, usize), String> {
    let parts: Vec<&str> = raw.split(['x', 'X']).collect();
    let [w, h, d] = parts.as_slice() else {
        return Err(format!("expected WxHxD, got '{raw}'"));
    };
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .ok()
            .filter(|&v| v > 0)
            .ok_or_else(|| format!("invalid dimension '{s}' in '{raw}'"))
    };
    Ok((parse(w)?, parse(h)?, parse(d)?))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    #[cfg(feature = "tracing")]
    dsample::core::init_tracing(cli.log_json);
    #[cfg(not(feature = "tracing"))]
    if let Err(err) = dsample::core::init_with_level(cli.log_level.into()) {
        eprintln!("{}", CliError::Logger(err.to_string()));
        return ExitCode::FAILURE;
    }

    let res = match cli.command {
        Command::Image(args) => run_image(args),
        Command::Volume(args) => run_volume(args),
    };
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &ImageArgs) -> Result<(DownsampleConfig, Option<PathBuf>), CliError> {
    let mut cfg = match &args.config {
        Some(path) => DownsampleConfig::load_json(path)?,
        None => {
            let input = args
                .input
                .as_ref()
                .ok_or_else(|| CliError::Usage("an input image or --config is required".into()))?;
            DownsampleConfig::new(input.to_string_lossy())
        }
    };
    if let Some(input) = &args.input {
        cfg.input_path = input.to_string_lossy().into_owned();
    }
    if let Some(scale) = args.scale {
        cfg.scale = scale;
        cfg.dst_width = None;
        cfg.dst_height = None;
    }
    if let (Some(w), Some(h)) = (args.width, args.height) {
        cfg.dst_width = Some(w);
        cfg.dst_height = Some(h);
    }
    if let Some(dir) = &args.out_dir {
        cfg.output_dir = Some(dir.to_string_lossy().into_owned());
    }
    Ok((cfg, args.config.clone()))
}

fn save_stage(
    report: &mut DownsampleReport,
    dir: &Path,
    name: &str,
    grid: &FloatGridView<'_>,
) -> Result<(), CliError> {
    let path = dir.join(format!("{name}.png"));
    gray::save_gray(grid, &path)?;
    report.add_output(&path);
    Ok(())
}

fn run_session(
    source: FloatGrid,
    dst: (usize, usize),
    params: DownsampleParams,
) -> Result<(Downsampler, DownsampleStats), DownsampleError> {
    let mut session = Downsampler::from_source(source, dst.0, dst.1, params)?;
    let stats = session.run_all()?;
    Ok((session, stats))
}

fn run_image(args: ImageArgs) -> Result<(), CliError> {
    let (cfg, config_path) = load_config(&args)?;

    let mut params = cfg.build_params();
    if let Some(sigma) = args.sigma_pos {
        params.bilateral.sigma_pos = sigma;
    }
    if let Some(sigma) = args.sigma_val {
        params.bilateral.sigma_val = sigma;
    }
    params.final_only |= args.final_only;
    if args.strict {
        params.degenerate_policy = DegeneratePolicy::Error;
    }

    let img = gray::load_gray(&cfg.input_path)?;
    let source = gray::grid_from_gray(&img)?;
    let (src_w, src_h) = source.dims();
    let (dst_w, dst_h) = cfg.target_dims(src_w, src_h)?;
    info!("{}: {}x{} -> {}x{}", cfg.input_path, src_w, src_h, dst_w, dst_h);

    let out_dir = cfg.output_dir();
    fs::create_dir_all(&out_dir)?;
    let report_path = out_dir.join("report.json");
    let mut report = DownsampleReport::new(
        cfg.input_path.clone(),
        (src_w, src_h),
        (dst_w, dst_h),
        params.clone(),
    );
    report.config_path = config_path.map(|p| p.to_string_lossy().into_owned());

    let (session, stats) = match run_session(source, (dst_w, dst_h), params) {
        Ok(ok) => ok,
        Err(err) => {
            report.set_error(&err);
            report.write_json(&report_path)?;
            return Err(err.into());
        }
    };

    if !session.params().final_only {
        save_stage(&mut report, &out_dir, "subsample", &session.subsample())?;
        save_stage(&mut report, &out_dir, "gauss", &session.gauss())?;
        save_stage(&mut report, &out_dir, "bilateral", &session.bilateral())?;
    }
    save_stage(&mut report, &out_dir, "restored", &session.restored())?;
    save_stage(&mut report, &out_dir, "downsampled", &session.downsampled())?;

    info!(
        "done in {:.2} ms, {} fallback pixels",
        stats.total_ms(),
        stats.fallback_pixels
    );
    report.set_stats(stats);
    report.write_json(&report_path)?;
    println!(
        "wrote {} images and {}",
        report.outputs.len(),
        report_path.display()
    );
    Ok(())
}

fn run_volume(args: VolumeArgs) -> Result<(), CliError> {
    let (w, h, d) = args.dims;
    let mut params = VolumeGaussParams::default();
    if let Some(radius) = args.radius {
        params.radius = radius;
    }
    if let Some(sigma) = args.sigma {
        params.sigma = sigma;
    }

    let src = fs::read(&args.input)?;
    let start = Instant::now();
    let out = if args.fast {
        volume_gauss_fast_with(&src, w, h, d, params)?
    } else {
        volume_gauss_slow_with(&src, w, h, d, params)?
    };
    let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;
    fs::write(&args.output, &out)?;

    info!(
        "{} pass on {}x{}x{} took {:.2} ms",
        if args.fast { "table" } else { "reference" },
        w,
        h,
        d,
        elapsed_ms
    );
    println!("wrote {}", args.output.display());
    Ok(())
}
