//! lfgeo CLI: refocusing and triangulation estimates for plenoptic cameras.

use std::{fmt::Write as _, fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use lfgeo::core::{parse_real, round_to, CameraParameters, Real};
use lfgeo::engine::{
    max_finite_distance, refocus, refocus_sweep, triangulate, triangulation_sweep, DepthPlane,
    EngineOptions, SensorSize,
};

#[derive(Debug, Parser)]
#[command(name = "lfgeo")]
#[command(about = "Refocusing distance, depth of field and triangulation of plenoptic cameras")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Refocusing distance and depth of field for shift `a`.
    Refo {
        #[command(flatten)]
        camera: CameraArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Baseline, tilt and triangulation distance for gap `G` and disparity `dx`.
    Tria {
        #[command(flatten)]
        camera: CameraArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Stack of depth planes over a range of shifts or disparities.
    Sweep(SweepArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SweepMode {
    /// Vary the refocus shift `a`.
    Refocus,
    /// Vary the disparity `dx`.
    Triangulation,
}

#[derive(Debug, Args)]
struct SweepArgs {
    #[arg(long, value_enum, default_value_t = SweepMode::Refocus)]
    mode: SweepMode,

    /// First shift or disparity.
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    start: i32,

    /// End of the range (exclusive).
    #[arg(long, default_value = "6", allow_negative_numbers = true)]
    end: i32,

    /// Sensor height in mm.
    #[arg(long, default_value = "24.048")]
    sensor_height: Real,

    /// Sensor width in mm.
    #[arg(long, default_value = "36.072")]
    sensor_width: Real,

    #[command(flatten)]
    camera: CameraArgs,

    #[command(flatten)]
    output: OutputArgs,
}

/// Camera parameters: an optional JSON file, then per-field overrides.
#[derive(Debug, Clone, Args)]
struct CameraArgs {
    /// JSON file with camera parameters. Missing fields take defaults.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Pixel pitch in mm.
    #[arg(long, visible_alias = "pp")]
    pixel_pitch: Option<Real>,

    /// Micro lens focal length in mm.
    #[arg(long, visible_alias = "fs")]
    micro_focal_length: Option<Real>,

    /// Micro lens principal plane spacing in mm.
    #[arg(long, visible_alias = "hh", allow_negative_numbers = true)]
    micro_principal_spacing: Option<Real>,

    /// Micro lens pitch in mm.
    #[arg(long, visible_alias = "pm")]
    micro_pitch: Option<Real>,

    /// Exit pupil distance in mm.
    #[arg(long, visible_alias = "dA")]
    exit_pupil_distance: Option<Real>,

    /// Main lens focal length in mm.
    #[arg(long, visible_alias = "fU")]
    main_focal_length: Option<Real>,

    /// Main lens principal plane spacing in mm.
    #[arg(long, visible_alias = "HH", allow_negative_numbers = true)]
    main_principal_spacing: Option<Real>,

    /// Focus distance in mm, or `inf`.
    #[arg(long, visible_alias = "df", value_parser = parse_distance)]
    focus_distance: Option<Real>,

    /// Main lens f-number.
    #[arg(long)]
    f_number: Option<Real>,

    /// Main lens entrance pupil diameter in mm; overrides the f-number.
    #[arg(long, conflicts_with = "f_number")]
    entrance_pupil: Option<Real>,

    /// Refocus shift `a`.
    #[arg(long, short = 'a', allow_negative_numbers = true)]
    refocus: Option<Real>,

    /// Micro image resolution `M` in pixels.
    #[arg(long, short = 'M')]
    micro_image_resolution: Option<Real>,

    /// Viewpoint gap `G`.
    #[arg(long, short = 'G', allow_negative_numbers = true)]
    viewpoint_gap: Option<i32>,

    /// Disparity `dx` in pixels.
    #[arg(long, visible_alias = "dx", allow_negative_numbers = true)]
    disparity: Option<Real>,
}

#[derive(Debug, Clone, Args)]
struct OutputArgs {
    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    /// Fractional digits for printing and for the internal cross-checks.
    #[arg(long, default_value = "4", value_parser = clap::value_parser!(u32).range(..=15))]
    decimals: u32,
}

fn parse_distance(text: &str) -> Result<Real, String> {
    parse_real(text).ok_or_else(|| format!("expected a number or `inf`, got `{text}`"))
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(value)
}

impl CameraArgs {
    fn load(&self) -> Result<CameraParameters> {
        let mut p = match &self.params {
            Some(path) => load_json_file::<CameraParameters>(path)?,
            None => CameraParameters::default(),
        };

        let overrides = [
            (&mut p.pixel_pitch, self.pixel_pitch),
            (&mut p.micro_focal_length, self.micro_focal_length),
            (&mut p.micro_principal_spacing, self.micro_principal_spacing),
            (&mut p.micro_pitch, self.micro_pitch),
            (&mut p.exit_pupil_distance, self.exit_pupil_distance),
            (&mut p.main_focal_length, self.main_focal_length),
            (&mut p.main_principal_spacing, self.main_principal_spacing),
            (&mut p.focus_distance, self.focus_distance),
            (&mut p.f_number, self.f_number),
            (&mut p.refocus, self.refocus),
            (&mut p.micro_image_resolution, self.micro_image_resolution),
            (&mut p.disparity, self.disparity),
        ];
        for (field, value) in overrides {
            if let Some(v) = value {
                *field = v;
            }
        }
        if let Some(g) = self.viewpoint_gap {
            p.viewpoint_gap = g;
        }
        if let Some(d) = self.entrance_pupil {
            p = p.with_entrance_pupil(d);
        }

        p.validate().context("invalid camera parameters")?;
        Ok(p)
    }
}

impl OutputArgs {
    fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            decimals: self.decimals,
            ..EngineOptions::default()
        }
    }
}

fn format_value(value: Real, decimals: u32, unit: &str) -> String {
    if value == Real::INFINITY {
        "infinity".to_string()
    } else if value == Real::NEG_INFINITY {
        "-infinity".to_string()
    } else {
        format!("{:.*} {unit}", decimals as usize, round_to(value, decimals))
    }
}

fn run_refo(camera: &CameraArgs, output: &OutputArgs) -> Result<String> {
    let params = camera.load()?;
    let r = refocus(&params, &output.engine_options()).context("refocusing failed")?;
    if output.json {
        return Ok(serde_json::to_string_pretty(&r)?);
    }

    let n = output.decimals;
    let mut out = String::new();
    let pupil = params.entrance_pupil_diameter();
    writeln!(out, "entrance pupil D:      {}", format_value(pupil, n, "mm"))?;
    let micro_image = params.micro_image_size();
    writeln!(out, "micro image size:      {}", format_value(micro_image, n, "px"))?;
    writeln!(out, "image distance bU:     {}", format_value(r.image_distance, n, "mm"))?;
    writeln!(out, "refocusing distance d: {}", format_value(r.distance, n, "mm"))?;
    writeln!(out, "far border d+:         {}", format_value(r.far_border, n, "mm"))?;
    writeln!(out, "near border d-:        {}", format_value(r.near_border, n, "mm"))?;
    write!(out, "depth of field:        {}", format_value(r.depth_of_field, n, "mm"))?;
    if !r.diagnostics.is_empty() {
        write!(out, "\n{}", r.message())?;
    }
    Ok(out)
}

fn run_tria(camera: &CameraArgs, output: &OutputArgs) -> Result<String> {
    let params = camera.load()?;
    let r = triangulate(&params, &output.engine_options()).context("triangulation failed")?;
    if output.json {
        return Ok(serde_json::to_string_pretty(&r)?);
    }

    let n = output.decimals;
    let mut out = String::new();
    writeln!(out, "image distance bU:         {}", format_value(r.image_distance, n, "mm"))?;
    writeln!(out, "baseline B:                {}", format_value(r.baseline, n, "mm"))?;
    writeln!(out, "tilt angle phi:            {}", format_value(r.tilt_deg, n, "deg"))?;
    write!(out, "triangulation distance Z:  {}", format_value(r.distance, n, "mm"))?;
    if !r.diagnostics.is_empty() {
        write!(out, "\n{}", r.message())?;
    }
    Ok(out)
}

fn run_sweep(args: &SweepArgs) -> Result<String> {
    let params = args.camera.load()?;
    let sensor = SensorSize {
        height: args.sensor_height,
        width: args.sensor_width,
    };
    let opts = args.output.engine_options();
    let range = args.start..args.end;

    let planes: Vec<DepthPlane> = match args.mode {
        SweepMode::Refocus => refocus_sweep(&params, range, &sensor, &opts),
        SweepMode::Triangulation => triangulation_sweep(&params, range, &sensor, &opts),
    }
    .context("sweep failed")?;

    if args.output.json {
        return Ok(serde_json::to_string_pretty(&planes)?);
    }

    let n = args.output.decimals;
    let mut out = String::new();
    for p in &planes {
        writeln!(
            out,
            "{:>4}  d = {:<16}  {} x {}",
            p.index,
            format_value(p.distance, n, "mm"),
            format_value(p.extent_x, n, "mm"),
            format_value(p.extent_y, n, "mm"),
        )?;
    }
    match max_finite_distance(&planes) {
        Some(d) => write!(out, "max finite distance: {}", format_value(d, n, "mm"))?,
        None => write!(out, "no finite distance")?,
    }
    Ok(out)
}

fn run(cli: &Cli) -> Result<String> {
    match &cli.command {
        Commands::Refo { camera, output } => run_refo(camera, output),
        Commands::Tria { camera, output } => run_tria(camera, output),
        Commands::Sweep(args) => run_sweep(args),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    log::debug!("{cli:?}");
    let text = run(&cli)?;
    println!("{text}");
    Ok(())
}
