//! Terrace long-profile plotter: reads a terrace survey (terrace points +
//! baseline channel), keeps the terraces that pass the size and slope
//! filters, and plots their long profiles against downstream distance.
//!
//! Inputs are `<prefix>_terrace_info.csv` and
//! `<prefix>_baseline_channel_info.csv` in the survey directory; outputs
//! land next to them under the same prefix.

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use plotters::prelude::*;

use terrace_core::{
    compute_channel_profile, compute_long_profiles, read_channel_csv, read_terrace_csv,
    ChannelProfile, LongProfileSet, ProfileFilter, SurveyPaths, TerraceProfile,
};

// ── Figure formats ────────────────────────────────────────────────────────────

/// Raster output resolution, dots per inch.
const PLOT_DPI: f64 = 300.0;

/// Scatter colours, cycled per terrace.
const SERIES_COLORS: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

/// Baseline channel overlay colour.
const CHANNEL_COLOR: RGBColor = RGBColor(20, 20, 20);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PlotFormat {
    Png,
    Svg,
}

impl PlotFormat {
    fn extension(self) -> &'static str {
        match self {
            PlotFormat::Png => "png",
            PlotFormat::Svg => "svg",
        }
    }
}

/// Figure width presets: `big` for talks, the journal column widths
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SizeFormat {
    /// 16 inch presentation figure.
    Big,
    /// 6.25 inch Geomorphology column.
    Geomorphology,
    /// 4.92 inch Earth Surface Dynamics column.
    Esurf,
}

impl SizeFormat {
    fn name(self) -> &'static str {
        match self {
            SizeFormat::Big => "big",
            SizeFormat::Geomorphology => "geomorphology",
            SizeFormat::Esurf => "esurf",
        }
    }

    fn width_inches(self) -> f64 {
        match self {
            SizeFormat::Big => 16.0,
            SizeFormat::Geomorphology => 6.25,
            SizeFormat::Esurf => 4.92,
        }
    }

    /// Pixel dimensions at `PLOT_DPI`, 3:2 width to height.
    fn pixels(self) -> (u32, u32) {
        let width = (self.width_inches() * PLOT_DPI).round() as u32;
        let height = (self.width_inches() * PLOT_DPI * 2.0 / 3.0).round() as u32;
        (width, height)
    }
}

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "profiler",
    about = "Plot river terrace long profiles from a terrace survey"
)]
struct Args {
    /// Directory holding the survey CSV files.
    #[arg(short = 'd', long, default_value = ".")]
    dir: PathBuf,

    /// Survey file-name prefix (the DEM name without extension).
    #[arg(short = 'f', long)]
    fname_prefix: Option<String>,

    /// Minimum rows a terrace must exceed to be considered.
    #[arg(long, default_value = "50")]
    min_points: usize,

    /// Distinct-station count a terrace must stay below.
    #[arg(long, default_value = "1000")]
    max_stations: usize,

    /// Mean station-to-station slope (m/m) a terrace must stay below.
    #[arg(long, default_value = "10")]
    max_mean_slope: f64,

    /// Run the long-profile analysis and write the plot.
    #[arg(long)]
    long_profile: bool,

    /// Overlay the baseline channel long profile as a line.
    #[arg(long)]
    channel: bool,

    /// Also write the accepted profiles to <prefix>_terrace_profiles.csv.
    #[arg(long)]
    write_profiles: bool,

    /// Figure format.
    #[arg(long, value_enum, default_value = "png")]
    fmt: PlotFormat,

    /// Figure size preset.
    #[arg(long, value_enum, default_value = "esurf")]
    size: SizeFormat,
}

// ── Report ───────────────────────────────────────────────────────────────────

/// Every resolved argument as (key, value), in declaration order.
fn report_rows(args: &Args, prefix: &str) -> Vec<(String, String)> {
    vec![
        ("dir".into(), args.dir.display().to_string()),
        ("fname_prefix".into(), prefix.into()),
        ("min_points".into(), args.min_points.to_string()),
        ("max_stations".into(), args.max_stations.to_string()),
        ("max_mean_slope".into(), args.max_mean_slope.to_string()),
        ("long_profile".into(), args.long_profile.to_string()),
        ("channel".into(), args.channel.to_string()),
        ("write_profiles".into(), args.write_profiles.to_string()),
        ("fmt".into(), args.fmt.extension().into()),
        ("size".into(), args.size.name().into()),
    ]
}

fn write_report(path: &Path, rows: &[(String, String)]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for (key, value) in rows {
        writer.write_record([key.as_str(), value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_profiles_csv(path: &Path, profiles: &[TerraceProfile]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(["TerraceID", "DistAlongBaseline", "Elevation"])?;
    for profile in profiles {
        for (distance, elevation) in profile.points() {
            writer.write_record([
                profile.terrace_id.to_string(),
                distance.to_string(),
                elevation.to_string(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

// ── Rendering ────────────────────────────────────────────────────────────────

/// Axis ranges covering every drawn point, padded so nothing sits on the
/// frame. Falls back to unit ranges when there is nothing to draw.
fn data_bounds(
    set: &LongProfileSet,
    channel: Option<&ChannelProfile>,
) -> ((f64, f64), (f64, f64)) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    let points = set
        .profiles
        .iter()
        .flat_map(|p| p.points())
        .chain(channel.into_iter().flat_map(|c| c.points()));
    for (x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !x_min.is_finite() || !x_max.is_finite() {
        x_min = 0.0;
        x_max = 1.0;
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }

    // 5% padding, at least one metre so zero-extent data stays drawable.
    let x_pad = ((x_max - x_min) * 0.05).max(1.0);
    let y_pad = ((y_max - y_min) * 0.05).max(1.0);
    ((x_min - x_pad, x_max + x_pad), (y_min - y_pad, y_max + y_pad))
}

fn render_profiles(
    path: &Path,
    format: PlotFormat,
    size: (u32, u32),
    set: &LongProfileSet,
    channel: Option<&ChannelProfile>,
) -> Result<()> {
    match format {
        PlotFormat::Png => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_profile_chart(root, set, channel)
        }
        PlotFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_profile_chart(root, set, channel)
        }
    }
}

fn draw_profile_chart<DB>(
    root: DrawingArea<DB, plotters::coord::Shift>,
    set: &LongProfileSet,
    channel: Option<&ChannelProfile>,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let ((x_min, x_max), (y_min, y_max)) = data_bounds(set, channel);

    let mut chart = ChartBuilder::on(&root)
        .margin(30)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    // No label areas are configured, so the mesh draws grid lines only and
    // never touches a font.
    chart
        .configure_mesh()
        .light_line_style(RGBColor(235, 235, 235))
        .bold_line_style(RGBColor(210, 210, 210))
        .draw()?;

    // Channel underneath, terraces on top.
    if let Some(channel) = channel {
        chart.draw_series(LineSeries::new(
            channel.points(),
            CHANNEL_COLOR.stroke_width(2),
        ))?;
    }

    for (i, profile) in set.profiles.iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        chart.draw_series(
            profile
                .points()
                .map(|(x, y)| Circle::new((x, y), 3, color.filled())),
        )?;
    }

    root.present()?;
    Ok(())
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn print_welcome() {
    println!();
    println!("=======================================================================");
    println!("Hello! Welcome to the terrace long profiler tool.");
    println!("You will need to tell me which directory to look in.");
    println!("Use the -d flag to define the survey directory.");
    println!("If you don't do this I will assume the data is in the current directory.");
    println!("For help run:");
    println!("   profiler --help");
    println!("=======================================================================");
    println!();
}

fn run_long_profile(args: &Args, paths: &SurveyPaths) -> Result<()> {
    let terraces = read_terrace_csv(paths)?;
    let channel_rows = read_channel_csv(paths)?;
    eprintln!(
        "[profiler] Loaded {} terrace points, {} channel points",
        terraces.len(),
        channel_rows.len()
    );

    let filter = ProfileFilter {
        min_points: args.min_points,
        max_stations: args.max_stations,
        max_mean_slope: args.max_mean_slope,
    };
    let set = compute_long_profiles(&terraces, &filter);
    eprintln!(
        "[profiler] Kept {} of {} terraces",
        set.profiles.len(),
        set.candidate_ids.len()
    );
    if set.profiles.is_empty() {
        eprintln!("[warn] No terrace passed the filters; the plot will be sparse.");
    }

    let channel = if args.channel {
        Some(compute_channel_profile(&channel_rows))
    } else {
        None
    };

    let plot_path = paths.terrace_plot(args.fmt.extension());
    render_profiles(&plot_path, args.fmt, args.size.pixels(), &set, channel.as_ref())
        .with_context(|| format!("Cannot write {}", plot_path.display()))?;
    eprintln!("[profiler] Wrote {}", plot_path.display());

    if args.write_profiles {
        let out = paths.terrace_profiles();
        write_profiles_csv(&out, &set.profiles)
            .with_context(|| format!("Cannot write {}", out.display()))?;
        eprintln!("[profiler] Wrote {}", out.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    // A bare invocation gets the welcome screen, not a clap error.
    if env::args_os().len() <= 1 {
        print_welcome();
        return Ok(());
    }

    let args = Args::parse();

    let Some(prefix) = args.fname_prefix.clone() else {
        bail!("no file-name prefix supplied; set one with -f/--fname-prefix");
    };
    let paths = SurveyPaths::new(&args.dir, &prefix);

    // Reproducibility record: every resolved argument, one line each.
    let report_path = paths.report();
    write_report(&report_path, &report_rows(&args, &prefix))
        .with_context(|| format!("Cannot write {}", report_path.display()))?;
    eprintln!("[profiler] Wrote {}", report_path.display());

    if args.long_profile {
        run_long_profile(&args, &paths)?;
    } else {
        eprintln!("[profiler] Nothing to do; pass --long-profile to run the analysis.");
    }

    Ok(())
}
