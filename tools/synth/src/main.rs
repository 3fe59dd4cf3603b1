//! Synthetic survey generator: writes a plausible terrace survey pair
//! (`<prefix>_terrace_info.csv` + `<prefix>_baseline_channel_info.csv`) for
//! demos and end-to-end exercise of the profiler. A concave-up channel long
//! profile gets Perlin elevation jitter; terraces sit above it as point
//! clusters with per-row lateral offset and elevation scatter.

use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use terrace_core::{ChannelRecord, SurveyPaths, TerraceRecord};

// ── Channel shape ────────────────────────────────────────────────────────────

/// Channel elevation at the downstream end of the reach, metres.
const OUTLET_ELEVATION: f64 = 150.0;
/// Total channel relief over the reach, metres.
const CHANNEL_RELIEF: f64 = 250.0;
/// Long-profile concavity exponent (1 = straight ramp).
const CONCAVITY: f64 = 1.6;
/// Perlin jitter amplitude on channel elevations, metres.
const CHANNEL_JITTER_M: f64 = 1.5;
/// Perlin roughness amplitude on terrace treads, metres.
const TREAD_ROUGHNESS_M: f64 = 2.0;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "synth",
    about = "Generate a synthetic terrace survey for the profiler"
)]
struct Args {
    /// Output directory.
    #[arg(short = 'd', long, default_value = ".")]
    dir: PathBuf,

    /// Survey file-name prefix.
    #[arg(short = 'f', long)]
    fname_prefix: String,

    /// Random seed.
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of terraces (ignored when --scenario is given).
    #[arg(long, default_value = "6")]
    terraces: usize,

    /// Number of baseline channel stations.
    #[arg(long, default_value = "500")]
    channel_points: usize,

    /// Station spacing along the baseline, metres.
    #[arg(long, default_value = "10")]
    spacing: f64,

    /// JSON scenario file overriding the terrace layout.
    #[arg(long)]
    scenario: Option<PathBuf>,
}

// ── JSON schema for scenario files ───────────────────────────────────────────

#[derive(Deserialize)]
struct ScenarioFile {
    terraces: Vec<TerraceDef>,
}

#[derive(Deserialize, Clone)]
struct TerraceDef {
    id: i64,
    /// Upstream end of the terrace span along the baseline, metres.
    start: f64,
    /// Downstream end of the span, metres.
    end: f64,
    /// Height of the terrace tread above the channel, metres.
    height: f64,
    /// Surveyed rows per station.
    rows_per_station: usize,
}

// ── Generation ───────────────────────────────────────────────────────────────

fn seed32(seed: u64) -> u32 {
    (seed & 0xFFFF_FFFF) as u32
}

/// Smooth channel bed elevation at `dist` metres downstream: steep near the
/// head, flattening toward the outlet.
fn channel_elevation(dist: f64, reach: f64) -> f64 {
    let t = if reach > 0.0 {
        (dist / reach).clamp(0.0, 1.0)
    } else {
        0.0
    };
    OUTLET_ELEVATION + CHANNEL_RELIEF * (1.0 - t).powf(CONCAVITY)
}

/// Concave-up channel long profile with Perlin jitter, one row per station.
fn generate_channel(channel_points: usize, spacing: f64, seed: u64) -> Vec<ChannelRecord> {
    let jitter = Perlin::new(seed32(seed));
    let reach = channel_points.saturating_sub(1) as f64 * spacing;
    let mut records = Vec::with_capacity(channel_points);
    for i in 0..channel_points {
        let dist = i as f64 * spacing;
        let wobble = jitter.get([dist * 0.002, 0.0]);
        records.push(ChannelRecord {
            dist_along_baseline: dist,
            elevation: channel_elevation(dist, reach) + CHANNEL_JITTER_M * wobble,
        });
    }
    records
}

/// Lay out `n` staggered terraces along the reach, treads stepping down
/// toward the outlet as an abandonment sequence would.
fn default_scenario(n: usize, reach: f64) -> Vec<TerraceDef> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n.max(1) as f64;
            let start = reach * (0.08 + 0.8 * t);
            TerraceDef {
                id: (i + 1) as i64,
                start,
                end: (start + reach * 0.15).min(reach),
                height: 40.0 - 25.0 * t,
                rows_per_station: 4,
            }
        })
        .collect()
}

/// Survey points for one terrace. Every row of a station carries the same
/// exact distance value, so the rows group into stations downstream.
fn generate_terrace(
    def: &TerraceDef,
    spacing: f64,
    reach: f64,
    rng: &mut StdRng,
    roughness: &Perlin,
) -> Vec<TerraceRecord> {
    let mut records = Vec::new();
    let mut dist = def.start;
    while dist <= def.end {
        let tread = channel_elevation(dist, reach)
            + def.height
            + TREAD_ROUGHNESS_M * roughness.get([dist * 0.004, def.id as f64 * 7.3]);
        for _ in 0..def.rows_per_station {
            records.push(TerraceRecord {
                terrace_id: def.id,
                dist_along_baseline: dist,
                dist_to_baseline: rng.gen_range(5.0_f64..80.0),
                elevation: tread + rng.gen_range(0.0_f64..0.6),
            });
        }
        dist += spacing;
    }
    records
}

/// Generate the full survey for one seed and scenario.
fn build_survey(args: &Args, scenario: &[TerraceDef]) -> (Vec<TerraceRecord>, Vec<ChannelRecord>) {
    let channel = generate_channel(args.channel_points, args.spacing, args.seed);
    let reach = args.channel_points.saturating_sub(1) as f64 * args.spacing;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let roughness = Perlin::new(seed32(args.seed) ^ 0x00A7);
    let mut terraces = Vec::new();
    for def in scenario {
        terraces.extend(generate_terrace(def, args.spacing, reach, &mut rng, &roughness));
    }
    (terraces, channel)
}

// ── Output ───────────────────────────────────────────────────────────────────

fn write_terrace_csv(path: &Path, records: &[TerraceRecord]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_channel_csv(path: &Path, records: &[ChannelRecord]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let reach = args.channel_points.saturating_sub(1) as f64 * args.spacing;
    let scenario = match &args.scenario {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Cannot read {}", path.display()))?;
            let file: ScenarioFile = serde_json::from_str(&text)
                .with_context(|| format!("Cannot parse {}", path.display()))?;
            file.terraces
        }
        None => default_scenario(args.terraces, reach),
    };

    let (terraces, channel) = build_survey(&args, &scenario);

    let paths = SurveyPaths::new(&args.dir, &args.fname_prefix);
    let terrace_path = paths.terrace_info();
    write_terrace_csv(&terrace_path, &terraces)
        .with_context(|| format!("Cannot write {}", terrace_path.display()))?;
    eprintln!(
        "[synth] Wrote {} terrace points to {}",
        terraces.len(),
        terrace_path.display()
    );

    let channel_path = paths.channel_info();
    write_channel_csv(&channel_path, &channel)
        .with_context(|| format!("Cannot write {}", channel_path.display()))?;
    eprintln!(
        "[synth] Wrote {} channel points to {}",
        channel.len(),
        channel_path.display()
    );

    Ok(())
}
