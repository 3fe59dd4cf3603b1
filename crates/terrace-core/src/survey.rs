//! Survey input files and their on-disk naming convention.
//!
//! A survey is a pair of CSV files sharing a filename prefix in one
//! directory: `<prefix>_terrace_info.csv` holds one row per surveyed
//! terrace point and `<prefix>_baseline_channel_info.csv` one row per
//! baseline channel point. Every output produced from a survey reuses
//! the same prefix.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SurveyError;

const TERRACE_SUFFIX: &str = "_terrace_info.csv";
const CHANNEL_SUFFIX: &str = "_baseline_channel_info.csv";
const REPORT_SUFFIX: &str = "_report.csv";
const PROFILES_SUFFIX: &str = "_terrace_profiles.csv";
const PLOT_STEM: &str = "_terrace_plot";

/// One surveyed terrace point.
///
/// Field names mirror the CSV headers written by the terrace extraction
/// step, hence the serde renames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerraceRecord {
    /// Identifier of the terrace this point belongs to.
    #[serde(rename = "TerraceID")]
    pub terrace_id: i64,
    /// Distance along the baseline channel, metres.
    #[serde(rename = "DistAlongBaseline")]
    pub dist_along_baseline: f64,
    /// Perpendicular distance from the baseline channel, metres.
    #[serde(rename = "DistToBaseline")]
    pub dist_to_baseline: f64,
    /// Surface elevation, metres.
    #[serde(rename = "Elevation")]
    pub elevation: f64,
}

/// One point of the baseline channel profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Distance along the baseline channel, metres.
    #[serde(rename = "DistAlongBaseline")]
    pub dist_along_baseline: f64,
    /// Channel bed elevation, metres.
    #[serde(rename = "Elevation")]
    pub elevation: f64,
}

/// Resolves the per-prefix input and output paths of a survey.
#[derive(Debug, Clone)]
pub struct SurveyPaths {
    base_dir: PathBuf,
    prefix: String,
}

impl SurveyPaths {
    pub fn new(base_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            prefix: prefix.into(),
        }
    }

    fn named(&self, suffix: &str) -> PathBuf {
        self.base_dir.join(format!("{}{}", self.prefix, suffix))
    }

    /// Terrace point file, `<prefix>_terrace_info.csv`.
    pub fn terrace_info(&self) -> PathBuf {
        self.named(TERRACE_SUFFIX)
    }

    /// Baseline channel file, `<prefix>_baseline_channel_info.csv`.
    pub fn channel_info(&self) -> PathBuf {
        self.named(CHANNEL_SUFFIX)
    }

    /// Run report, `<prefix>_report.csv`.
    pub fn report(&self) -> PathBuf {
        self.named(REPORT_SUFFIX)
    }

    /// Reduced profile dump, `<prefix>_terrace_profiles.csv`.
    pub fn terrace_profiles(&self) -> PathBuf {
        self.named(PROFILES_SUFFIX)
    }

    /// Plot file, `<prefix>_terrace_plot.<ext>`.
    pub fn terrace_plot(&self, ext: &str) -> PathBuf {
        self.named(&format!("{}.{}", PLOT_STEM, ext))
    }
}

/// Read all terrace points of a survey, preserving file order.
pub fn read_terrace_csv(paths: &SurveyPaths) -> Result<Vec<TerraceRecord>, SurveyError> {
    let path = paths.terrace_info();
    let file = open(&path)?;
    parse_terrace_rows(file, &path)
}

/// Read all baseline channel points of a survey, preserving file order.
pub fn read_channel_csv(paths: &SurveyPaths) -> Result<Vec<ChannelRecord>, SurveyError> {
    let path = paths.channel_info();
    let file = open(&path)?;
    parse_channel_rows(file, &path)
}

fn open(path: &Path) -> Result<File, SurveyError> {
    File::open(path).map_err(|source| SurveyError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_terrace_rows<R: Read>(reader: R, path: &Path) -> Result<Vec<TerraceRecord>, SurveyError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize() {
        let record: TerraceRecord = row.map_err(|source| SurveyError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

fn parse_channel_rows<R: Read>(reader: R, path: &Path) -> Result<Vec<ChannelRecord>, SurveyError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize() {
        let record: ChannelRecord = row.map_err(|source| SurveyError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}
