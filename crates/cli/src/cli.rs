use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use covertype::{ExportFormat, HistoryKind, SoilType, TerrainSample, WildernessArea};
use std::path::{Path, PathBuf};

/// covertype: forest cover type prediction from terrain measurements
///
/// Scores single terrain patches or CSV batches with a gradient-boosted
/// tree ensemble and keeps a local history of every prediction.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub struct Cli {
    /// Path to configuration file.
    ///
    /// If not provided, `covertype.toml` and `covertype.d/*.toml` in the
    /// working directory are checked, the latter being a glob pattern. If
    /// they don't exist, the default configuration is used.
    #[arg(short, long, value_parser = validate_file)]
    pub config: Option<PathBuf>,

    /// Model artifact to load instead of the configured one.
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Keep history in memory only; nothing is read from or written to disk.
    #[arg(long)]
    pub no_history: bool,

    /// Do not write prediction artifacts.
    #[arg(long)]
    pub no_artifacts: bool,

    /// Path to log file.
    ///
    /// Logs go to stderr when not given.
    #[arg(short, long)]
    pub logfile: Option<PathBuf>,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Predict the cover type of one terrain patch.
    Predict(PredictArgs),

    /// Predict every row of a CSV file.
    Batch {
        /// CSV with the 54 feature columns. Extra columns are ignored.
        #[arg(value_parser = validate_file)]
        file: PathBuf,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Inspect and export prediction history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Write a CSV template for batch uploads.
    Template {
        /// Number of data rows.
        #[arg(short, long, default_value_t = 3)]
        rows: usize,

        /// Cycle through fixed example rows instead of random ones.
        #[arg(long)]
        fixed: bool,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Draw every attribute at random.
    #[arg(long)]
    pub random: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Elevation in meters.
    #[arg(long, default_value_t = 2500)]
    pub elevation: i32,

    /// Aspect in degrees azimuth.
    #[arg(long, default_value_t = 180)]
    pub aspect: i32,

    /// Slope in degrees.
    #[arg(long, default_value_t = 30)]
    pub slope: i32,

    /// Horizontal distance to the nearest surface water, in meters.
    #[arg(long, default_value_t = 250)]
    pub horz_dist_hydro: i32,

    /// Vertical distance to the nearest surface water; negative below it.
    #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
    pub vert_dist_hydro: i32,

    /// Horizontal distance to the nearest roadway.
    #[arg(long, default_value_t = 600)]
    pub horz_dist_road: i32,

    /// Horizontal distance to the nearest wildfire ignition point.
    #[arg(long, default_value_t = 800)]
    pub horz_dist_fire: i32,

    /// Hillshade index at 9am (0-255).
    #[arg(long, default_value_t = 124)]
    pub hillshade_9am: i32,

    /// Hillshade index at noon (0-255).
    #[arg(long, default_value_t = 124)]
    pub hillshade_noon: i32,

    /// Hillshade index at 3pm (0-255).
    #[arg(long, default_value_t = 124)]
    pub hillshade_3pm: i32,

    /// Wilderness area, e.g. `Wilderness_Area2` or `2`.
    #[arg(long, default_value = "Wilderness_Area1")]
    pub wilderness_area: WildernessArea,

    /// Soil type, e.g. `Soil_Type17` or `17`.
    #[arg(long, default_value = "Soil_Type1")]
    pub soil_type: SoilType,
}

impl PredictArgs {
    pub fn sample(&self) -> TerrainSample {
        TerrainSample {
            elevation: self.elevation,
            aspect: self.aspect,
            slope: self.slope,
            horz_dist_hydro: self.horz_dist_hydro,
            vert_dist_hydro: self.vert_dist_hydro,
            horz_dist_road: self.horz_dist_road,
            horz_dist_fire: self.horz_dist_fire,
            hillshade_9am: self.hillshade_9am,
            hillshade_noon: self.hillshade_noon,
            hillshade_3pm: self.hillshade_3pm,
            wilderness_area: self.wilderness_area,
            soil_type: self.soil_type,
        }
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum HistoryAction {
    /// List matching records, most recent first.
    List(HistoryFilter),

    /// Export matching records.
    Export {
        #[command(flatten)]
        filter: HistoryFilter,

        /// Output format.
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Record counts and mean single-prediction confidence.
    Summary,
}

#[derive(Debug, Args, Clone)]
pub struct HistoryFilter {
    /// Which records to look at.
    #[arg(short, long, default_value = "single")]
    pub kind: HistoryKind,

    /// Case-insensitive text every record must contain.
    #[arg(short, long)]
    pub search: Option<String>,

    /// Earliest date to include (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest date to include (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Look past the display window at every retained record.
    #[arg(short, long)]
    pub all: bool,
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.exists() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}
