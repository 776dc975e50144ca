//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::application::services::STDIN_SOURCE;

/// Record trees and grouping, color, date, validation and file helpers
#[derive(Parser, Debug)]
#[command(name = "rsutil")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory searched for `.rsutil.toml` (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Shape flat JSON records into trees or groups
    Data {
        #[command(subcommand)]
        command: DataCommands,
    },

    /// Convert and derive colors
    Color {
        #[command(subcommand)]
        command: ColorCommands,
    },

    /// Format, parse and shift dates
    Time {
        #[command(subcommand)]
        command: TimeCommands,
    },

    /// Check a value against a format
    Validate {
        /// Format to check
        #[arg(value_enum)]
        kind: ValidateKind,
        /// Value to check
        value: String,
    },

    /// File names, sizes and data URLs
    File {
        #[command(subcommand)]
        command: FileCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Where records come from and which attributes link them.
#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    /// JSON array file, `-` for stdin
    #[arg(default_value = STDIN_SOURCE, value_hint = ValueHint::FilePath)]
    pub input: String,
    /// Identifier attribute
    #[arg(long)]
    pub id: Option<String>,
    /// Parent identifier attribute
    #[arg(long)]
    pub parent_id: Option<String>,
    /// Child-list attribute written to the output
    #[arg(long)]
    pub children: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Nest records under their parents
    Tree {
        #[command(flatten)]
        args: TreeArgs,
        /// Print an indented tree labelled by this attribute instead of JSON
        #[arg(short, long)]
        label: Option<String>,
        /// Write JSON to a file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Partition records by an attribute value
    Group {
        /// JSON array file, `-` for stdin
        #[arg(default_value = STDIN_SOURCE, value_hint = ValueHint::FilePath)]
        input: String,
        /// Key attribute (default: `group.key` setting)
        #[arg(short, long)]
        key: Option<String>,
        /// Write JSON to a file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// List every root-to-leaf identifier path
    Branches {
        #[command(flatten)]
        args: TreeArgs,
    },

    /// List records without children
    Leaves {
        #[command(flatten)]
        args: TreeArgs,
        /// Attribute printed for each leaf (default: the identifier)
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Show record, root, depth and leaf counts
    Stats {
        #[command(flatten)]
        args: TreeArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum ColorCommands {
    /// `#rrggbb` to r, g, b
    HexToRgb { hex: String },

    /// r, g, b (0-255) to `#rrggbb`
    RgbToHex { r: f64, g: f64, b: f64 },

    /// `#rrggbb` to hue, saturation, lightness
    HexToHsl { hex: String },

    /// Hue (0-360), saturation and lightness (0-100) to `#rrggbb`
    HslToHex { h: f64, s: f64, l: f64 },

    /// `#rrggbb` to `rgba(...)`
    HexToRgba {
        hex: String,
        /// Alpha channel (0-1)
        #[arg(short, long, default_value_t = 1.0)]
        alpha: f64,
    },

    /// `rgb(...)` or `rgba(...)` to hex
    RgbaToHex {
        rgba: String,
        /// Append the alpha byte
        #[arg(short, long)]
        alpha: bool,
    },

    /// Blend two colors
    Gradient {
        start: String,
        end: String,
        /// Number of steps (default: `gradient_steps` setting)
        #[arg(short, long)]
        steps: Option<usize>,
    },

    /// Opposite hue
    Complementary { hex: String },

    /// Three hues 120 degrees apart
    Triadic { hex: String },

    /// Random light (default) or dark color
    Random {
        #[arg(short, long)]
        dark: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TimeCommands {
    /// Current local time
    Now {
        /// Pattern with YYYY MM DD HH mm ss SSS (default: `date_format` setting)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Reformat a date
    Format {
        /// Date text or millisecond timestamp
        date: String,
        /// Pattern with YYYY MM DD HH mm ss SSS (default: `date_format` setting)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Lay out a compact digit string such as `20240315`
    Num {
        digits: String,
        #[arg(short, long, value_enum, default_value_t = NumLayout::Auto)]
        layout: NumLayout,
    },

    /// Describe how long ago a date was
    Relative { date: String },

    /// Shift a date
    Add {
        date: String,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        years: i32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        months: i32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        days: i64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        hours: i64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        minutes: i64,
    },

    /// Calendar facts about a date
    Info { date: String },

    /// Whole days between two dates
    Diff { from: String, to: String },

    /// Human-readable duration of a millisecond count
    Duration {
        #[arg(allow_hyphen_values = true)]
        millis: i64,
    },

    /// Age in whole years on today's date
    Age { birth: String },

    /// Consecutive dates starting at a date
    Range {
        date: String,
        /// Negative counts reach backwards
        #[arg(short, long, default_value_t = 7, allow_hyphen_values = true)]
        days: i64,
    },

    /// Every date of the month containing a date
    Month { date: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumLayout {
    Date,
    Time,
    Datetime,
    Auto,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateKind {
    Phone,
    Email,
    Url,
    IdCard,
    Numeric,
}

#[derive(Subcommand, Debug)]
pub enum FileCommands {
    /// Name, extension, mime type and size of a file
    Info {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },

    /// Human-readable byte count
    Size {
        bytes: u64,
        /// Decimals (default: `size_decimals` setting)
        #[arg(short, long)]
        decimals: Option<usize>,
    },

    /// Timestamped variant of a file name
    Unique { filename: String },

    /// Print a file as a data URL
    Encode {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },

    /// Write the payload of a data URL to a file
    Decode {
        /// Data URL, `-` for stdin
        data_url: String,
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Re-encode an image as a scaled-down JPEG
    Compress {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
        /// Longest side in pixels (default: `image.max_width` setting)
        #[arg(long)]
        max_width: Option<u32>,
        /// JPEG quality 0-1 (default: `image.quality` setting, else by size)
        #[arg(short, long)]
        quality: Option<f32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a commented config template
    Template,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
