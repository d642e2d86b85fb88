//! Importer configuration from environment variables and command-line flags

use std::env;
use std::path::PathBuf;

use chess_core::encoding::{BinaryFormat, EncodingLayout};
use chess_core::game_data::{RatingFormula, DEFAULT_EXCLUDED_TAGS};

use crate::error::ImportError;

pub const USAGE: &str = "Usage: pgn-importer [--input <pgn file or glob>] [--output <sqlite file>] \
[--encoding-width <bits>] [--legacy-layout] [--binary-format packed|bit-string] \
[--rating-formula average|legacy-white-only] [--exclude-tags <Tag,Tag>] [--progress-interval <games>]";

#[derive(Clone, Debug)]
pub struct ImportConfig {
    /// PGN file, or a glob pattern matching several files imported in path order
    pub input_path: String,

    /// SQLite database receiving `game_summary` and `position_fact`
    pub output_path: PathBuf,

    /// Total bits per encoded position (773 and 800 are the named layouts)
    pub encoding_width: usize,

    /// Place each color's castling bits directly after its piece masks
    pub legacy_layout: bool,

    pub binary_format: BinaryFormat,

    pub rating_formula: RatingFormula,

    /// Header keys dropped while collecting a game
    pub excluded_tags: Vec<String>,

    /// Log progress every this many games (skipped games included)
    pub progress_interval: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            input_path: "lichess_db_standard_rated_2016-05.pgn".to_string(),
            output_path: PathBuf::from("lichess_db_standard_rated_2016-05.sqlite"),
            encoding_width: 800,
            legacy_layout: false,
            binary_format: BinaryFormat::Packed,
            rating_formula: RatingFormula::Average,
            excluded_tags: DEFAULT_EXCLUDED_TAGS.iter().map(|t| t.to_string()).collect(),
            progress_interval: 100_000,
        }
    }
}

impl ImportConfig {
    /// Load from the process environment (and `.env`), then apply `args`.
    pub fn load(args: &[String]) -> Result<Self, ImportError> {
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())?.with_args(args)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ImportError> {
        let mut config = Self::default();

        if let Some(input) = lookup("PGN_INPUT_PATH") {
            config.input_path = input;
        }
        if let Some(output) = lookup("SQLITE_OUTPUT_PATH") {
            config.output_path = PathBuf::from(output);
        }
        if let Some(width) = lookup("ENCODING_WIDTH") {
            config.encoding_width = parse_number("ENCODING_WIDTH", &width)?;
        }
        if let Some(legacy) = lookup("ENCODING_LEGACY") {
            config.legacy_layout = parse_flag("ENCODING_LEGACY", &legacy)?;
        }
        if let Some(format) = lookup("BINARY_FORMAT") {
            config.binary_format = parse_binary_format(&format)?;
        }
        if let Some(formula) = lookup("RATING_FORMULA") {
            config.rating_formula = parse_rating_formula(&formula)?;
        }
        if let Some(tags) = lookup("EXCLUDED_TAGS") {
            config.excluded_tags = parse_tags(&tags);
        }
        if let Some(interval) = lookup("PROGRESS_INTERVAL") {
            config.progress_interval = parse_number("PROGRESS_INTERVAL", &interval)?;
        }

        Ok(config)
    }

    /// Override fields from command-line flags.
    pub fn with_args(mut self, args: &[String]) -> Result<Self, ImportError> {
        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            if flag == "--legacy-layout" {
                self.legacy_layout = true;
                i += 1;
                continue;
            }

            let value = args
                .get(i + 1)
                .ok_or_else(|| ImportError::Config(format!("missing value for {flag}")))?;

            match flag {
                "--input" => self.input_path = value.clone(),
                "--output" => self.output_path = PathBuf::from(value),
                "--encoding-width" => self.encoding_width = parse_number(flag, value)?,
                "--binary-format" => self.binary_format = parse_binary_format(value)?,
                "--rating-formula" => self.rating_formula = parse_rating_formula(value)?,
                "--exclude-tags" => self.excluded_tags = parse_tags(value),
                "--progress-interval" => self.progress_interval = parse_number(flag, value)?,
                _ => return Err(ImportError::Config(format!("unknown option {flag}"))),
            }
            i += 2;
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject settings the importer cannot run with.
    pub fn validate(&self) -> Result<(), ImportError> {
        self.layout()?;
        if self.progress_interval == 0 {
            return Err(ImportError::Config("progress interval must be positive".into()));
        }
        Ok(())
    }

    pub fn layout(&self) -> Result<EncodingLayout, ImportError> {
        if self.legacy_layout {
            let legacy = EncodingLayout::legacy_interleaved();
            if self.encoding_width != legacy.width() {
                return Err(ImportError::Config(format!(
                    "legacy layout is {} bits wide, got encoding width {}",
                    legacy.width(),
                    self.encoding_width
                )));
            }
            return Ok(legacy);
        }

        Ok(EncodingLayout::for_width(self.encoding_width)?)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ImportError> {
    value
        .trim()
        .parse()
        .map_err(|_| ImportError::Config(format!("{name} must be a non-negative integer, got '{value}'")))
}

fn parse_flag(name: &str, value: &str) -> Result<bool, ImportError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ImportError::Config(format!("{name} must be a boolean, got '{value}'"))),
    }
}

fn parse_binary_format(value: &str) -> Result<BinaryFormat, ImportError> {
    match value.trim() {
        "packed" => Ok(BinaryFormat::Packed),
        "bit-string" => Ok(BinaryFormat::BitString),
        other => Err(ImportError::Config(format!("unknown binary format '{other}'"))),
    }
}

fn parse_rating_formula(value: &str) -> Result<RatingFormula, ImportError> {
    match value.trim() {
        "average" => Ok(RatingFormula::Average),
        "legacy-white-only" => Ok(RatingFormula::LegacyWhiteOnly),
        other => Err(ImportError::Config(format!("unknown rating formula '{other}'"))),
    }
}

fn parse_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
