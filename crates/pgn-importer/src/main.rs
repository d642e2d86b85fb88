//! PGN → SQLite position importer
//!
//! Replays every game of a PGN archive and stores one summary row per game
//! plus one binary-encoded position row per ply. Safe to re-run: games already
//! in the output database are skipped.
//!
//! Usage: cargo run --release --bin pgn-importer -- --input games.pgn --output games.sqlite

use std::time::Instant;

use pgn_importer::config::{ImportConfig, USAGE};
use pgn_importer::source::input_files;
use pgn_importer::{Importer, PositionStore};
use tracing::{error, info};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{USAGE}");
        return;
    }

    let config = match ImportConfig::load(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config) {
        error!(error = %e, "Import aborted");
        std::process::exit(1);
    }
}

fn run(config: &ImportConfig) -> anyhow::Result<()> {
    info!(
        input = %config.input_path,
        output = %config.output_path.display(),
        encoding_width = config.encoding_width,
        legacy_layout = config.legacy_layout,
        binary_format = ?config.binary_format,
        rating_formula = ?config.rating_formula,
        "Starting import"
    );

    let files = input_files(&config.input_path)?;
    info!(files = files.len(), "Found PGN input");

    let store = PositionStore::open(&config.output_path)?;
    let mut importer = Importer::new(store, config)?;
    info!("Schema ready");

    let start = Instant::now();
    importer.import_files(&files)?;
    let stats = importer.finish()?;

    info!(
        games = stats.games_seen,
        imported = stats.games_imported,
        skipped = stats.games_skipped,
        failed = stats.games_failed,
        positions = stats.positions_written,
        elapsed_secs = start.elapsed().as_secs_f64(),
        "Import complete"
    );

    Ok(())
}
