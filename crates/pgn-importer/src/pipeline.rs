//! Import driver: PGN games → resume gate → replay → encode → SQLite.

use std::io::Read;
use std::path::PathBuf;

use chess_core::encoding::{BinaryFormat, PositionEncoder};
use chess_core::game_data::{GameRecord, RatingFormula};
use chess_core::replay::{replay, ReplayError};
use tracing::{info, warn};

use crate::config::ImportConfig;
use crate::db::{FactRow, FactWrite, PositionStore};
use crate::error::ImportError;
use crate::resume::ResumeTracker;
use crate::source::{open_pgn, PgnGameSource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub games_seen: u64,
    pub games_skipped: u64,
    pub games_imported: u64,
    pub games_failed: u64,
    pub positions_written: u64,
}

/// What happened to one game.
#[derive(Debug)]
pub enum GameOutcome {
    /// Already committed by an earlier run
    Skipped,
    Imported { positions: usize },
    /// A move could not be replayed; only the summary row was written
    ReplayFailed(ReplayError),
    /// The store rejected a position row; only the summary row was written
    WriteFailed(rusqlite::Error),
}

pub struct Importer {
    store: PositionStore,
    encoder: PositionEncoder,
    binary_format: BinaryFormat,
    rating_formula: RatingFormula,
    excluded_tags: Vec<String>,
    progress_interval: u64,
    tracker: ResumeTracker,
    stats: ImportStats,
}

impl Importer {
    /// Prepare the schema and read the resume cursor from `store`.
    pub fn new(store: PositionStore, config: &ImportConfig) -> Result<Self, ImportError> {
        config.validate()?;
        store.ensure_schema()?;
        let cursor = store.count_games()?;
        if cursor > 0 {
            info!(cursor, "Resuming: games already in the store will be skipped");
        }

        Ok(Self {
            store,
            encoder: PositionEncoder::new(config.layout()?),
            binary_format: config.binary_format,
            rating_formula: config.rating_formula,
            excluded_tags: config.excluded_tags.clone(),
            progress_interval: config.progress_interval,
            tracker: ResumeTracker::new(cursor),
            stats: ImportStats::default(),
        })
    }

    /// Import every file in order. The game index runs across all of them.
    pub fn import_files(&mut self, files: &[PathBuf]) -> Result<(), ImportError> {
        for path in files {
            info!(path = %path.display(), "Reading PGN file");
            let source = open_pgn(path, &self.excluded_tags)?;
            self.import_source(source)?;
        }
        Ok(())
    }

    pub fn import_reader<R: Read>(&mut self, input: R) -> Result<(), ImportError> {
        let source = PgnGameSource::new(input, &self.excluded_tags);
        self.import_source(source)
    }

    fn import_source<R: Read>(&mut self, mut source: PgnGameSource<R>) -> Result<(), ImportError> {
        while let Some(record) = source.next_game()? {
            self.process(record)?;
        }
        Ok(())
    }

    /// Gate, replay and persist one game.
    ///
    /// Per-game problems come back as a [`GameOutcome`]; `Err` means the store
    /// can no longer be trusted and the import must stop.
    pub fn process(&mut self, record: GameRecord) -> Result<GameOutcome, ImportError> {
        let index = self.tracker.seen();

        let outcome = match self.tracker.admit(record) {
            None => {
                self.stats.games_skipped += 1;
                GameOutcome::Skipped
            }
            Some(record) => self.import_game(index, &record)?,
        };

        self.stats.games_seen = self.tracker.seen();
        if self.stats.games_seen % self.progress_interval == 0 {
            info!(
                games = self.stats.games_seen,
                imported = self.stats.games_imported,
                skipped = self.stats.games_skipped,
                failed = self.stats.games_failed,
                positions = self.stats.positions_written,
                "Finished parsing game number {}",
                self.stats.games_seen
            );
        }

        Ok(outcome)
    }

    fn import_game(&mut self, index: u64, record: &GameRecord) -> Result<GameOutcome, ImportError> {
        match self.build_facts(record) {
            Ok(facts) => match self.store.write_game(record, &facts)? {
                FactWrite::Committed(positions) => {
                    self.stats.games_imported += 1;
                    self.stats.positions_written += positions as u64;
                    Ok(GameOutcome::Imported { positions })
                }
                FactWrite::Discarded(e) => {
                    warn!(game = index, error = %e, "Position rows rejected, kept game summary only");
                    self.stats.games_failed += 1;
                    Ok(GameOutcome::WriteFailed(e))
                }
            },
            Err(e) => {
                warn!(
                    game = index,
                    ply = e.ply(),
                    token = %e.token(),
                    error = %e,
                    moves = %record.moves_json()?,
                    "Failed parsing game, resuming with the next one"
                );
                self.store.write_game(record, &[])?;
                self.stats.games_failed += 1;
                Ok(GameOutcome::ReplayFailed(e))
            }
        }
    }

    /// Replay the whole game into its pending fact rows. Nothing is written
    /// unless every move replays.
    fn build_facts(&self, record: &GameRecord) -> Result<Vec<FactRow>, ReplayError> {
        let site = record.site().map(String::from);
        let elo = record.rating(self.rating_formula);
        let white_won = record.white_won();

        replay(record)
            .map(|step| -> Result<FactRow, ReplayError> {
                let step = step?;
                Ok(FactRow {
                    site: site.clone(),
                    fen: step.fen(),
                    binary: self.encoder.encode(&step.position).to_blob(self.binary_format),
                    elo,
                    white_won,
                })
            })
            .collect()
    }

    pub fn stats(&self) -> &ImportStats {
        &self.stats
    }

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    pub fn finish(self) -> Result<ImportStats, ImportError> {
        self.store.close()?;
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAMES: &str = r#"[Event "Rated Blitz game"]
[Site "https://lichess.org/g1"]
[White "alice"]
[Black "bob"]
[Result "1-0"]
[WhiteElo "1500"]
[BlackElo "1400"]

1. e4 e5 1-0

[Site "https://lichess.org/g2"]
[Result "0-1"]
[WhiteElo "1600"]
[BlackElo "1700"]

1. e4 e5 2. Ke3 Nf6 0-1

[Site "https://lichess.org/g3"]
[Result "1/2-1/2"]
[WhiteElo "1600"]
[BlackElo "1700"]

1. d4 d5 2. c4 1/2-1/2
"#;

    fn importer() -> Importer {
        let store = PositionStore::open_in_memory().unwrap();
        Importer::new(store, &ImportConfig::default()).unwrap()
    }

    #[test]
    fn test_import_reader_counts() {
        let mut importer = importer();
        importer.import_reader(GAMES.as_bytes()).unwrap();

        let stats = *importer.stats();
        assert_eq!(stats.games_seen, 3);
        assert_eq!(stats.games_imported, 2);
        assert_eq!(stats.games_failed, 1);
        assert_eq!(stats.positions_written, 2 + 3);

        assert_eq!(importer.store().count_games().unwrap(), 3);
        assert_eq!(importer.store().count_positions().unwrap(), 5);
    }

    #[test]
    fn test_failed_game_has_no_positions() {
        let mut importer = importer();
        importer.import_reader(GAMES.as_bytes()).unwrap();

        let failed_site_rows: i64 = importer
            .store()
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM position_fact WHERE Site = 'https://lichess.org/g2'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(failed_site_rows, 0);
    }

    #[test]
    fn test_labels_use_average_rating() {
        let mut importer = importer();
        importer.import_reader(GAMES.as_bytes()).unwrap();

        let rows: Vec<(i64, bool)> = importer
            .store()
            .connection()
            .prepare("SELECT Elo, WhiteWon FROM position_fact WHERE Site = 'https://lichess.org/g1'")
            .unwrap()
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows, vec![(1450, true), (1450, true)]);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let zero_interval = ImportConfig {
            progress_interval: 0,
            ..Default::default()
        };
        let store = PositionStore::open_in_memory().unwrap();
        assert!(matches!(Importer::new(store, &zero_interval), Err(ImportError::Config(_))));

        let narrow = ImportConfig {
            encoding_width: 8,
            ..Default::default()
        };
        let store = PositionStore::open_in_memory().unwrap();
        assert!(matches!(Importer::new(store, &narrow), Err(ImportError::Layout(_))));
    }

    #[test]
    fn test_process_skips_below_cursor() {
        let mut importer = importer();
        importer.import_reader(GAMES.as_bytes()).unwrap();
        let store = importer.store;

        let mut again = Importer::new(store, &ImportConfig::default()).unwrap();
        let mut source = PgnGameSource::new(GAMES.as_bytes(), &[]);
        while let Some(record) = source.next_game().unwrap() {
            assert!(matches!(again.process(record).unwrap(), GameOutcome::Skipped));
        }
        assert_eq!(again.stats().games_skipped, 3);
        assert_eq!(again.store().count_games().unwrap(), 3);
        assert_eq!(again.store().count_positions().unwrap(), 5);
    }
}
