//! SQLite store for game summaries and encoded position facts

use std::path::Path;

use chess_core::game_data::GameRecord;
use rusqlite::{params, params_from_iter, Connection, Transaction};

use crate::error::ImportError;

pub const GAME_SUMMARY_TABLE: &str = "game_summary";
pub const POSITION_FACT_TABLE: &str = "position_fact";

/// Relaxed durability: every game is its own transaction and the resume
/// cursor re-derives the restart point after a crash.
const PRAGMAS_SQL: &str = r#"
PRAGMA synchronous=OFF;
PRAGMA journal_mode=MEMORY;
PRAGMA temp_store=MEMORY;
"#;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS game_summary (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    Event           TEXT,
    Site            TEXT,
    White           TEXT,
    Black           TEXT,
    Result          TEXT,
    UTCDate         TEXT,
    UTCTime         TEXT,
    WhiteElo        TEXT,
    BlackElo        TEXT,
    WhiteRatingDiff TEXT,
    BlackRatingDiff TEXT,
    ECO             TEXT,
    Opening         TEXT,
    TimeControl     TEXT,
    Termination     TEXT,
    Moves           TEXT
);

CREATE TABLE IF NOT EXISTS position_fact (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    Site            TEXT,
    PositionFen     TEXT,
    PositionBinary  BLOB,
    Elo             INTEGER,
    WhiteWon        BOOLEAN
);
"#;

const INSERT_SUMMARY_SQL: &str = r#"INSERT INTO game_summary (
    Event, Site, White, Black, Result, UTCDate, UTCTime, WhiteElo, BlackElo,
    WhiteRatingDiff, BlackRatingDiff, ECO, Opening, TimeControl, Termination, Moves
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#;

const INSERT_FACT_SQL: &str = r#"INSERT INTO position_fact (
    Site, PositionFen, PositionBinary, Elo, WhiteWon
) VALUES (?, ?, ?, ?, ?)"#;

/// One `position_fact` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRow {
    pub site: Option<String>,
    pub fen: String,
    pub binary: Vec<u8>,
    pub elo: Option<i64>,
    pub white_won: bool,
}

/// What happened to a game's fact rows in [`PositionStore::write_game`].
#[derive(Debug)]
pub enum FactWrite {
    /// Summary and all fact rows committed together
    Committed(usize),
    /// A fact insert failed; only the summary row was committed
    Discarded(rusqlite::Error),
}

pub struct PositionStore {
    conn: Connection,
}

impl PositionStore {
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(PRAGMAS_SQL)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, ImportError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(PRAGMAS_SQL)?;
        Ok(Self { conn })
    }

    /// Create both tables if absent. Safe on every startup.
    pub fn ensure_schema(&self) -> Result<(), ImportError> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Games committed so far; this is the resume cursor.
    pub fn count_games(&self) -> Result<u64, ImportError> {
        self.count_rows(GAME_SUMMARY_TABLE)
    }

    pub fn count_positions(&self) -> Result<u64, ImportError> {
        self.count_rows(POSITION_FACT_TABLE)
    }

    fn count_rows(&self, table: &str) -> Result<u64, ImportError> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Write one game's summary row and its fact rows in a single transaction.
    ///
    /// Errors writing the summary or committing are returned as `Err`. A failed
    /// fact insert rolls the game back and re-commits the summary on its own, so
    /// the summary count keeps matching the number of games consumed.
    pub fn write_game(&mut self, record: &GameRecord, facts: &[FactRow]) -> Result<FactWrite, ImportError> {
        let moves_json = record.moves_json()?;

        let tx = self.conn.transaction()?;
        insert_summary(&tx, record, &moves_json)?;

        match insert_facts(&tx, facts) {
            Ok(()) => {
                tx.commit()?;
                Ok(FactWrite::Committed(facts.len()))
            }
            Err(e) => {
                tx.rollback()?;

                let tx = self.conn.transaction()?;
                insert_summary(&tx, record, &moves_json)?;
                tx.commit()?;
                Ok(FactWrite::Discarded(e))
            }
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn close(self) -> Result<(), ImportError> {
        self.conn.close().map_err(|(_, e)| ImportError::Database(e))
    }
}

fn insert_summary(tx: &Transaction<'_>, record: &GameRecord, moves_json: &str) -> Result<(), rusqlite::Error> {
    let mut values = record.summary_values();
    values.push(Some(moves_json));

    tx.prepare_cached(INSERT_SUMMARY_SQL)?
        .execute(params_from_iter(values))?;
    Ok(())
}

fn insert_facts(tx: &Transaction<'_>, facts: &[FactRow]) -> Result<(), rusqlite::Error> {
    let mut stmt = tx.prepare_cached(INSERT_FACT_SQL)?;
    for fact in facts {
        stmt.execute(params![fact.site, fact.fen, fact.binary, fact.elo, fact.white_won])?;
    }
    Ok(())
}
