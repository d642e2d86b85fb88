#![allow(dead_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use pgn_importer::config::ImportConfig;
use pgn_importer::source::input_files;
use pgn_importer::{ImportStats, Importer, PositionStore};
use rusqlite::Connection;
use tempfile::TempDir;

/// Scratch directory holding PGN inputs and the output database.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    pub fn write_pgn(&self, name: &str, pgn: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, pgn).expect("failed to write PGN");
        path
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("positions.sqlite")
    }

    /// Run a full import of `input` (file or glob) with extra command-line flags.
    pub fn import(&self, input: &str, flags: &[&str]) -> ImportStats {
        let flags: Vec<String> = flags.iter().map(|f| f.to_string()).collect();
        let mut config = ImportConfig::default().with_args(&flags).expect("invalid flags");
        config.input_path = input.to_string();
        config.output_path = self.db_path();

        let files = input_files(&config.input_path).expect("no input files");
        let store = PositionStore::open(&config.output_path).expect("failed to open store");
        let mut importer = Importer::new(store, &config).expect("failed to prepare store");
        importer.import_files(&files).expect("import failed");
        importer.finish().expect("failed to close store")
    }

    pub fn import_file(&self, path: &Path, flags: &[&str]) -> ImportStats {
        self.import(&path.to_string_lossy(), flags)
    }

    pub fn conn(&self) -> Connection {
        Connection::open(self.db_path()).expect("failed to open output db")
    }
}

pub fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).expect("count query failed")
}

/// Build one PGN game from header pairs and a movetext string.
pub fn pgn_game(headers: &[(&str, &str)], movetext: &str) -> String {
    let mut game = String::new();
    for (key, value) in headers {
        game.push_str(&format!("[{key} \"{value}\"]\n"));
    }
    game.push('\n');
    game.push_str(movetext);
    game.push_str("\n\n");
    game
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return what it logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}
