//! PGN token source: adapts `pgn-reader` callbacks into [`GameEvent`]s.
//!
//! The reader is forward-only. Every game is tokenized in full, including games
//! the resume cursor will drop, since there is no way to seek past a game.

use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use chess_core::game_data::GameRecord;
use pgn_reader::{RawTag, Reader, SanPlus, Skip, Visitor};

use crate::error::ImportError;
use crate::events::{GameAccumulator, GameEvent};

/// Visitor that forwards mainline tokens to a [`GameAccumulator`].
struct EventVisitor {
    accumulator: GameAccumulator,
}

impl Visitor for EventVisitor {
    type Tags = ();
    type Movetext = ();
    type Output = Option<GameRecord>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, ()> {
        self.accumulator.handle(GameEvent::GameStart);
        ControlFlow::Continue(())
    }

    fn tag(&mut self, _tags: &mut (), name: &[u8], value: RawTag<'_>) -> ControlFlow<Self::Output> {
        self.accumulator.handle(GameEvent::Header {
            key: String::from_utf8_lossy(name).into_owned(),
            value: value.decode_utf8_lossy().into_owned(),
        });
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _tags: ()) -> ControlFlow<Self::Output, ()> {
        ControlFlow::Continue(())
    }

    fn san(&mut self, _movetext: &mut (), san_plus: SanPlus) -> ControlFlow<Self::Output> {
        self.accumulator.handle(GameEvent::Move(san_plus.to_string()));
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _movetext: &mut ()) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true)) // mainline only
    }

    fn end_game(&mut self, _movetext: ()) -> Self::Output {
        self.accumulator.handle(GameEvent::GameEnd)
    }
}

/// Stream of finished [`GameRecord`]s read from one PGN byte stream.
pub struct PgnGameSource<R: Read> {
    reader: Reader<R>,
    visitor: EventVisitor,
}

impl<R: Read> PgnGameSource<R> {
    pub fn new(input: R, excluded_tags: &[String]) -> Self {
        Self {
            reader: Reader::new(input),
            visitor: EventVisitor {
                accumulator: GameAccumulator::new(excluded_tags.iter().cloned()),
            },
        }
    }

    /// Next complete game, or `None` at end of input.
    pub fn next_game(&mut self) -> Result<Option<GameRecord>, ImportError> {
        loop {
            match self.reader.read_game(&mut self.visitor)? {
                None => return Ok(None),
                Some(Some(record)) => return Ok(Some(record)),
                Some(None) => continue,
            }
        }
    }
}

impl<R: Read> Iterator for PgnGameSource<R> {
    type Item = Result<GameRecord, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_game().transpose()
    }
}

pub fn open_pgn(path: &Path, excluded_tags: &[String]) -> Result<PgnGameSource<BufReader<File>>, ImportError> {
    let file = File::open(path)?;
    Ok(PgnGameSource::new(BufReader::new(file), excluded_tags))
}

/// Resolve the configured input into files, in the order they are imported.
///
/// An existing path is used as-is; anything else is treated as a glob pattern
/// whose matches are sorted so the game order is stable across runs.
pub fn input_files(input: &str) -> Result<Vec<PathBuf>, ImportError> {
    let path = Path::new(input);
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files: Vec<PathBuf> = glob::glob(input)?
        .filter_map(|p| p.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(ImportError::Config(format!("no PGN input found at '{input}'")));
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_GAMES: &str = r#"[Event "Rated Blitz game"]
[Site "https://lichess.org/aaaa"]
[White "alice"]
[WhiteTitle "FM"]
[Result "1-0"]

1. e4 { [%clk 0:05:00] } e5 2. Nf3 (2. Nc3 Nc6) Nc6 3. Bb5 1-0

[Event "Rated Bullet game"]
[Site "https://lichess.org/bbbb"]
[Result "0-1"]

1. d4 d5 0-1
"#;

    fn excluded() -> Vec<String> {
        vec!["WhiteTitle".to_string(), "BlackTitle".to_string()]
    }

    #[test]
    fn test_reads_games_in_order() {
        let games: Vec<GameRecord> = PgnGameSource::new(TWO_GAMES.as_bytes(), &excluded())
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].site(), Some("https://lichess.org/aaaa"));
        assert_eq!(games[0].header("WhiteTitle"), None);
        // Variation and comment are not part of the mainline.
        assert_eq!(games[0].moves, vec!["e4", "e5", "Nf3", "Nc6", "Bb5"]);
        assert_eq!(games[1].moves, vec!["d4", "d5"]);
        assert_eq!(games[1].header("Result"), Some("0-1"));
    }

    #[test]
    fn test_empty_input_has_no_games() {
        let mut source = PgnGameSource::new("".as_bytes(), &excluded());
        assert!(source.next_game().unwrap().is_none());
    }

    #[test]
    fn test_check_suffix_is_kept() {
        let pgn = "[Result \"1-0\"]\n\n1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0\n";
        let game = PgnGameSource::new(pgn.as_bytes(), &[]).next_game().unwrap().unwrap();
        assert_eq!(game.moves.last().map(String::as_str), Some("Qxf7#"));
    }

    #[test]
    fn test_input_files_glob_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pgn", "a.pgn", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let pattern = format!("{}/*.pgn", dir.path().display());
        let files = input_files(&pattern).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.pgn", "b.pgn"]);

        let single = dir.path().join("a.pgn");
        assert_eq!(input_files(&single.to_string_lossy()).unwrap(), vec![single]);

        let missing = format!("{}/*.zst", dir.path().display());
        assert!(matches!(input_files(&missing), Err(ImportError::Config(_))));
    }
}
