use std::collections::HashMap;

/// Header fields that map 1:1 onto `game_summary` columns, in column order.
pub const SUMMARY_FIELDS: [&str; 15] = [
    "Event",
    "Site",
    "White",
    "Black",
    "Result",
    "UTCDate",
    "UTCTime",
    "WhiteElo",
    "BlackElo",
    "WhiteRatingDiff",
    "BlackRatingDiff",
    "ECO",
    "Opening",
    "TimeControl",
    "Termination",
];

/// Headers dropped while a game is being collected unless configured otherwise.
pub const DEFAULT_EXCLUDED_TAGS: [&str; 2] = ["WhiteTitle", "BlackTitle"];

/// How the per-position `Elo` label is derived from the game headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatingFormula {
    /// Mean of `WhiteElo` and `BlackElo`, rounded half away from zero.
    #[default]
    Average,
    /// `(WhiteElo + WhiteElo) / 2` with C `atoi` parsing. Reproduces datasets
    /// built before black's rating was taken into account.
    LegacyWhiteOnly,
}

/// One game as delivered by the PGN stream: its headers and mainline SAN tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameRecord {
    pub headers: HashMap<String, String>,
    pub moves: Vec<String>, // SAN notation, play order
}

impl GameRecord {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Values for [`SUMMARY_FIELDS`], `None` where the header is absent.
    pub fn summary_values(&self) -> Vec<Option<&str>> {
        SUMMARY_FIELDS.iter().map(|field| self.header(field)).collect()
    }

    /// Move list as a JSON array of strings, e.g. `["e4","e5","Nf3"]`.
    pub fn moves_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.moves)
    }

    pub fn white_won(&self) -> bool {
        self.header("Result") == Some("1-0")
    }

    pub fn site(&self) -> Option<&str> {
        self.header("Site")
    }

    /// Per-position `Elo` label. `Average` is `None` when a rating is missing,
    /// non-numeric or too large to sum.
    pub fn rating(&self, formula: RatingFormula) -> Option<i64> {
        match formula {
            RatingFormula::Average => {
                let white = self.header("WhiteElo")?.trim().parse::<i64>().ok()?;
                let black = self.header("BlackElo")?.trim().parse::<i64>().ok()?;
                let sum = white.checked_add(black)?;
                Some(sum / 2 + sum % 2)
            }
            RatingFormula::LegacyWhiteOnly => {
                let white = atoi(self.header("WhiteElo").unwrap_or(""));
                Some(i64::from(white.wrapping_add(white) / 2))
            }
        }
    }
}

/// C `atoi` on a 32-bit `int`: optional leading whitespace and sign, then
/// leading digits; 0 if none. Out-of-range values wrap.
fn atoi(text: &str) -> i32 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i32, |acc, d| acc.wrapping_mul(10).wrapping_add(i32::from(d - b'0')));

    if negative { value.wrapping_neg() } else { value }
}
