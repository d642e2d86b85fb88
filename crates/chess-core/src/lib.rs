//! Chess-domain building blocks for turning recorded games into labeled
//! positions: game records, move replay and binary position encoding.

pub mod encoding;
pub mod game_data;
pub mod replay;

pub use encoding::{BinaryFormat, EncodedPosition, EncodingLayout, PositionEncoder};
pub use game_data::{GameRecord, RatingFormula};
pub use replay::{replay, ReplayError, ReplayedPosition};
