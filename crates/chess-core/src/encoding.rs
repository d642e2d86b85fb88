//! Fixed-width binary feature vectors for board positions.
//!
//! Every layout starts with 12 occupancy masks of 64 bits, colors white then
//! black, pieces in the order pawn, rook, knight, bishop, queen, king. Bit
//! `64 * (color * 6 + piece) + square` is set when that piece stands on
//! `square` (a1 = 0, h8 = 63). Castling rights and the side to move follow,
//! placed according to the layout.

use shakmaty::{CastlingSide, Chess, Color, Position, Role};
use thiserror::Error;

pub const PIECE_BITS: usize = 768;
const CASTLING_BITS: usize = 4;
const TURN_BITS: usize = 1;

pub const COLORS: [Color; 2] = [Color::White, Color::Black];
pub const ROLES: [Role; 6] = [
    Role::Pawn,
    Role::Rook,
    Role::Knight,
    Role::Bishop,
    Role::Queen,
    Role::King,
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("encoding width {width} is below the minimum of {minimum} bits")]
    TooNarrow { width: usize, minimum: usize },
}

/// Where the castling bits sit relative to the piece masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastlingPlacement {
    /// All 768 piece bits, padding, then WK WQ BK BQ, then side to move.
    AfterPieces,
    /// White masks, WK WQ, black masks, BK BQ, then side to move.
    PerColor,
}

/// Bit layout shared by every row of one output database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingLayout {
    width: usize,
    padding_before_castling: usize,
    castling: CastlingPlacement,
}

impl EncodingLayout {
    pub fn new(
        width: usize,
        padding_before_castling: usize,
        castling: CastlingPlacement,
    ) -> Result<Self, LayoutError> {
        let padding = match castling {
            CastlingPlacement::AfterPieces => padding_before_castling,
            CastlingPlacement::PerColor => 0,
        };
        let minimum = PIECE_BITS + padding + CASTLING_BITS + TURN_BITS;
        if width < minimum {
            return Err(LayoutError::TooNarrow { width, minimum });
        }

        Ok(Self {
            width,
            padding_before_castling: padding,
            castling,
        })
    }

    /// 773 bits, no padding.
    pub fn compact() -> Self {
        Self {
            width: 773,
            padding_before_castling: 0,
            castling: CastlingPlacement::AfterPieces,
        }
    }

    /// 800 bits (100 bytes); castling at 771..=774, side to move at 775.
    pub fn byte_aligned() -> Self {
        Self {
            width: 800,
            padding_before_castling: 3,
            castling: CastlingPlacement::AfterPieces,
        }
    }

    /// 773 bits with each color's castling rights right after its pieces.
    pub fn legacy_interleaved() -> Self {
        Self {
            width: 773,
            padding_before_castling: 0,
            castling: CastlingPlacement::PerColor,
        }
    }

    pub fn for_width(width: usize) -> Result<Self, LayoutError> {
        match width {
            773 => Ok(Self::compact()),
            800 => Ok(Self::byte_aligned()),
            _ => Self::new(width, 0, CastlingPlacement::AfterPieces),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn byte_len(&self) -> usize {
        self.width.div_ceil(8)
    }

    /// Bit holding the occupancy of `role` of `color` on `square`.
    pub fn piece_offset(&self, color: Color, role: Role, square: usize) -> usize {
        let color_idx = color_index(color);
        let base = 64 * (color_idx * ROLES.len() + role_index(role)) + square;
        match self.castling {
            CastlingPlacement::AfterPieces => base,
            // Black masks are shifted by white's two castling bits.
            CastlingPlacement::PerColor => base + 2 * color_idx,
        }
    }

    pub fn castling_offset(&self, color: Color, side: CastlingSide) -> usize {
        let side_idx = match side {
            CastlingSide::KingSide => 0,
            CastlingSide::QueenSide => 1,
        };
        let color_idx = color_index(color);
        match self.castling {
            CastlingPlacement::AfterPieces => {
                PIECE_BITS + self.padding_before_castling + 2 * color_idx + side_idx
            }
            CastlingPlacement::PerColor => (color_idx + 1) * (64 * ROLES.len() + 2) - 2 + side_idx,
        }
    }

    pub fn turn_offset(&self) -> usize {
        match self.castling {
            CastlingPlacement::AfterPieces => PIECE_BITS + self.padding_before_castling + CASTLING_BITS,
            CastlingPlacement::PerColor => PIECE_BITS + CASTLING_BITS,
        }
    }
}

impl Default for EncodingLayout {
    fn default() -> Self {
        Self::byte_aligned()
    }
}

fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

fn role_index(role: Role) -> usize {
    match role {
        Role::Pawn => 0,
        Role::Rook => 1,
        Role::Knight => 2,
        Role::Bishop => 3,
        Role::Queen => 4,
        Role::King => 5,
    }
}

/// How an [`EncodedPosition`] is written to the `PositionBinary` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinaryFormat {
    /// `ceil(width / 8)` bytes, bit `i` in byte `i / 8` at mask `1 << (i % 8)`.
    #[default]
    Packed,
    /// One ASCII `'0'`/`'1'` per bit, highest bit first.
    BitString,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedPosition {
    width: usize,
    bytes: Vec<u8>,
}

impl EncodedPosition {
    fn zeroed(width: usize) -> Self {
        Self {
            width,
            bytes: vec![0; width.div_ceil(8)],
        }
    }

    fn set(&mut self, index: usize) {
        self.bytes[index / 8] |= 1 << (index % 8);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn bit(&self, index: usize) -> bool {
        index < self.width && self.bytes[index / 8] & (1 << (index % 8)) != 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_bit_string(&self) -> String {
        (0..self.width)
            .rev()
            .map(|i| if self.bit(i) { '1' } else { '0' })
            .collect()
    }

    pub fn to_blob(&self, format: BinaryFormat) -> Vec<u8> {
        match format {
            BinaryFormat::Packed => self.bytes.clone(),
            BinaryFormat::BitString => self.to_bit_string().into_bytes(),
        }
    }
}

/// Maps positions to [`EncodedPosition`]s under one [`EncodingLayout`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionEncoder {
    layout: EncodingLayout,
}

impl PositionEncoder {
    pub fn new(layout: EncodingLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &EncodingLayout {
        &self.layout
    }

    pub fn encode(&self, pos: &Chess) -> EncodedPosition {
        let mut encoded = EncodedPosition::zeroed(self.layout.width);
        let board = pos.board();

        for color in COLORS {
            for role in ROLES {
                let occupied = board.by_role(role) & board.by_color(color);
                for square in occupied {
                    encoded.set(self.layout.piece_offset(color, role, square as usize));
                }
            }
        }

        let castles = pos.castles();
        for color in COLORS {
            for side in [CastlingSide::KingSide, CastlingSide::QueenSide] {
                if castles.has(color, side) {
                    encoded.set(self.layout.castling_offset(color, side));
                }
            }
        }

        if pos.turn() == Color::White {
            encoded.set(self.layout.turn_offset());
        }

        encoded
    }
}
