// This file is part of the chessbits library.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! Parse and write Forsyth-Edwards-Notation.
//!
//! FEN has no notion of moved pieces, so converting to a [`Position`]
//! infers the moved flag: pawns have moved when they are off their start
//! rank, and kings and rooks are unmoved exactly when a castling right
//! refers to them.
//!
//! # Examples
//!
//! ```
//! use chessbits::{fen::Fen, Position};
//!
//! let fen: Fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".parse()?;
//! let pos = fen.into_position()?;
//! assert_eq!(pos, Position::standard());
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

use std::{error::Error, fmt, num::NonZeroU32, str::FromStr};

use bitflags::bitflags;

use crate::{
    color::Color,
    piece::{Flags, Piece},
    position::{Position, PositionError, PositionErrorKinds},
    role::Role,
    square::{File, Rank, Square},
};

bitflags! {
    /// Castling rights, as written in the third field of a FEN.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Castles: u8 {
        const WHITE_KING_SIDE = 1 << 0;
        const WHITE_QUEEN_SIDE = 1 << 1;
        const BLACK_KING_SIDE = 1 << 2;
        const BLACK_QUEEN_SIDE = 1 << 3;
    }
}

impl Castles {
    pub const fn king_side(color: Color) -> Castles {
        match color {
            Color::White => Castles::WHITE_KING_SIDE,
            Color::Black => Castles::BLACK_KING_SIDE,
        }
    }

    pub const fn queen_side(color: Color) -> Castles {
        match color {
            Color::White => Castles::WHITE_QUEEN_SIDE,
            Color::Black => Castles::BLACK_QUEEN_SIDE,
        }
    }

    pub const fn color(color: Color) -> Castles {
        Castles::king_side(color).union(Castles::queen_side(color))
    }
}

/// Errors that can occur when parsing FENs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseFenError {
    InvalidFen,
    InvalidBoard,
    InvalidTurn,
    InvalidCastling,
    InvalidEpSquare,
    InvalidHalfmoveClock,
    InvalidFullmoves,
}

impl fmt::Display for ParseFenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            ParseFenError::InvalidFen => "invalid fen",
            ParseFenError::InvalidBoard => "invalid board part in fen",
            ParseFenError::InvalidTurn => "invalid turn part in fen",
            ParseFenError::InvalidCastling => "invalid castling part in fen",
            ParseFenError::InvalidEpSquare => "invalid ep square in fen",
            ParseFenError::InvalidHalfmoveClock => "invalid halfmove clock in fen",
            ParseFenError::InvalidFullmoves => "invalid fullmove part in fen",
        })
    }
}

impl Error for ParseFenError {}

/// A parsed FEN.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Fen {
    /// Pieces in play, ordered by square from `a1` to `h8`.
    pub board: Vec<(Square, Color, Role)>,
    pub turn: Color,
    pub castles: Castles,
    pub ep_square: Option<Square>,
    pub halfmoves: u32,
    pub fullmoves: NonZeroU32,
}

impl Default for Fen {
    fn default() -> Fen {
        Fen::from_position(&Position::standard())
    }
}

impl Fen {
    /// An empty board, white to move.
    pub fn empty() -> Fen {
        Fen {
            board: Vec::new(),
            turn: Color::White,
            castles: Castles::empty(),
            ep_square: None,
            halfmoves: 0,
            fullmoves: NonZeroU32::MIN,
        }
    }

    /// Parses a FEN. Missing trailing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ParseFenError`] naming the first malformed field.
    pub fn from_ascii(fen: &[u8]) -> Result<Fen, ParseFenError> {
        let mut parts = fen.split(|ch| *ch == b' ');
        let mut result = Fen::empty();

        let board_part = parts.next().ok_or(ParseFenError::InvalidFen)?;
        result.board = parse_board(board_part).ok_or(ParseFenError::InvalidBoard)?;

        result.turn = match parts.next() {
            Some(b"w") | None => Color::White,
            Some(b"b") => Color::Black,
            Some(_) => return Err(ParseFenError::InvalidTurn),
        };

        match parts.next() {
            Some(b"-") | None => (),
            Some(castling_part) => {
                for &ch in castling_part {
                    let flag = match ch {
                        b'K' => Castles::WHITE_KING_SIDE,
                        b'Q' => Castles::WHITE_QUEEN_SIDE,
                        b'k' => Castles::BLACK_KING_SIDE,
                        b'q' => Castles::BLACK_QUEEN_SIDE,
                        _ => return Err(ParseFenError::InvalidCastling),
                    };
                    if result.castles.contains(flag) {
                        return Err(ParseFenError::InvalidCastling);
                    }
                    result.castles |= flag;
                }
            }
        }

        match parts.next() {
            Some(b"-") | None => (),
            Some(ep_part) => {
                result.ep_square =
                    Some(Square::from_ascii(ep_part).map_err(|_| ParseFenError::InvalidEpSquare)?);
            }
        }

        if let Some(halfmoves_part) = parts.next() {
            result.halfmoves =
                btoi::btou(halfmoves_part).map_err(|_| ParseFenError::InvalidHalfmoveClock)?;
        }

        if let Some(fullmoves_part) = parts.next() {
            result.fullmoves = btoi::btou(fullmoves_part)
                .ok()
                .and_then(NonZeroU32::new)
                .ok_or(ParseFenError::InvalidFullmoves)?;
        }

        if parts.next().is_some() {
            return Err(ParseFenError::InvalidFen);
        }

        Ok(result)
    }

    /// Encodes the pieces, with the pieces of the side to move active, in
    /// square order.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError`] if the pieces do not form a valid
    /// position, or with [`PositionErrorKinds::INVALID_EN_PASSANT`] if
    /// there is no pawn that could just have passed the en passant square.
    pub fn into_position(&self) -> Result<Position, PositionError> {
        let victim = match self.ep_square {
            Some(ep_square) if ep_square.rank() == (!self.turn).fold(Rank::Third, Rank::Sixth) => {
                Some(Square::from_coords(
                    ep_square.file(),
                    (!self.turn).fold(Rank::Fourth, Rank::Fifth),
                ))
            }
            Some(_) => return Err(PositionErrorKinds::INVALID_EN_PASSANT.into()),
            None => None,
        };

        let mut found_victim = false;
        let pieces: Vec<Piece> = self
            .board
            .iter()
            .map(|&(square, color, role)| {
                let mut piece = Piece::new(role, square, color == self.turn);
                if self.has_moved(square, color, role) {
                    piece = piece.with(Flags::MOVED);
                }
                if victim == Some(square) && role == Role::Pawn && color != self.turn {
                    found_victim = true;
                    piece = piece.with(Flags::EN_PASSANT | Flags::MOVED);
                }
                piece
            })
            .collect();

        if victim.is_some() && !found_victim {
            return Err(PositionErrorKinds::INVALID_EN_PASSANT.into());
        }

        Position::new(pieces, self.turn)
    }

    fn has_moved(&self, square: Square, color: Color, role: Role) -> bool {
        let backrank = color.backrank();
        match role {
            Role::Pawn => square.rank() != color.pawn_rank(),
            Role::King => {
                square != Square::from_coords(File::E, backrank)
                    || !self.castles.intersects(Castles::color(color))
            }
            Role::Rook if square == Square::from_coords(File::H, backrank) => {
                !self.castles.contains(Castles::king_side(color))
            }
            Role::Rook if square == Square::from_coords(File::A, backrank) => {
                !self.castles.contains(Castles::queen_side(color))
            }
            Role::Rook => true,
            _ => false,
        }
    }

    /// Describes a position. The clocks are not tracked by positions, so
    /// they are reset.
    ///
    /// Castling rights are granted for each unmoved rook in a corner while
    /// the king of the same color is unmoved on its start square.
    pub fn from_position(pos: &Position) -> Fen {
        let mut board: Vec<(Square, Color, Role)> = pos
            .pieces()
            .iter()
            .filter(|p| !p.is_captured())
            .filter_map(|&p| Some((p.square()?, pos.color_of(p), p.role()?)))
            .collect();
        board.sort_by_key(|&(square, _, _)| square);

        let unmoved = |square: Square, role: Role, color: Color| {
            pos.piece_at(square).is_some_and(|p| {
                p.role() == Some(role) && !p.is_moved() && pos.color_of(p) == color
            })
        };

        let mut castles = Castles::empty();
        for color in Color::ALL {
            let backrank = color.backrank();
            if !unmoved(Square::from_coords(File::E, backrank), Role::King, color) {
                continue;
            }
            for (file, side) in [
                (File::H, Castles::king_side(color)),
                (File::A, Castles::queen_side(color)),
            ] {
                if unmoved(Square::from_coords(file, backrank), Role::Rook, color) {
                    castles |= side;
                }
            }
        }

        let ep_square = pos
            .pieces()
            .iter()
            .find(|p| !p.is_captured() && p.is_en_passant())
            .and_then(|p| p.file())
            .map(|file| Square::from_coords(file, (!pos.turn()).fold(Rank::Third, Rank::Sixth)));

        Fen {
            board,
            turn: pos.turn(),
            castles,
            ep_square,
            halfmoves: 0,
            fullmoves: NonZeroU32::MIN,
        }
    }

    fn append_board_to(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pieces = [None; 64];
        for &(square, color, role) in &self.board {
            pieces[square.index()] = Some(color.fold(role.upper_char(), role.char()));
        }

        for rank in Rank::ALL.into_iter().rev() {
            let mut empty = 0;
            for file in File::ALL {
                match pieces[Square::from_coords(file, rank).index()] {
                    Some(ch) => {
                        if empty > 0 {
                            write!(f, "{empty}")?;
                            empty = 0;
                        }
                        write!(f, "{ch}")?;
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                write!(f, "{empty}")?;
            }
            if rank > Rank::First {
                f.write_str("/")?;
            }
        }
        Ok(())
    }

    fn append_castles_to(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.castles.is_empty() {
            return f.write_str("-");
        }
        for (flag, ch) in [
            (Castles::WHITE_KING_SIDE, 'K'),
            (Castles::WHITE_QUEEN_SIDE, 'Q'),
            (Castles::BLACK_KING_SIDE, 'k'),
            (Castles::BLACK_QUEEN_SIDE, 'q'),
        ] {
            if self.castles.contains(flag) {
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}

/// Reads the piece placement field.
fn parse_board(board_part: &[u8]) -> Option<Vec<(Square, Color, Role)>> {
    let mut board = Vec::new();
    let mut rank = Rank::Eighth;
    let mut file = 0;

    for &ch in board_part {
        match ch {
            b'/' => {
                if file != 8 {
                    return None;
                }
                rank = rank.offset(-1)?;
                file = 0;
            }
            b'1'..=b'8' => {
                file += u32::from(ch - b'0');
                if file > 8 {
                    return None;
                }
            }
            _ => {
                let role = Role::from_char(char::from(ch.to_ascii_lowercase()))?;
                let color = Color::from_white(ch.is_ascii_uppercase());
                board.push((Square::from_coords(File::new(file)?, rank), color, role));
                file += 1;
            }
        }
    }

    if rank != Rank::First || file != 8 {
        return None;
    }

    board.sort_by_key(|&(square, _, _)| square);
    Some(board)
}

impl FromStr for Fen {
    type Err = ParseFenError;

    fn from_str(fen: &str) -> Result<Fen, ParseFenError> {
        Fen::from_ascii(fen.as_bytes())
    }
}

impl fmt::Display for Fen {
    /// Writes a FEN such as
    /// `rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.append_board_to(f)?;
        write!(f, " {} ", self.turn.char())?;
        self.append_castles_to(f)?;
        match self.ep_square {
            Some(ep_square) => write!(f, " {ep_square}")?,
            None => f.write_str(" -")?,
        }
        write!(f, " {} {}", self.halfmoves, self.fullmoves)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Fen {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Fen {
    fn deserialize<D>(deserializer: D) -> Result<Fen, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct FenVisitor;

        impl serde::de::Visitor<'_> for FenVisitor {
            type Value = Fen;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("fen string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Fen, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(FenVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen;

    const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_standard() {
        let fen: Fen = STARTING_FEN.parse().expect("valid fen");
        assert_eq!(fen, Fen::default());
        assert_eq!(fen.board.len(), 32);
        assert_eq!(fen.board[0], (Square::A1, Color::White, Role::Rook));
        assert_eq!(fen.board[31], (Square::H8, Color::Black, Role::Rook));
        assert_eq!(fen.to_string(), STARTING_FEN);
        assert_eq!(fen.into_position(), Ok(Position::standard()));
    }

    #[test]
    fn test_pawns_only() {
        let fen = Fen::from_position(&Position::pawns_only());
        assert_eq!(fen.to_string(), "8/pppppppp/8/8/8/8/PPPPPPPP/8 w - - 0 1");
        let pos = fen.into_position().expect("valid position");
        assert_eq!(pos.pieces().len(), 16);
        assert_eq!(movegen::generate(&pos).len(), 16);
    }

    #[test]
    fn test_write_read() {
        for fen in [
            "8/8/8/8/8/8/8/8 w - - 0 1",
            "r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1",
            "4k3/8/8/8/8/8/8/R3K3 b Q - 0 1",
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 1",
            "rnbqkbnr/pppp1ppp/8/8/3Pp3/8/PPP1PPPP/RNBQKBNR b KQkq d3 0 1",
        ] {
            let parsed: Fen = fen.parse().expect("valid fen");
            assert_eq!(parsed.to_string(), fen);
            let pos = parsed.into_position().expect("valid position");
            assert_eq!(Fen::from_position(&pos).to_string(), fen);
        }
    }

    #[test]
    fn test_clocks() {
        let fen: Fen = "8/8/8/8/8/8/8/8 b - - 12 34".parse().expect("valid fen");
        assert_eq!(fen.turn, Color::Black);
        assert_eq!(fen.halfmoves, 12);
        assert_eq!(fen.fullmoves.get(), 34);

        let fen: Fen = "8/8/8/8/8/8/8/8".parse().expect("board only");
        assert_eq!(fen, Fen::empty());
    }

    #[test]
    fn test_moved_flags() {
        let fen: Fen = "r3k2r/8/8/8/4P3/8/P7/R3K2R w Kq - 0 1".parse().expect("valid fen");
        let pos = fen.into_position().expect("valid position");
        let moved = |square| pos.piece_at(square).expect("piece").is_moved();
        assert!(!moved(Square::E1));
        assert!(!moved(Square::H1));
        assert!(moved(Square::A1));
        assert!(!moved(Square::E8));
        assert!(!moved(Square::A8));
        assert!(moved(Square::H8));
        assert!(!moved(Square::A2));
        assert!(moved(Square::E4));
    }

    #[test]
    fn test_en_passant() {
        let fen: Fen = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3"
            .parse()
            .expect("valid fen");
        let pos = fen.into_position().expect("valid position");
        let victim = pos.piece_at(Square::D5).expect("black pawn");
        assert!(victim.is_en_passant());
        assert!(!victim.is_active());

        let moves = movegen::generate(&pos);
        let ep = moves
            .iter()
            .find(|m| m.is_en_passant())
            .expect("en passant capture");
        assert_eq!((ep.orig(), ep.dest()), (Square::E5, Square::D6));
        assert_eq!(ep.capture().and_then(|p| p.square()), Some(Square::D5));
    }

    #[test]
    fn test_parse_errors() {
        for (fen, err) in [
            ("8/8/8/8/8/8/8 w - - 0 1", ParseFenError::InvalidBoard),
            ("8/8/8/8/8/8/8/8/8 w - - 0 1", ParseFenError::InvalidBoard),
            ("8/8/8/8/8/8/8/9 w - - 0 1", ParseFenError::InvalidBoard),
            ("8/8/8/8/8/8/8/44p w - - 0 1", ParseFenError::InvalidBoard),
            ("8/8/8/8/8/8/8/7x w - - 0 1", ParseFenError::InvalidBoard),
            ("8/8/8/8/8/8/8/8 x - - 0 1", ParseFenError::InvalidTurn),
            ("8/8/8/8/8/8/8/8 w KK - 0 1", ParseFenError::InvalidCastling),
            ("8/8/8/8/8/8/8/8 w A - 0 1", ParseFenError::InvalidCastling),
            ("8/8/8/8/8/8/8/8 w - e9 0 1", ParseFenError::InvalidEpSquare),
            ("8/8/8/8/8/8/8/8 w - - x 1", ParseFenError::InvalidHalfmoveClock),
            ("8/8/8/8/8/8/8/8 w - - 0 0", ParseFenError::InvalidFullmoves),
            ("8/8/8/8/8/8/8/8 w - - 0 1 1", ParseFenError::InvalidFen),
        ] {
            assert_eq!(fen.parse::<Fen>(), Err(err), "{fen}");
        }
    }

    #[test]
    fn test_position_errors() {
        let kinds = |fen: &str| {
            fen.parse::<Fen>()
                .expect("valid fen")
                .into_position()
                .map_err(|err| err.kinds())
        };
        assert_eq!(
            kinds("8/8/8/8/8/8/8/8 w - e6 0 1"),
            Err(PositionErrorKinds::INVALID_EN_PASSANT)
        );
        assert_eq!(
            kinds("8/8/8/4p3/8/8/8/8 w - e3 0 1"),
            Err(PositionErrorKinds::INVALID_EN_PASSANT)
        );
        assert_eq!(
            kinds("pppppppp/pppppppp/pppppppp/pppppppp/pppppppp/8/8/8 w - - 0 1"),
            Err(PositionErrorKinds::TOO_MANY_PIECES)
        );
    }
}
