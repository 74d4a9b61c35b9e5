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

use std::{error::Error, fmt};

use arrayvec::ArrayVec;
use bitflags::bitflags;
use tracing::debug;

use crate::{
    board_index::BoardIndex,
    color::Color,
    m::MoveList,
    movegen,
    piece::Piece,
    role::Role,
    square::{File, Rank, Square},
};

/// Maximum number of pieces in a position.
pub const MAX_PIECES: usize = 32;

bitflags! {
    /// Reasons for a [`PositionError`].
    ///
    /// Pieces with the captured flag are exempt from all checks except
    /// [`PositionErrorKinds::TOO_MANY_PIECES`].
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct PositionErrorKinds: u32 {
        /// There are more than [`MAX_PIECES`] pieces.
        const TOO_MANY_PIECES = 1 << 0;
        /// A piece in play has a coordinate in a boundary pattern.
        const OFF_BOARD = 1 << 1;
        /// A piece in play has the movement sentinel or the unassigned
        /// value in its type field.
        const NOT_A_ROLE = 1 << 2;
        /// Two pieces in play share a square.
        const OVERLAPPING = 1 << 3;
        /// The en passant flag is set on something other than a single
        /// pawn of the side that just moved, standing on its double push
        /// rank.
        const INVALID_EN_PASSANT = 1 << 4;
    }
}

/// Error when trying to create a [`Position`] from an illegal set of
/// pieces.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionError {
    kinds: PositionErrorKinds,
}

impl PositionError {
    pub fn kinds(&self) -> PositionErrorKinds {
        self.kinds
    }
}

impl From<PositionErrorKinds> for PositionError {
    fn from(kinds: PositionErrorKinds) -> PositionError {
        PositionError { kinds }
    }
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reasons = Vec::new();
        if self.kinds.contains(PositionErrorKinds::TOO_MANY_PIECES) {
            reasons.push("too many pieces");
        }
        if self.kinds.contains(PositionErrorKinds::OFF_BOARD) {
            reasons.push("piece off board");
        }
        if self.kinds.contains(PositionErrorKinds::NOT_A_ROLE) {
            reasons.push("invalid piece type");
        }
        if self.kinds.contains(PositionErrorKinds::OVERLAPPING) {
            reasons.push("overlapping pieces");
        }
        if self.kinds.contains(PositionErrorKinds::INVALID_EN_PASSANT) {
            reasons.push("invalid en passant");
        }
        write!(f, "illegal position: {}", reasons.join(", "))
    }
}

impl Error for PositionError {}

const BACKRANK: [Role; 8] = [
    Role::Rook,
    Role::Knight,
    Role::Bishop,
    Role::Queen,
    Role::King,
    Role::Bishop,
    Role::Knight,
    Role::Rook,
];

/// An ordered list of encoded pieces and the color to move.
///
/// The order of pieces carries no chess meaning, but it is stable: moves
/// are generated piece by piece in this order, and applying a move keeps
/// every other piece in its slot.
///
/// Positions are values. Applying a move produces a new position, see
/// [`Move::position()`](crate::Move::position).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Position {
    pieces: ArrayVec<Piece, MAX_PIECES>,
    turn: Color,
}

impl Position {
    /// Validates a list of pieces.
    ///
    /// The `active` flag of each piece is relative to `turn`.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError`] with all detected problems if the pieces
    /// do not form a position that moves can be generated for.
    ///
    /// # Examples
    ///
    /// ```
    /// use chessbits::{Color, Piece, Position, PositionErrorKinds, Role, Square};
    ///
    /// let pos = Position::new([
    ///     Piece::new(Role::King, Square::E1, true),
    ///     Piece::new(Role::King, Square::E8, false),
    /// ], Color::White)?;
    /// assert_eq!(pos.pieces().len(), 2);
    ///
    /// let err = Position::new([
    ///     Piece::new(Role::King, Square::E1, true),
    ///     Piece::new(Role::Queen, Square::E1, false),
    /// ], Color::White).unwrap_err();
    /// assert_eq!(err.kinds(), PositionErrorKinds::OVERLAPPING);
    /// # Ok::<_, chessbits::PositionError>(())
    /// ```
    pub fn new<I>(pieces: I, turn: Color) -> Result<Position, PositionError>
    where
        I: IntoIterator<Item = Piece>,
    {
        let mut errors = PositionErrorKinds::empty();

        let mut list = ArrayVec::new();
        for piece in pieces {
            if list.try_push(piece).is_err() {
                errors |= PositionErrorKinds::TOO_MANY_PIECES;
                break;
            }
        }

        let mut occupied = [false; 64];
        let mut en_passant = 0;
        for piece in list.iter().filter(|p| !p.is_captured()) {
            let square = piece.square();
            match square {
                Some(sq) if occupied[sq.index()] => errors |= PositionErrorKinds::OVERLAPPING,
                Some(sq) => occupied[sq.index()] = true,
                None => errors |= PositionErrorKinds::OFF_BOARD,
            }

            match piece.role() {
                None => errors |= PositionErrorKinds::NOT_A_ROLE,
                Some(role) if piece.is_en_passant() => {
                    en_passant += 1;
                    let pushed_to = (!turn).fold(Rank::Fourth, Rank::Fifth);
                    if role != Role::Pawn
                        || piece.is_active()
                        || square.is_some_and(|sq| sq.rank() != pushed_to)
                    {
                        errors |= PositionErrorKinds::INVALID_EN_PASSANT;
                    }
                }
                Some(_) => (),
            }
        }
        if en_passant > 1 {
            errors |= PositionErrorKinds::INVALID_EN_PASSANT;
        }

        if errors.is_empty() {
            Ok(Position { pieces: list, turn })
        } else {
            debug!(?errors, "rejected position");
            Err(PositionError { kinds: errors })
        }
    }

    /// Builds a successor without validation.
    pub(crate) fn from_parts(pieces: ArrayVec<Piece, MAX_PIECES>, turn: Color) -> Position {
        Position { pieces, turn }
    }

    /// The standard starting position: the white officers from `a1` to
    /// `h1`, white pawns, black pawns, and the black officers from `a8` to
    /// `h8`. White to move.
    ///
    /// # Examples
    ///
    /// ```
    /// use chessbits::Position;
    ///
    /// let pos = Position::standard();
    /// assert_eq!(pos.pieces().len(), 32);
    /// assert_eq!(pos.pseudo_legal_moves().len(), 20);
    /// ```
    pub fn standard() -> Position {
        let mut pieces = ArrayVec::new();
        pieces.extend(officers(Color::White, true));
        pieces.extend(pawns(Color::White, true));
        pieces.extend(pawns(Color::Black, false));
        pieces.extend(officers(Color::Black, false));
        Position::from_parts(pieces, Color::White)
    }

    /// Only the pawns of the starting position: black pawns, then white
    /// pawns. White to move.
    pub fn pawns_only() -> Position {
        let mut pieces = ArrayVec::new();
        pieces.extend(pawns(Color::Black, false));
        pieces.extend(pawns(Color::White, true));
        Position::from_parts(pieces, Color::White)
    }

    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// The color of a piece in this position.
    #[inline]
    pub fn color_of(&self, piece: Piece) -> Color {
        self.turn ^ !piece.is_active()
    }

    /// Finds the piece in play on `square`.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.pieces
            .iter()
            .copied()
            .find(|p| !p.is_captured() && p.square() == Some(square))
    }

    /// Builds the lookup maps for this position.
    pub fn board_index(&self) -> BoardIndex {
        BoardIndex::build(self)
    }

    /// Generates all pseudo-legal moves, see [`movegen::generate()`].
    pub fn pseudo_legal_moves(&self) -> MoveList {
        movegen::generate(self)
    }

    pub(crate) fn into_parts(self) -> (ArrayVec<Piece, MAX_PIECES>, Color) {
        (self.pieces, self.turn)
    }
}

impl Default for Position {
    fn default() -> Position {
        Position::standard()
    }
}

fn officers(color: Color, active: bool) -> impl Iterator<Item = Piece> {
    File::ALL.into_iter().map(move |file| {
        Piece::new(
            BACKRANK[usize::from(file)],
            Square::from_coords(file, color.backrank()),
            active,
        )
    })
}

fn pawns(color: Color, active: bool) -> impl Iterator<Item = Piece> {
    File::ALL.into_iter().map(move |file| {
        Piece::new(
            Role::Pawn,
            Square::from_coords(file, color.pawn_rank()),
            active,
        )
    })
}
