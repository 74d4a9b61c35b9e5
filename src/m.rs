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

use std::fmt;

use crate::{piece::Piece, position::Position, role::Role, square::Square};

/// A pseudo-legal move together with the position it leads to.
///
/// `from` and `to` are the encoded values of the moving piece before and
/// after the move, from the point of view of the side making it. In the
/// resulting position the same piece appears with its active flag
/// toggled, as the turn has passed.
///
/// Moves are only created by [`movegen::generate()`](crate::movegen::generate).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Move {
    pub(crate) role: Role,
    pub(crate) from: Piece,
    pub(crate) to: Piece,
    pub(crate) orig: Square,
    pub(crate) dest: Square,
    pub(crate) capture: Option<Piece>,
    pub(crate) position: Position,
}

impl Move {
    /// Gets the role of the moved piece.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// The moving piece before the move.
    #[inline]
    pub fn from(&self) -> Piece {
        self.from
    }

    /// The moving piece after the move, with the moved flag set and, after
    /// a double push, the en passant flag.
    #[inline]
    pub fn to(&self) -> Piece {
        self.to
    }

    /// Gets the origin square.
    #[inline]
    pub fn orig(&self) -> Square {
        self.orig
    }

    /// Gets the target square.
    #[inline]
    pub fn dest(&self) -> Square {
        self.dest
    }

    /// The captured piece as it was before the move, or `None`.
    #[inline]
    pub fn capture(&self) -> Option<Piece> {
        self.capture
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.capture.is_some()
    }

    /// Checks if the move is en passant, i.e. the captured pawn was not
    /// on the target square.
    pub fn is_en_passant(&self) -> bool {
        self.capture
            .is_some_and(|victim| victim.square() != Some(self.dest))
    }

    /// Checks if the move is a pawn double push.
    pub fn is_double_push(&self) -> bool {
        self.to.is_en_passant()
    }

    /// The position after the move.
    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn into_position(self) -> Position {
        self.position
    }
}

impl fmt::Display for Move {
    /// Long algebraic notation, e.g. `Ng1-f3` or `e5xd6`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.role != Role::Pawn {
            write!(f, "{}", self.role.upper_char())?;
        }
        write!(
            f,
            "{}{}{}",
            self.orig,
            if self.is_capture() { 'x' } else { '-' },
            self.dest
        )
    }
}

/// A container for moves. Pseudo-legal move counts are not bounded as
/// tightly as legal ones, so this is growable.
pub type MoveList = Vec<Move>;
