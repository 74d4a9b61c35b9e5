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

//! Lookup maps for a single position.

use std::collections::HashMap;

use crate::{piece::Piece, position::Position, square::Square};

/// Maps from coordinates to pieces and from pieces to their slot in the
/// position, built in linear time.
///
/// Keying slots by piece value is sound because a validated
/// [`Position`] never holds two pieces in play on the same square, and
/// pieces on different squares differ in their coordinate bits.
/// Captured pieces are not indexed.
#[derive(Clone, Debug, Default)]
pub struct BoardIndex {
    by_coord: HashMap<u16, Piece>,
    index_of: HashMap<Piece, usize>,
}

impl BoardIndex {
    pub fn build(pos: &Position) -> BoardIndex {
        let len = pos.pieces().len();
        let mut index = BoardIndex {
            by_coord: HashMap::with_capacity(len),
            index_of: HashMap::with_capacity(len),
        };
        for (i, &piece) in pos.pieces().iter().enumerate() {
            if piece.is_captured() {
                continue;
            }
            index.by_coord.insert(piece.coord_bits(), piece);
            index.index_of.insert(piece, i);
        }
        index
    }

    /// The piece standing on the coordinates of `coord`. All other bits of
    /// `coord` are ignored, so a moved piece can be passed as is.
    #[inline]
    pub fn by_coord(&self, coord: u16) -> Option<Piece> {
        self.by_coord.get(&Piece(coord).coord_bits()).copied()
    }

    #[inline]
    pub fn at(&self, square: Square) -> Option<Piece> {
        self.by_coord(square.bits())
    }

    /// The slot of `piece` in the position.
    #[inline]
    pub fn index_of(&self, piece: Piece) -> Option<usize> {
        self.index_of.get(&piece).copied()
    }

    pub fn len(&self) -> usize {
        self.index_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_of.is_empty()
    }
}
