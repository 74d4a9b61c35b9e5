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

//! Zobrist hashing for positions.
//!
//! Every piece in play contributes the key of its key tuple (see
//! [`key_tuples()`](crate::piece::key_tuples)), and the key
//! [`WHITE_TURN`] is added when White is to move. Flags that do not
//! change the available moves, like the moved flag of a knight, do not
//! affect the hash, and neither does the order of the pieces.
//!
//! # Stability
//!
//! The keys are drawn from a fixed splitmix64 stream, so hashes are stable
//! across builds and platforms.
//!
//! # Examples
//!
//! ```
//! use chessbits::Position;
//!
//! let pos = Position::standard();
//! let m = &pos.pseudo_legal_moves()[0];
//! assert_ne!(pos.zobrist_hash(), m.position().zobrist_hash());
//! ```

use std::{
    fmt,
    ops::{BitXor, BitXorAssign},
};

use crate::{
    color::Color,
    piece::{Piece, KEY_COUNT},
    position::Position,
};

const SEED: u64 = 0x9E37_79B9_7F4A_7C15;

const fn splitmix64(state: u64) -> (u64, u64) {
    let state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (state, z ^ (z >> 31))
}

const fn generate_keys() -> ([u64; KEY_COUNT], u64) {
    let mut keys = [0; KEY_COUNT];
    let mut state = SEED;
    let mut i = 0;
    while i < KEY_COUNT {
        let (next, key) = splitmix64(state);
        keys[i] = key;
        state = next;
        i += 1;
    }
    let (_, white_turn) = splitmix64(state);
    (keys, white_turn)
}

const GENERATED: ([u64; KEY_COUNT], u64) = generate_keys();

/// One key per key tuple, indexed by
/// [`Piece::key_index()`](crate::Piece::key_index).
pub static KEYS: [u64; KEY_COUNT] = GENERATED.0;

/// Added when White is to move.
pub const WHITE_TURN: u64 = GENERATED.1;

/// A 64 bit Zobrist hash.
#[derive(Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Zobrist64(pub u64);

impl Zobrist64 {
    /// The contribution of a single piece. Pieces that are captured or not
    /// on the board contribute nothing.
    pub fn piece(piece: Piece) -> Zobrist64 {
        if piece.is_captured() {
            return Zobrist64(0);
        }
        Zobrist64(piece.key_index().map_or(0, |i| KEYS[i]))
    }

    pub fn turn(turn: Color) -> Zobrist64 {
        Zobrist64(turn.fold(WHITE_TURN, 0))
    }
}

impl From<u64> for Zobrist64 {
    #[inline]
    fn from(value: u64) -> Zobrist64 {
        Zobrist64(value)
    }
}

impl From<Zobrist64> for u64 {
    #[inline]
    fn from(value: Zobrist64) -> u64 {
        value.0
    }
}

impl BitXor for Zobrist64 {
    type Output = Zobrist64;

    #[inline]
    fn bitxor(self, other: Zobrist64) -> Zobrist64 {
        Zobrist64(self.0 ^ other.0)
    }
}

impl BitXorAssign for Zobrist64 {
    #[inline]
    fn bitxor_assign(&mut self, other: Zobrist64) {
        self.0 ^= other.0;
    }
}

impl fmt::Debug for Zobrist64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Zobrist64({:#018x})", self.0)
    }
}

impl fmt::LowerHex for Zobrist64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Position {
    /// Computes the Zobrist hash of the position from scratch.
    pub fn zobrist_hash(&self) -> Zobrist64 {
        self.pieces()
            .iter()
            .fold(Zobrist64::turn(self.turn()), |hash, &piece| {
                hash ^ Zobrist64::piece(piece)
            })
    }
}
