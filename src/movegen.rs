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

//! Pseudo-legal move generation.
//!
//! Moves obey the movement rules of each piece but may leave the own king
//! in check. Castling and promotion are not generated. A pawn reaching the
//! last rank stays a pawn and has no further moves.
//!
//! # Examples
//!
//! ```
//! use chessbits::{movegen, Position, Square};
//!
//! let pos = Position::standard();
//! let moves = movegen::generate(&pos);
//! assert_eq!(moves.len(), 20);
//!
//! // Pieces are visited in position order: the knight on b1 comes first.
//! assert_eq!(moves[0].orig(), Square::B1);
//! assert_eq!(moves[0].dest(), Square::C3);
//! ```

use tracing::trace;

use crate::{
    board_index::BoardIndex,
    m::{Move, MoveList},
    piece::{Delta, Flags, Piece},
    position::Position,
    role::Role,
};

/// North, south, east, west.
pub const ROOK_DELTAS: [Delta; 4] = [Delta::NORTH, Delta::SOUTH, Delta::EAST, Delta::WEST];

/// North-east, north-west, south-east, south-west.
pub const BISHOP_DELTAS: [Delta; 4] = [
    Delta::NORTH_EAST,
    Delta::NORTH_WEST,
    Delta::SOUTH_EAST,
    Delta::SOUTH_WEST,
];

/// All eight directions, cardinal first.
pub const KING_DELTAS: [Delta; 8] = [
    Delta::NORTH,
    Delta::SOUTH,
    Delta::EAST,
    Delta::WEST,
    Delta::NORTH_EAST,
    Delta::NORTH_WEST,
    Delta::SOUTH_EAST,
    Delta::SOUTH_WEST,
];

/// Knight jumps, clockwise starting north-north-east.
pub const KNIGHT_DELTAS: [Delta; 8] = [
    Delta::NORTH.plus(Delta::NORTH_EAST),
    Delta::EAST.plus(Delta::NORTH_EAST),
    Delta::EAST.plus(Delta::SOUTH_EAST),
    Delta::SOUTH.plus(Delta::SOUTH_EAST),
    Delta::SOUTH.plus(Delta::SOUTH_WEST),
    Delta::WEST.plus(Delta::SOUTH_WEST),
    Delta::WEST.plus(Delta::NORTH_WEST),
    Delta::NORTH.plus(Delta::NORTH_WEST),
];

/// Pawn captures go to the forward diagonals, west side first.
const PAWN_CAPTURE_SIDES: [Delta; 2] = [Delta::WEST, Delta::EAST];

/// Generates all pseudo-legal moves of the side to move.
///
/// Active pieces are visited in position order, and the directions of each
/// piece in the order of the delta tables in this module, so the result is
/// fully determined by the position.
pub fn generate(pos: &Position) -> MoveList {
    let gen = Generator {
        pos,
        index: BoardIndex::build(pos),
    };

    let mut moves = MoveList::new();
    for &piece in pos.pieces() {
        if !piece.is_active() || piece.is_captured() {
            continue;
        }
        let Some(role) = piece.role() else {
            continue;
        };
        match role {
            Role::Pawn => gen.pawn(piece, &mut moves),
            Role::Knight => gen.steps(piece, &KNIGHT_DELTAS, &mut moves),
            Role::Bishop => gen.slides(piece, &BISHOP_DELTAS, &mut moves),
            Role::Rook => gen.slides(piece, &ROOK_DELTAS, &mut moves),
            Role::Queen => gen.slides(piece, &KING_DELTAS, &mut moves),
            Role::King => gen.steps(piece, &KING_DELTAS, &mut moves),
        }
    }

    trace!(turn = %pos.turn(), moves = moves.len(), "generated pseudo-legal moves");
    moves
}

struct Generator<'a> {
    pos: &'a Position,
    index: BoardIndex,
}

impl Generator<'_> {
    fn pawn(&self, pawn: Piece, moves: &mut MoveList) {
        let forward = self.pos.turn().forward();

        let single = pawn.offset(forward);
        if single.is_on_board() && self.index.by_coord(single.bits()).is_none() {
            self.push(pawn, moved(single), None, moves);

            let double = single.offset(forward);
            if !pawn.is_moved()
                && double.is_on_board()
                && self.index.by_coord(double.bits()).is_none()
            {
                self.push(pawn, moved(double).with(Flags::EN_PASSANT), None, moves);
            }
        }

        for side in PAWN_CAPTURE_SIDES {
            let target = pawn.offset(forward.plus(side));
            if !target.is_on_board() {
                continue;
            }
            match self.index.by_coord(target.bits()) {
                Some(victim) if !victim.is_active() => {
                    self.push(pawn, moved(target), Some(victim), moves);
                }
                Some(_) => (),
                None => {
                    // The pawn beside us may have just passed the target.
                    let beside = pawn.offset(side);
                    if let Some(victim) = self.index.by_coord(beside.bits()) {
                        if !victim.is_active()
                            && victim.is_en_passant()
                            && victim.role() == Some(Role::Pawn)
                        {
                            self.push(pawn, moved(target), Some(victim), moves);
                        }
                    }
                }
            }
        }
    }

    fn steps(&self, piece: Piece, deltas: &[Delta], moves: &mut MoveList) {
        for &delta in deltas {
            let target = piece.offset(delta);
            if !target.is_on_board() {
                continue;
            }
            match self.index.by_coord(target.bits()) {
                None => self.push(piece, moved(target), None, moves),
                Some(victim) if !victim.is_active() => {
                    self.push(piece, moved(target), Some(victim), moves)
                }
                Some(_) => (),
            }
        }
    }

    fn slides(&self, piece: Piece, deltas: &[Delta], moves: &mut MoveList) {
        for &delta in deltas {
            let mut target = piece.offset(delta);
            while target.is_on_board() {
                match self.index.by_coord(target.bits()) {
                    None => self.push(piece, moved(target), None, moves),
                    Some(victim) => {
                        if !victim.is_active() {
                            self.push(piece, moved(target), Some(victim), moves);
                        }
                        break;
                    }
                }
                target = target.offset(delta);
            }
        }
    }

    fn push(&self, from: Piece, to: Piece, capture: Option<Piece>, moves: &mut MoveList) {
        let (Some(role), Some(orig), Some(dest)) = (from.role(), from.square(), to.square()) else {
            return;
        };
        moves.push(Move {
            role,
            from,
            to,
            orig,
            dest,
            capture,
            position: self.successor(from, to, capture),
        });
    }

    /// Copies the position with the mover replaced, the victim removed and
    /// the turn passed on.
    fn successor(&self, from: Piece, to: Piece, capture: Option<Piece>) -> Position {
        let (mut pieces, turn) = self.pos.clone().into_parts();
        let slot = self.index.index_of(from);
        if let Some(i) = slot {
            pieces[i] = to;
        }

        for (i, piece) in pieces.iter_mut().enumerate() {
            *piece = piece.toggled(Flags::ACTIVE);
            if Some(i) != slot {
                *piece = piece.without(Flags::EN_PASSANT);
            }
        }

        if let Some(i) = capture.and_then(|victim| self.index.index_of(victim)) {
            pieces.remove(i);
        }

        Position::from_parts(pieces, !turn)
    }
}

/// The piece after stepping onto its target.
#[inline]
fn moved(target: Piece) -> Piece {
    target.with(Flags::MOVED).without(Flags::EN_PASSANT)
}
