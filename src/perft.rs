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

//! Count pseudo-legal move paths.
//!
//! # Examples
//!
//! ```
//! use chessbits::{perft, Position};
//!
//! let pos = Position::standard();
//! assert_eq!(perft(&pos, 1), 20);
//! assert_eq!(perft(&pos, 2), 400);
//! ```

use tracing::debug;

use crate::{movegen, position::Position};

/// Counts pseudo-legal move paths of a given length.
///
/// There is no notion of check, so paths continue after a king is
/// captured. Useful for comparing, testing and debugging move generation
/// correctness and performance.
pub fn perft(pos: &Position, depth: u32) -> u64 {
    if depth < 1 {
        1
    } else {
        let moves = movegen::generate(pos);

        if depth == 1 {
            moves.len() as u64
        } else {
            moves
                .iter()
                .map(|m| perft(m.position(), depth - 1))
                .sum()
        }
    }
}

/// Like [`perft()`], but also logs the count below each move.
pub fn debug_perft(pos: &Position, depth: u32) -> u64 {
    if depth < 1 {
        1
    } else {
        movegen::generate(pos)
            .iter()
            .map(|m| {
                let nodes = perft(m.position(), depth - 1);
                debug!(%m, depth = depth - 1, nodes, "perft");
                nodes
            })
            .sum()
    }
}
