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

//! Chess pieces packed into 16 bits, pseudo-legal move generation, and
//! Standard Algebraic Notation with minimal disambiguation.
//!
//! Every [`Piece`] is a single `u16` holding its role, coordinates and
//! state flags. A [`Position`] is an ordered list of such pieces and the
//! color to move. Pieces carry no color of their own: the `active` flag
//! marks the pieces of the side to move.
//!
//! # Examples
//!
//! Generate pseudo-legal moves in the starting position:
//!
//! ```
//! use chessbits::Position;
//!
//! let pos = Position::standard();
//! let moves = pos.pseudo_legal_moves();
//! assert_eq!(moves.len(), 20);
//! ```
//!
//! Play a move by picking its resulting position:
//!
//! ```
//! use chessbits::{san::SanQuery, Color, Position, Square};
//!
//! let pos = Position::standard();
//! let moves = pos.pseudo_legal_moves();
//!
//! // 1. e4
//! let m = "e4".parse::<SanQuery>()?.find_move(&moves)?;
//! let pos = m.position();
//! assert_eq!(pos.turn(), Color::Black);
//! assert!(pos.piece_at(Square::E4).is_some_and(|p| p.is_en_passant()));
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! Name every move without ambiguity:
//!
//! ```
//! use chessbits::{san, Position};
//!
//! let pos = Position::standard();
//! let moves = pos.pseudo_legal_moves();
//! let table = san::encode_all(&moves);
//! assert_eq!(table.label(0).map(|san| san.to_string()), Some("Nc3".to_owned()));
//! ```
//!
//! Also supports [FEN](fen) for positions and [Zobrist hashing](zobrist).
//!
//! # Feature flags
//!
//! * `serde`: Implements [`serde::Serialize`](https://docs.rs/serde/1/serde/trait.Serialize.html)
//!   and [`serde::Deserialize`](https://docs.rs/serde/1/serde/trait.Deserialize.html) for
//!   types with unique natural representations.
//! * `arbitrary`: Implements
//!   [`arbitrary::Arbitrary`](https://docs.rs/arbitrary/1/arbitrary/trait.Arbitrary.html)
//!   for fuzzing.
//! * `nohash-hasher`: Implements
//!   [`nohash_hasher::IsEnabled`](https://docs.rs/nohash-hasher/0.2/nohash_hasher/trait.IsEnabled.html)
//!   for sensible types.

#![doc(html_root_url = "https://docs.rs/chessbits/0.1.0")]
#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]
#![cfg_attr(docs_rs, feature(doc_auto_cfg))]

#[macro_use]
mod util;
mod color;
mod m;
mod perft;
mod role;
mod square;

pub mod board_index;
pub mod fen;
pub mod movegen;
pub mod piece;
pub mod position;
pub mod san;
pub mod zobrist;

pub use board_index::BoardIndex;
pub use color::{Color, ParseColorError};
pub use m::{Move, MoveList};
pub use perft::{debug_perft, perft};
pub use piece::{Delta, Flags, Piece};
pub use position::{Position, PositionError, PositionErrorKinds};
pub use role::Role;
pub use square::{File, ParseSquareError, Rank, Square};

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for File {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Rank {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Square {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Role {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Color {}

#[cfg(feature = "nohash-hasher")]
impl nohash_hasher::IsEnabled for Piece {}
