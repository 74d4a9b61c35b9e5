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

//! Pieces packed into 16 bit integers.
//!
//! A [`Piece`] is a `u16` made of eight contiguous fields, starting from
//! the least significant bit:
//!
//! | Field | Width | Shift |
//! |---|---|---|
//! | moved | 1 | 0 |
//! | en passant | 1 | 1 |
//! | active | 1 | 2 |
//! | type | 3 | 3 |
//! | x-coordinate | 4 | 6 |
//! | y-coordinate | 4 | 10 |
//! | captured | 1 | 14 |
//! | unused | 1 | 15 |
//!
//! Coordinates are stored with a bias of 4, so files and ranks on the board
//! occupy `4..=11`, where the upper two bits of the field are `01` or `10`.
//! The patterns `00xx` and `11xx` are off the board. Directions are
//! [`Delta`] values with the same shape as a piece, so stepping is plain
//! integer addition and leaving the board shows up as a boundary pattern.
//!
//! # Examples
//!
//! ```
//! use chessbits::{Piece, Role, Square, piece::{Delta, Flags}};
//!
//! let knight = Piece::new(Role::Knight, Square::G1, true);
//! assert_eq!(knight.role(), Some(Role::Knight));
//! assert!(knight.flags().contains(Flags::ACTIVE));
//!
//! let jumped = knight.offset(Delta::NORTH.plus(Delta::NORTH_WEST));
//! assert_eq!(jumped.square(), Some(Square::F3));
//!
//! let fell_off = knight.offset(Delta::SOUTH);
//! assert!(!fell_off.is_on_board());
//! ```

use std::fmt;

use bitflags::bitflags;

use crate::{
    role::Role,
    square::{File, Rank, Square, COORD_BIAS},
};

/// The fields of an encoded piece, in bit order.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Field {
    Moved = 0,
    EnPassant = 1,
    Active = 2,
    Kind = 3,
    X = 4,
    Y = 5,
    Captured = 6,
    Unused = 7,
}

/// Position of a field within the 16 bits.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct FieldLayout {
    pub shift: u32,
    pub width: u32,
    pub mask: u16,
}

const WIDTHS: [u32; 8] = [1, 1, 1, 3, 4, 4, 1, 1];

/// Layout of each [`Field`], indexed by its discriminant.
pub const FIELDS: [FieldLayout; 8] = layout(WIDTHS);

const fn layout(widths: [u32; 8]) -> [FieldLayout; 8] {
    let mut fields = [FieldLayout {
        shift: 0,
        width: 0,
        mask: 0,
    }; 8];
    let mut shift = 0;
    let mut i = 0;
    while i < widths.len() {
        let width = widths[i];
        fields[i] = FieldLayout {
            shift,
            width,
            mask: (((1u32 << width) - 1) << shift) as u16,
        };
        shift += width;
        i += 1;
    }
    assert!(shift == u16::BITS, "fields must cover the piece exactly");
    fields
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Moved,
        Field::EnPassant,
        Field::Active,
        Field::Kind,
        Field::X,
        Field::Y,
        Field::Captured,
        Field::Unused,
    ];

    #[inline]
    pub const fn layout(self) -> FieldLayout {
        FIELDS[self as usize]
    }

    #[inline]
    pub const fn shift(self) -> u32 {
        self.layout().shift
    }

    #[inline]
    pub const fn width(self) -> u32 {
        self.layout().width
    }

    #[inline]
    pub const fn mask(self) -> u16 {
        self.layout().mask
    }

    /// Places `value` into this field. Bits beyond the width are dropped.
    #[inline]
    pub const fn put(self, value: u16) -> u16 {
        (value << self.shift()) & self.mask()
    }
}

/// Value of the type field that marks a direction rather than a piece.
pub const MOVEMENT_KIND: u16 = 6;

const COORD_MASK: u16 = Field::X.mask() | Field::Y.mask();

bitflags! {
    /// The single bit fields of a piece.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct Flags: u16 {
        /// The piece has moved at least once.
        const MOVED = 1 << Field::Moved.shift();
        /// The pawn has just made a double push and can be taken en passant
        /// during the following ply.
        const EN_PASSANT = 1 << Field::EnPassant.shift();
        /// The piece belongs to the side to move.
        const ACTIVE = 1 << Field::Active.shift();
        /// The piece has been taken off the board.
        const CAPTURED = 1 << Field::Captured.shift();
        const UNUSED = 1 << Field::Unused.shift();
    }
}

/// All fields of a piece as plain values.
///
/// `x` and `y` are the raw (biased) field values, see the
/// [module documentation](self).
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Default)]
pub struct Fields {
    pub moved: bool,
    pub en_passant: bool,
    pub active: bool,
    pub kind: u8,
    pub x: u8,
    pub y: u8,
    pub captured: bool,
    pub unused: bool,
}

impl Fields {
    /// Packs the fields. Values wider than their field are masked.
    ///
    /// # Examples
    ///
    /// ```
    /// use chessbits::piece::Fields;
    ///
    /// let fields = Fields { kind: 3, x: 4, y: 4, ..Fields::default() };
    /// assert_eq!(fields.encode().decode(), fields);
    ///
    /// let masked = Fields { kind: 9, ..Fields::default() };
    /// assert_eq!(masked.encode().decode().kind, 1);
    /// ```
    pub const fn encode(self) -> Piece {
        Piece(
            Field::Moved.put(self.moved as u16)
                | Field::EnPassant.put(self.en_passant as u16)
                | Field::Active.put(self.active as u16)
                | Field::Kind.put(self.kind as u16)
                | Field::X.put(self.x as u16)
                | Field::Y.put(self.y as u16)
                | Field::Captured.put(self.captured as u16)
                | Field::Unused.put(self.unused as u16),
        )
    }
}

/// A direction, shaped like a piece so that adding it to a piece moves the
/// coordinate fields.
///
/// Each component stays within `-2..=2`, which keeps a coordinate on the
/// board (`4..=11`) from carrying into the neighbouring field.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct Delta(i16);

impl Delta {
    const FILE: i16 = 1 << Field::X.shift();
    const RANK: i16 = 1 << Field::Y.shift();

    pub const NORTH: Delta = Delta::new(0, 1);
    pub const SOUTH: Delta = Delta::new(0, -1);
    pub const EAST: Delta = Delta::new(1, 0);
    pub const WEST: Delta = Delta::new(-1, 0);
    pub const NORTH_EAST: Delta = Delta::NORTH.plus(Delta::EAST);
    pub const NORTH_WEST: Delta = Delta::NORTH.plus(Delta::WEST);
    pub const SOUTH_EAST: Delta = Delta::SOUTH.plus(Delta::EAST);
    pub const SOUTH_WEST: Delta = Delta::SOUTH.plus(Delta::WEST);

    #[inline]
    pub const fn new(files: i16, ranks: i16) -> Delta {
        Delta(files * Delta::FILE + ranks * Delta::RANK)
    }

    #[inline]
    pub const fn plus(self, other: Delta) -> Delta {
        Delta(self.0 + other.0)
    }

    #[inline]
    pub const fn bits(self) -> i16 {
        self.0
    }
}

/// A piece packed into 16 bits.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Piece(pub u16);

impl Piece {
    /// An unmoved piece of the given role.
    #[inline]
    pub const fn new(role: Role, square: Square, active: bool) -> Piece {
        Piece(role.bits() | square.bits() | Field::Active.put(active as u16))
    }

    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Extracts the raw value of a field.
    #[inline]
    pub const fn get(self, field: Field) -> u16 {
        (self.0 & field.mask()) >> field.shift()
    }

    /// Unpacks all fields.
    pub const fn decode(self) -> Fields {
        Fields {
            moved: self.get(Field::Moved) != 0,
            en_passant: self.get(Field::EnPassant) != 0,
            active: self.get(Field::Active) != 0,
            kind: self.get(Field::Kind) as u8,
            x: self.get(Field::X) as u8,
            y: self.get(Field::Y) as u8,
            captured: self.get(Field::Captured) != 0,
            unused: self.get(Field::Unused) != 0,
        }
    }

    /// Tests that neither coordinate is in a boundary pattern.
    #[inline]
    pub const fn is_on_board(self) -> bool {
        in_window(self.get(Field::X)) && in_window(self.get(Field::Y))
    }

    /// The role, or `None` for the movement sentinel and the unassigned
    /// type value.
    #[inline]
    pub const fn role(self) -> Option<Role> {
        Role::from_kind(self.get(Field::Kind) as u32)
    }

    #[inline]
    pub const fn is_movement(self) -> bool {
        self.get(Field::Kind) == MOVEMENT_KIND
    }

    #[inline]
    pub const fn file(self) -> Option<File> {
        let x = self.get(Field::X);
        if in_window(x) {
            File::new((x - COORD_BIAS) as u32)
        } else {
            None
        }
    }

    #[inline]
    pub const fn rank(self) -> Option<Rank> {
        let y = self.get(Field::Y);
        if in_window(y) {
            Rank::new((y - COORD_BIAS) as u32)
        } else {
            None
        }
    }

    #[inline]
    pub const fn square(self) -> Option<Square> {
        match (self.file(), self.rank()) {
            (Some(file), Some(rank)) => Some(Square::from_coords(file, rank)),
            _ => None,
        }
    }

    /// Both coordinate fields, with everything else cleared.
    #[inline]
    pub const fn coord_bits(self) -> u16 {
        self.0 & COORD_MASK
    }

    #[inline]
    pub const fn flags(self) -> Flags {
        Flags::from_bits_truncate(self.0)
    }

    #[inline]
    pub const fn is_moved(self) -> bool {
        self.flags().contains(Flags::MOVED)
    }

    #[inline]
    pub const fn is_en_passant(self) -> bool {
        self.flags().contains(Flags::EN_PASSANT)
    }

    #[inline]
    pub const fn is_active(self) -> bool {
        self.flags().contains(Flags::ACTIVE)
    }

    #[inline]
    pub const fn is_captured(self) -> bool {
        self.flags().contains(Flags::CAPTURED)
    }

    #[must_use]
    #[inline]
    pub const fn with(self, flags: Flags) -> Piece {
        Piece(self.0 | flags.bits())
    }

    #[must_use]
    #[inline]
    pub const fn without(self, flags: Flags) -> Piece {
        Piece(self.0 & !flags.bits())
    }

    #[must_use]
    #[inline]
    pub const fn toggled(self, flags: Flags) -> Piece {
        Piece(self.0 ^ flags.bits())
    }

    /// The same piece on another square.
    #[must_use]
    #[inline]
    pub const fn with_square(self, square: Square) -> Piece {
        Piece((self.0 & !COORD_MASK) | square.bits())
    }

    /// Adds a direction to the coordinate fields. The result may be off
    /// the board.
    #[must_use]
    #[inline]
    pub const fn offset(self, delta: Delta) -> Piece {
        Piece(self.0.wrapping_add_signed(delta.bits()))
    }

    /// Index of the key tuple this piece hashes as, see [`key_tuples()`].
    pub fn key_index(self) -> Option<usize> {
        let kind = KeyKind::of(self)?;
        let file = self.file()?;
        let rank = self.rank()?;
        Some(
            ((kind as usize * 8 + usize::from(file)) * 8 + usize::from(rank)) * 2
                + usize::from(self.is_active()),
        )
    }
}

#[inline]
const fn in_window(coord: u16) -> bool {
    matches!(coord >> 2, 0b01 | 0b10)
}

impl From<Piece> for u16 {
    #[inline]
    fn from(piece: Piece) -> u16 {
        piece.0
    }
}

impl From<u16> for Piece {
    #[inline]
    fn from(bits: u16) -> Piece {
        Piece(bits)
    }
}

impl From<Fields> for Piece {
    #[inline]
    fn from(fields: Fields) -> Piece {
        fields.encode()
    }
}

impl fmt::Display for Piece {
    /// Role letter, uppercase for active pieces, followed by the square,
    /// e.g. `Ng1` or `pe7`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role() {
            Some(role) if self.is_active() => write!(f, "{}", role.upper_char())?,
            Some(role) => write!(f, "{}", role.char())?,
            None if self.is_movement() => f.write_str("*")?,
            None => f.write_str("?")?,
        }
        match self.square() {
            Some(square) => write!(f, "{square}"),
            None => f.write_str("--"),
        }
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Piece({:#06x} {}", self.0, self)?;
        for (name, _) in self.flags().iter_names() {
            write!(f, " {name}")?;
        }
        f.write_str(")")
    }
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for Piece {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Piece> {
        <u16 as arbitrary::Arbitrary>::arbitrary(u).map(Piece)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u16(self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Piece {
    fn deserialize<D>(deserializer: D) -> Result<Piece, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        u16::deserialize(deserializer).map(Piece)
    }
}

/// The piece states that get their own hash keys.
///
/// Only pawns distinguish en passant, and only rooks and kings distinguish
/// whether they have moved, as these are the flags that change which moves
/// are available.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum KeyKind {
    Pawn = 0,
    EnPassantPawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    MovedRook = 5,
    Queen = 6,
    King = 7,
    MovedKing = 8,
}

/// Number of key tuples: key kinds × files × ranks × active.
pub const KEY_COUNT: usize = KeyKind::ALL.len() * 8 * 8 * 2;

impl KeyKind {
    pub const ALL: [KeyKind; 9] = [
        KeyKind::Pawn,
        KeyKind::EnPassantPawn,
        KeyKind::Knight,
        KeyKind::Bishop,
        KeyKind::Rook,
        KeyKind::MovedRook,
        KeyKind::Queen,
        KeyKind::King,
        KeyKind::MovedKing,
    ];

    pub const fn role(self) -> Role {
        match self {
            KeyKind::Pawn | KeyKind::EnPassantPawn => Role::Pawn,
            KeyKind::Knight => Role::Knight,
            KeyKind::Bishop => Role::Bishop,
            KeyKind::Rook | KeyKind::MovedRook => Role::Rook,
            KeyKind::Queen => Role::Queen,
            KeyKind::King | KeyKind::MovedKing => Role::King,
        }
    }

    /// The type and flag bits of a representative piece.
    pub const fn bits(self) -> u16 {
        let flags = match self {
            KeyKind::EnPassantPawn => Flags::EN_PASSANT.union(Flags::MOVED),
            KeyKind::MovedRook | KeyKind::MovedKing => Flags::MOVED,
            _ => Flags::empty(),
        };
        self.role().bits() | flags.bits()
    }

    pub const fn of(piece: Piece) -> Option<KeyKind> {
        Some(match piece.role() {
            Some(Role::Pawn) if piece.is_en_passant() => KeyKind::EnPassantPawn,
            Some(Role::Pawn) => KeyKind::Pawn,
            Some(Role::Knight) => KeyKind::Knight,
            Some(Role::Bishop) => KeyKind::Bishop,
            Some(Role::Rook) if piece.is_moved() => KeyKind::MovedRook,
            Some(Role::Rook) => KeyKind::Rook,
            Some(Role::Queen) => KeyKind::Queen,
            Some(Role::King) if piece.is_moved() => KeyKind::MovedKing,
            Some(Role::King) => KeyKind::King,
            None => return None,
        })
    }
}

/// Enumerates every key tuple as a piece, key kind outermost, then file,
/// then rank, then inactive before active.
///
/// The order is stable, so a table built by zipping this enumeration with
/// a random stream can be regenerated exactly.
///
/// # Examples
///
/// ```
/// use chessbits::piece::{key_tuples, KEY_COUNT};
///
/// assert_eq!(key_tuples().count(), KEY_COUNT);
/// for (i, piece) in key_tuples().enumerate() {
///     assert_eq!(piece.key_index(), Some(i));
/// }
/// ```
pub fn key_tuples() -> impl Iterator<Item = Piece> {
    KeyKind::ALL.into_iter().flat_map(|kind| {
        File::ALL.into_iter().flat_map(move |file| {
            Rank::ALL.into_iter().flat_map(move |rank| {
                [false, true].into_iter().map(move |active| {
                    Piece(kind.bits() | file.bits() | rank.bits() | Field::Active.put(active as u16))
                })
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_layout() {
        let shifts: Vec<u32> = FIELDS.iter().map(|f| f.shift).collect();
        assert_eq!(shifts, [0, 1, 2, 3, 6, 10, 14, 15]);

        let mut covered = 0u16;
        for field in Field::ALL {
            assert_eq!(covered & field.mask(), 0, "{field:?} overlaps");
            covered |= field.mask();
        }
        assert_eq!(covered, u16::MAX);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_encode_decode() {
        for bits in 0..=u16::MAX {
            let piece = Piece(bits);
            let fields = piece.decode();
            assert_eq!(fields.encode(), piece);
            assert_eq!(fields.encode().decode(), fields);
        }
    }

    #[test]
    fn test_named_contributions() {
        let piece = Piece::new(Role::Queen, Square::D8, true).with(Flags::MOVED);
        let fields = piece.decode();
        assert!(fields.moved);
        assert!(!fields.en_passant);
        assert!(fields.active);
        assert_eq!(fields.kind, 4);
        assert_eq!(fields.x, 3 + 4);
        assert_eq!(fields.y, 7 + 4);
        assert!(!fields.captured);
        assert_eq!(
            piece.bits(),
            Flags::MOVED.bits() | Flags::ACTIVE.bits() | Role::Queen.bits() | Square::D8.bits()
        );
    }

    #[test]
    fn test_boundary_patterns() {
        let corner = Piece::new(Role::Rook, Square::A1, true);
        assert!(corner.is_on_board());
        assert!(!corner.offset(Delta::WEST).is_on_board());
        assert!(!corner.offset(Delta::SOUTH).is_on_board());
        assert!(!corner.offset(Delta::new(-2, -1)).is_on_board());
        assert_eq!(corner.offset(Delta::NORTH_EAST).square(), Some(Square::B2));

        let corner = Piece::new(Role::Rook, Square::H8, false);
        assert!(!corner.offset(Delta::EAST).is_on_board());
        assert!(!corner.offset(Delta::new(1, 2)).is_on_board());
        assert_eq!(corner.offset(Delta::SOUTH_WEST).square(), Some(Square::G7));

        // Stepping never leaks into the neighbouring fields.
        let stepped = corner.offset(Delta::new(2, 2));
        assert_eq!(stepped.role(), Some(Role::Rook));
        assert!(!stepped.is_captured());
        assert_eq!(stepped.file(), None);
        assert_eq!(stepped.rank(), None);
    }

    #[test]
    fn test_movement_sentinel() {
        let movement = Piece(Field::Kind.put(MOVEMENT_KIND) | Square::E4.bits());
        assert!(movement.is_movement());
        assert_eq!(movement.role(), None);
        assert_eq!(movement.to_string(), "*e4");
    }

    #[test]
    fn test_display() {
        assert_eq!(Piece::new(Role::Knight, Square::G1, true).to_string(), "Ng1");
        assert_eq!(Piece::new(Role::Pawn, Square::E7, false).to_string(), "pe7");
        assert_eq!(Piece(Role::King.bits()).to_string(), "k--");
    }

    #[test]
    fn test_key_tuples() {
        let tuples: Vec<Piece> = key_tuples().collect();
        assert_eq!(tuples.len(), KEY_COUNT);
        assert_eq!(tuples.iter().collect::<HashSet<_>>().len(), KEY_COUNT);
        assert_eq!(tuples[0], Piece::new(Role::Pawn, Square::A1, false));
        assert_eq!(tuples[1], Piece::new(Role::Pawn, Square::A1, true));
        assert_eq!(tuples[2], Piece::new(Role::Pawn, Square::A2, false));
        assert_eq!(
            tuples[KEY_COUNT - 1],
            Piece::new(Role::King, Square::H8, true).with(Flags::MOVED)
        );
    }

    #[test]
    fn test_key_index_ignores_irrelevant_flags() {
        let knight = Piece::new(Role::Knight, Square::B1, true);
        assert_eq!(knight.key_index(), knight.with(Flags::MOVED).key_index());

        let rook = Piece::new(Role::Rook, Square::H1, true);
        assert_ne!(rook.key_index(), rook.with(Flags::MOVED).key_index());

        assert_eq!(Piece(Role::Rook.bits()).key_index(), None);
    }
}
