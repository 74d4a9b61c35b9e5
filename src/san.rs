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

//! Read and write Standard Algebraic Notation.
//!
//! # Examples
//!
//! Name all moves of a position:
//!
//! ```
//! use chessbits::{san, Position};
//!
//! let pos = Position::standard();
//! let moves = pos.pseudo_legal_moves();
//! let table = san::encode_all(&moves);
//!
//! let names: Vec<String> = table.labels().iter().map(|san| san.to_string()).collect();
//! assert!(names.contains(&"Nf3".to_owned()));
//! assert!(names.contains(&"e4".to_owned()));
//! ```
//!
//! Parse a (possibly partial) SAN and resolve it:
//!
//! ```
//! use chessbits::{san::{MatchOutcome, SanQuery}, Position, Square};
//!
//! let pos = Position::standard();
//! let moves = pos.pseudo_legal_moves();
//!
//! let query: SanQuery = "Nf3".parse()?;
//! match query.match_moves(&moves) {
//!     MatchOutcome::Unique(m) => assert_eq!(m.orig(), Square::G1),
//!     other => panic!("expected unique match, got {other:?}"),
//! }
//!
//! // Any knight move at all is ambiguous.
//! let query: SanQuery = "N".parse()?;
//! assert!(matches!(query.match_moves(&moves), MatchOutcome::Ambiguous(ref c) if c.len() == 4));
//! # Ok::<_, chessbits::san::ParseSanError>(())
//! ```

use std::{collections::HashMap, error::Error, fmt, str::FromStr};

use tracing::debug;

use crate::{
    m::Move,
    role::Role,
    square::{File, Rank, Square},
};

/// Error when parsing a syntactically invalid SAN.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseSanError {
    position: usize,
    character: Option<char>,
}

impl ParseSanError {
    /// Byte offset of the offending character.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The offending character, or `None` if the input ended early.
    pub fn character(&self) -> Option<char> {
        self.character
    }
}

impl fmt::Display for ParseSanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.character {
            Some(ch) => write!(f, "invalid san: unexpected {ch:?} at {}", self.position),
            None => write!(f, "invalid san: unexpected end at {}", self.position),
        }
    }
}

impl Error for ParseSanError {}

/// `IllegalSan` or `AmbiguousSan`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SanError {
    /// Standard algebraic notation does not match a move.
    IllegalSan,
    /// Standard algebraic notation matches multiple moves.
    AmbiguousSan,
}

impl fmt::Display for SanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            SanError::IllegalSan => "illegal san",
            SanError::AmbiguousSan => "ambiguous san",
        })
    }
}

impl Error for SanError {}

/// A move in Standard Algebraic Notation, as written by [`encode_all()`].
///
/// `file` and `rank` are the disambiguating parts of the origin square.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct San {
    pub role: Role,
    pub file: Option<File>,
    pub rank: Option<Rank>,
    pub capture: bool,
    pub to: Square,
}

impl San {
    /// The most specific tier for this kind of move. Pawn pushes have a
    /// single tier, since no two pushes share a target. At the last tier
    /// of every other move the label names the full origin square.
    pub fn max_tier(m: &Move) -> u8 {
        match (m.role(), m.is_capture()) {
            (Role::Pawn, false) => 0,
            (Role::Pawn, true) => 1,
            _ => 3,
        }
    }

    /// Labels a move at a disambiguation tier.
    ///
    /// | Move | Tier 0 | Tier 1 | Tier 2 | Tier 3 |
    /// |---|---|---|---|---|
    /// | pawn push | `e4` | | | |
    /// | pawn capture | `exd5` | `e4xd5` | | |
    /// | other | `Nd2` | `N1d2` | `Nbd2` | `Nb1d2` |
    ///
    /// Tiers beyond [`San::max_tier()`] are clamped.
    pub fn at_tier(m: &Move, tier: u8) -> San {
        let file = Some(m.orig().file());
        let rank = Some(m.orig().rank());
        let (file, rank) = match (m.role(), m.is_capture(), tier) {
            (Role::Pawn, false, _) => (None, None),
            (Role::Pawn, true, 0) => (file, None),
            (Role::Pawn, true, _) => (file, rank),
            (_, _, 0) => (None, None),
            (_, _, 1) => (None, rank),
            (_, _, 2) => (file, None),
            (_, _, _) => (file, rank),
        };
        San {
            role: m.role(),
            file,
            rank,
            capture: m.is_capture(),
            to: m.dest(),
        }
    }

    /// The tier 0 label, without regard to other moves.
    pub fn from_move(m: &Move) -> San {
        San::at_tier(m, 0)
    }

    /// Test if the `San` describes the move. Unlike
    /// [`SanQuery::score()`], the capture marker must agree exactly.
    pub fn matches(&self, m: &Move) -> bool {
        self.role == m.role()
            && self.file.is_none_or(|f| f == m.orig().file())
            && self.rank.is_none_or(|r| r == m.orig().rank())
            && self.capture == m.is_capture()
            && self.to == m.dest()
    }

    fn append_to<W: fmt::Write>(&self, f: &mut W) -> fmt::Result {
        if self.role != Role::Pawn {
            f.write_char(self.role.upper_char())?;
        }
        if let Some(file) = self.file {
            f.write_char(file.char())?;
        }
        if let Some(rank) = self.rank {
            f.write_char(rank.char())?;
        }
        if self.capture {
            f.write_char('x')?;
        }
        write!(f, "{}", self.to)
    }
}

impl fmt::Display for San {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.append_to(f)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for San {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Longest: Na1xa1
        let mut s = arrayvec::ArrayString::<6>::new();
        let _ = self.append_to(&mut s);
        serializer.serialize_str(&s)
    }
}

/// Labels for a list of moves, unique within the list.
///
/// Created by [`encode_all()`].
#[derive(Clone, Debug)]
pub struct SanTable<'a> {
    moves: &'a [Move],
    labels: Vec<San>,
    lookup: HashMap<San, usize>,
}

impl<'a> SanTable<'a> {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in the order of the moves.
    pub fn labels(&self) -> &[San] {
        &self.labels
    }

    /// The label of the move at `index` in the list.
    pub fn label(&self, index: usize) -> Option<San> {
        self.labels.get(index).copied()
    }

    /// The move with exactly this label.
    pub fn get(&self, san: &San) -> Option<&'a Move> {
        self.lookup.get(san).map(|&i| &self.moves[i])
    }

    /// The move with exactly this label, given as text. A check or
    /// checkmate suffix is ignored.
    pub fn get_str(&self, san: &str) -> Option<&'a Move> {
        san.parse::<SanQuery>()
            .ok()
            .and_then(|query| query.to_san())
            .and_then(|san| self.get(&san))
    }

    pub fn iter(&self) -> impl Iterator<Item = (San, &'a Move)> + '_ {
        self.labels.iter().copied().zip(self.moves.iter())
    }
}

/// Labels every move, adding origin information until all labels are
/// distinct.
///
/// Each move starts at tier 0 (see [`San::at_tier()`]). In every round, all
/// moves whose current label equals the label of some other move are raised
/// by one tier together. The rounds stop when no label is shared, or when
/// none of the colliding moves can be raised further. Since the last tier
/// of every move that can collide names its origin square, the result maps
/// labels to moves one to one.
///
/// A label is only guaranteed to be unique as a whole. Read back as a
/// [`SanQuery`] it may fit several moves equally well: `Nbd2` also
/// describes a knight on b3 that is labeled `N3d2`. Use
/// [`SanTable::get()`] to look up exact labels.
///
/// # Examples
///
/// ```
/// use chessbits::{san, Position};
///
/// let pos = Position::standard();
/// let moves = pos.pseudo_legal_moves();
/// let table = san::encode_all(&moves);
/// assert_eq!(table.len(), moves.len());
///
/// let m = table.get_str("Nc3").expect("knight move");
/// assert_eq!(m.to_string(), "Nb1-c3");
/// ```
pub fn encode_all(moves: &[Move]) -> SanTable<'_> {
    // Only moves with the same role and target can share a label.
    let mut candidates: HashMap<(Role, Square), Vec<usize>> = HashMap::new();
    for (i, m) in moves.iter().enumerate() {
        candidates.entry((m.role(), m.dest())).or_default().push(i);
    }

    let mut tiers = vec![0u8; moves.len()];
    let mut labels: Vec<San> = moves.iter().map(San::from_move).collect();

    for round in 1.. {
        let mut colliding = Vec::new();
        for group in candidates.values().filter(|group| group.len() > 1) {
            for &i in group {
                if group.iter().any(|&j| j != i && labels[j] == labels[i]) {
                    colliding.push(i);
                }
            }
        }

        let mut escalated = 0;
        for i in colliding {
            if tiers[i] < San::max_tier(&moves[i]) {
                tiers[i] += 1;
                labels[i] = San::at_tier(&moves[i], tiers[i]);
                escalated += 1;
            }
        }
        if escalated == 0 {
            break;
        }
        debug!(round, escalated, "disambiguated colliding san");
    }

    let lookup = labels
        .iter()
        .enumerate()
        .map(|(i, &san)| (san, i))
        .collect();

    SanTable {
        moves,
        labels,
        lookup,
    }
}

/// A partial move description, parsed from a SAN or a prefix of one.
///
/// Every component except the role is optional. The capture marker only
/// restricts matching when present.
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SanQuery {
    pub role: Role,
    pub file: Option<File>,
    pub rank: Option<Rank>,
    pub capture: bool,
    pub to_file: Option<File>,
    pub to_rank: Option<Rank>,
    pub promotion: Option<Role>,
}

/// Result of resolving a [`SanQuery`] against a list of moves.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MatchOutcome<'a> {
    /// Exactly one move has the highest score.
    Unique(&'a Move),
    /// Several moves share the highest score.
    Ambiguous(Vec<&'a Move>),
    /// No move is compatible with the query.
    NoMatch,
}

impl SanQuery {
    /// Parses a SAN fragment. Ignores a possible check or checkmate
    /// suffix.
    ///
    /// A single group of coordinates that is not followed by `x` or by
    /// another group is the target. The promotion piece may be written
    /// with or without `=`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseSanError`] at the first byte that does not fit the
    /// grammar.
    ///
    /// # Examples
    ///
    /// ```
    /// use chessbits::{san::SanQuery, File, Rank, Role};
    ///
    /// let query = SanQuery::from_ascii(b"Naxa4")?;
    /// assert_eq!(query.role, Role::Knight);
    /// assert_eq!(query.file, Some(File::A));
    /// assert_eq!(query.rank, None);
    /// assert!(query.capture);
    /// assert_eq!((query.to_file, query.to_rank), (Some(File::A), Some(Rank::Fourth)));
    ///
    /// let err = SanQuery::from_ascii(b"Nf3?").unwrap_err();
    /// assert_eq!((err.position(), err.character()), (3, Some('?')));
    /// # Ok::<_, chessbits::san::ParseSanError>(())
    /// ```
    pub fn from_ascii(ascii: &[u8]) -> Result<SanQuery, ParseSanError> {
        let mut reader = Reader::new(ascii);
        let query = reader.read_query()?;
        let _ = reader.eat(b'+') || reader.eat(b'#');
        match reader.peek() {
            None => Ok(query),
            Some(_) => Err(reader.unexpected()),
        }
    }

    /// The complete label this query spells, if it names a target square
    /// and no promotion.
    pub fn to_san(&self) -> Option<San> {
        match (self.to_file, self.to_rank, self.promotion) {
            (Some(file), Some(rank), None) => Some(San {
                role: self.role,
                file: self.file,
                rank: self.rank,
                capture: self.capture,
                to: Square::from_coords(file, rank),
            }),
            _ => None,
        }
    }

    /// Scores a move, or returns `None` if the move is incompatible.
    ///
    /// The role must be equal and every present coordinate must agree.
    /// A capture marker requires a capture, and a promotion never matches,
    /// since promotions are not generated. The score counts the present
    /// components: coordinates and the capture marker. A move that agrees
    /// with a query only by not being a capture gains nothing.
    pub fn score(&self, m: &Move) -> Option<u32> {
        if self.role != m.role() || self.promotion.is_some() || (self.capture && !m.is_capture())
        {
            return None;
        }

        let coords = [
            self.file.map(|f| f == m.orig().file()),
            self.rank.map(|r| r == m.orig().rank()),
            self.to_file.map(|f| f == m.dest().file()),
            self.to_rank.map(|r| r == m.dest().rank()),
        ];
        if coords.contains(&Some(false)) {
            return None;
        }

        let matched = coords.iter().filter(|c| **c == Some(true)).count() as u32;
        Some(matched + u32::from(self.capture))
    }

    /// Finds the best scoring moves. Ties are reported, never broken
    /// arbitrarily.
    pub fn match_moves<'a>(&self, moves: &'a [Move]) -> MatchOutcome<'a> {
        let mut best = Vec::new();
        let mut best_score = 0;
        for m in moves {
            let Some(score) = self.score(m) else {
                continue;
            };
            if best.is_empty() || score > best_score {
                best.clear();
                best.push(m);
                best_score = score;
            } else if score == best_score {
                best.push(m);
            }
        }

        match best.len() {
            0 => MatchOutcome::NoMatch,
            1 => MatchOutcome::Unique(best[0]),
            _ => MatchOutcome::Ambiguous(best),
        }
    }

    /// Searches a list of moves for the unique best match.
    ///
    /// # Errors
    ///
    /// Returns [`SanError`] if there is no unique best match.
    pub fn find_move<'a>(&self, moves: &'a [Move]) -> Result<&'a Move, SanError> {
        match self.match_moves(moves) {
            MatchOutcome::Unique(m) => Ok(m),
            MatchOutcome::Ambiguous(_) => Err(SanError::AmbiguousSan),
            MatchOutcome::NoMatch => Err(SanError::IllegalSan),
        }
    }

    fn append_to<W: fmt::Write>(&self, f: &mut W) -> fmt::Result {
        if self.role != Role::Pawn {
            f.write_char(self.role.upper_char())?;
        }
        if let Some(file) = self.file {
            f.write_char(file.char())?;
        }
        if let Some(rank) = self.rank {
            f.write_char(rank.char())?;
        }
        if self.capture {
            f.write_char('x')?;
        }
        if let Some(file) = self.to_file {
            f.write_char(file.char())?;
        }
        if let Some(rank) = self.to_rank {
            f.write_char(rank.char())?;
        }
        if let Some(promotion) = self.promotion {
            f.write_char('=')?;
            f.write_char(promotion.upper_char())?;
        }
        Ok(())
    }
}

impl From<San> for SanQuery {
    fn from(san: San) -> SanQuery {
        SanQuery {
            role: san.role,
            file: san.file,
            rank: san.rank,
            capture: san.capture,
            to_file: Some(san.to.file()),
            to_rank: Some(san.to.rank()),
            promotion: None,
        }
    }
}

impl FromStr for SanQuery {
    type Err = ParseSanError;

    fn from_str(san: &str) -> Result<SanQuery, ParseSanError> {
        SanQuery::from_ascii(san.as_bytes())
    }
}

impl fmt::Display for SanQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.append_to(f)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SanQuery {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Longest: Na1xa1=Q
        let mut s = arrayvec::ArrayString::<8>::new();
        let _ = self.append_to(&mut s);
        serializer.serialize_str(&s)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SanQuery {
    fn deserialize<D>(deserializer: D) -> Result<SanQuery, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SanQueryVisitor;

        impl serde::de::Visitor<'_> for SanQueryVisitor {
            type Value = SanQuery;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("SAN string")
            }

            fn visit_str<E>(self, value: &str) -> Result<SanQuery, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(SanQueryVisitor)
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    len: usize,
}

impl Reader<'_> {
    #[inline]
    fn new(bytes: &[u8]) -> Reader<'_> {
        Reader {
            bytes,
            len: bytes.len(),
        }
    }

    #[inline]
    fn position(&self) -> usize {
        self.len - self.bytes.len()
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.first().copied()
    }

    #[inline]
    fn bump(&mut self) {
        self.bytes = &self.bytes[1..];
    }

    #[inline]
    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> ParseSanError {
        let character = self.peek().map(|byte| {
            self.bytes
                .utf8_chunks()
                .next()
                .and_then(|chunk| chunk.valid().chars().next())
                .unwrap_or(char::from(byte))
        });
        ParseSanError {
            position: self.position(),
            character,
        }
    }

    fn read_role(&mut self) -> Role {
        let role = match self.peek() {
            Some(b'N') => Role::Knight,
            Some(b'B') => Role::Bishop,
            Some(b'R') => Role::Rook,
            Some(b'Q') => Role::Queen,
            Some(b'K') => Role::King,
            Some(b'P') => Role::Pawn,
            _ => return Role::Pawn,
        };
        self.bump();
        role
    }

    fn read_promotion(&mut self) -> Option<Role> {
        let role = match self.peek()? {
            b'N' => Role::Knight,
            b'B' => Role::Bishop,
            b'R' => Role::Rook,
            b'Q' => Role::Queen,
            _ => return None,
        };
        self.bump();
        Some(role)
    }

    fn read_coords(&mut self) -> (Option<File>, Option<Rank>) {
        let file = self.peek().and_then(|ch| File::from_char(char::from(ch)));
        if file.is_some() {
            self.bump();
        }
        let rank = self.peek().and_then(|ch| Rank::from_char(char::from(ch)));
        if rank.is_some() {
            self.bump();
        }
        (file, rank)
    }

    fn read_query(&mut self) -> Result<SanQuery, ParseSanError> {
        let role = self.read_role();
        let (file, rank) = self.read_coords();
        let capture = self.eat(b'x');
        let (to_file, to_rank) = self.read_coords();

        let (file, rank, to_file, to_rank) =
            if capture || to_file.is_some() || to_rank.is_some() {
                (file, rank, to_file, to_rank)
            } else {
                (None, None, file, rank)
            };

        let promotion = if self.eat(b'=') {
            match self.read_promotion() {
                Some(role) => Some(role),
                None => return Err(self.unexpected()),
            }
        } else {
            self.read_promotion()
        };

        Ok(SanQuery {
            role,
            file,
            rank,
            capture,
            to_file,
            to_rank,
            promotion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{movegen, Color, Piece, Position};

    fn position(pieces: &[(Role, Square, bool)], turn: Color) -> Position {
        Position::new(
            pieces
                .iter()
                .map(|&(role, square, active)| Piece::new(role, square, active)),
            turn,
        )
        .expect("valid position")
    }

    fn label_of(table: &SanTable<'_>, orig: Square, dest: Square) -> String {
        table
            .iter()
            .find(|(_, m)| m.orig() == orig && m.dest() == dest)
            .map(|(san, _)| san.to_string())
            .expect("move exists")
    }

    fn assert_labels_resolve(moves: &[Move]) {
        let table = encode_all(moves);
        assert_eq!(table.len(), moves.len());
        assert_eq!(
            table.labels().iter().collect::<std::collections::HashSet<_>>().len(),
            moves.len(),
            "labels not unique"
        );
        for (san, m) in table.iter() {
            let text = san.to_string();
            assert!(san.matches(m), "{text}");
            assert_eq!(table.get(&san), Some(m), "{text}");
            assert_eq!(table.get_str(&text), Some(m), "{text}");
        }
    }

    #[test]
    fn test_read_write() {
        for san in [
            "e4", "exd5", "Nf3", "Nbd2", "N1d2", "Nb1d2", "Na1xb3", "e2e4", "e4xd5", "b8=Q",
            "Rb6xb8", "Naxa4", "Kxe2", "N", "Nf", "Nx", "xd5", "ex", "1", "",
        ] {
            let result = san.parse::<SanQuery>().expect("valid san").to_string();
            assert_eq!(san, result, "read {san} write {result}");
        }
    }

    #[test]
    fn test_lax_forms() {
        let query = "b7Q".parse::<SanQuery>().expect("promotion without =");
        assert_eq!(query.role, Role::Pawn);
        assert_eq!(query.to_file, Some(File::B));
        assert_eq!(query.to_rank, Some(Rank::Seventh));
        assert_eq!(query.promotion, Some(Role::Queen));
        assert_eq!(query.to_string(), "b7=Q");

        assert_eq!("Pe4".parse::<SanQuery>().map(|q| q.to_string()), Ok("e4".to_owned()));
        assert_eq!("Nf3+".parse::<SanQuery>().map(|q| q.to_string()), Ok("Nf3".to_owned()));
        assert_eq!("Qh7#".parse::<SanQuery>().map(|q| q.to_string()), Ok("Qh7".to_owned()));
    }

    #[test]
    fn test_parse_origin_and_target() {
        let query = "Rb6xb8".parse::<SanQuery>().expect("valid san");
        assert_eq!(query.role, Role::Rook);
        assert_eq!((query.file, query.rank), (Some(File::B), Some(Rank::Sixth)));
        assert!(query.capture);
        assert_eq!((query.to_file, query.to_rank), (Some(File::B), Some(Rank::Eighth)));

        let query = "Nf".parse::<SanQuery>().expect("partial san");
        assert_eq!((query.file, query.to_file), (None, Some(File::F)));

        let query = "Nbx".parse::<SanQuery>().expect("partial san");
        assert_eq!((query.file, query.to_file), (Some(File::B), None));
        assert!(query.capture);
    }

    #[test]
    fn test_parse_errors() {
        let err = |s: &str| {
            let err = s.parse::<SanQuery>().expect_err("invalid san");
            (err.position(), err.character())
        };
        assert_eq!(err("e4!"), (2, Some('!')));
        assert_eq!(err("e9"), (1, Some('9')));
        assert_eq!(err("Zf3"), (0, Some('Z')));
        assert_eq!(err("xx"), (1, Some('x')));
        assert_eq!(err("b8="), (3, None));
        assert_eq!(err("b8=K"), (3, Some('K')));
        assert_eq!(err("e4++"), (3, Some('+')));
        assert_eq!(err("é"), (0, Some('é')));
        assert_eq!(err("Nf3é"), (3, Some('é')));
        assert_eq!(err("e4♔"), (2, Some('♔')));
    }

    #[test]
    fn test_parse_error_invalid_utf8() {
        let err = SanQuery::from_ascii(b"e4\xff").expect_err("invalid san");
        assert_eq!((err.position(), err.character()), (2, Some('\u{ff}')));
    }

    #[test]
    fn test_standard_labels() {
        let pos = Position::standard();
        let moves = movegen::generate(&pos);
        let table = encode_all(&moves);
        let mut labels: Vec<String> = table.labels().iter().map(|s| s.to_string()).collect();
        labels.sort();
        assert_eq!(
            labels,
            [
                "Na3", "Nc3", "Nf3", "Nh3", "a3", "a4", "b3", "b4", "c3", "c4", "d3", "d4", "e3",
                "e4", "f3", "f4", "g3", "g4", "h3", "h4"
            ]
        );
        assert_labels_resolve(&moves);
    }

    #[test]
    fn test_pawn_initial_push() {
        let pos = position(&[(Role::Pawn, Square::E2, true)], Color::White);
        let moves = movegen::generate(&pos);
        assert_eq!(moves.len(), 2);

        let table = encode_all(&moves);
        assert_eq!(label_of(&table, Square::E2, Square::E3), "e3");
        assert_eq!(label_of(&table, Square::E2, Square::E4), "e4");
        for m in &moves {
            assert_eq!(San::max_tier(m), 0);
            assert_eq!(San::at_tier(m, 3), San::from_move(m));
        }

        let query: SanQuery = "e4".parse().expect("valid san");
        match query.match_moves(&moves) {
            MatchOutcome::Unique(m) => assert!(m.is_double_push()),
            other => panic!("expected unique match, got {other:?}"),
        }
    }

    #[test]
    fn test_rank_before_file() {
        let pos = position(
            &[
                (Role::Rook, Square::A1, true),
                (Role::Rook, Square::A5, true),
                (Role::Rook, Square::H3, true),
            ],
            Color::White,
        );
        let moves = movegen::generate(&pos);
        let table = encode_all(&moves);
        assert_eq!(label_of(&table, Square::A1, Square::A3), "R1a3");
        assert_eq!(label_of(&table, Square::A5, Square::A3), "R5a3");
        assert_eq!(label_of(&table, Square::H3, Square::A3), "R3a3");
        assert_eq!(label_of(&table, Square::A1, Square::B1), "Rb1");
        assert_labels_resolve(&moves);
    }

    #[test]
    fn test_file_when_rank_collides() {
        let pos = position(
            &[(Role::Rook, Square::A1, true), (Role::Rook, Square::H1, true)],
            Color::White,
        );
        let moves = movegen::generate(&pos);
        let table = encode_all(&moves);
        assert_eq!(label_of(&table, Square::A1, Square::D1), "Rad1");
        assert_eq!(label_of(&table, Square::H1, Square::D1), "Rhd1");
        assert_eq!(label_of(&table, Square::A1, Square::A8), "Ra8");
        assert_labels_resolve(&moves);
    }

    #[test]
    fn test_full_square_when_needed() {
        let pos = position(
            &[
                (Role::Knight, Square::B1, true),
                (Role::Knight, Square::B3, true),
                (Role::Knight, Square::F1, true),
            ],
            Color::White,
        );
        let moves = movegen::generate(&pos);
        let table = encode_all(&moves);
        assert_eq!(label_of(&table, Square::B1, Square::D2), "Nbd2");
        assert_eq!(label_of(&table, Square::B3, Square::D2), "N3d2");
        assert_eq!(label_of(&table, Square::F1, Square::D2), "Nfd2");
        assert_labels_resolve(&moves);

        // Labels are exact, even where the partial reading is not.
        let nbd2 = table.get_str("Nbd2").expect("labeled");
        assert_eq!(nbd2.orig(), Square::B1);

        let query: SanQuery = "Nd2".parse().expect("valid san");
        assert!(matches!(query.match_moves(&moves), MatchOutcome::Ambiguous(ref c) if c.len() == 3));
        assert_eq!(query.find_move(&moves), Err(SanError::AmbiguousSan));

        // Nbd2 fits both knights on the b-file equally well.
        let query: SanQuery = "Nbd2".parse().expect("valid san");
        assert!(matches!(query.match_moves(&moves), MatchOutcome::Ambiguous(ref c) if c.len() == 2));
    }

    #[test]
    fn test_pawn_captures() {
        let pos = position(
            &[
                (Role::Pawn, Square::C4, true),
                (Role::Pawn, Square::E4, true),
                (Role::Knight, Square::D5, false),
            ],
            Color::White,
        );
        let moves = movegen::generate(&pos);
        let table = encode_all(&moves);
        assert_eq!(label_of(&table, Square::C4, Square::D5), "cxd5");
        assert_eq!(label_of(&table, Square::E4, Square::D5), "exd5");
        assert_labels_resolve(&moves);

        let query: SanQuery = "xd5".parse().expect("valid san");
        assert!(matches!(query.match_moves(&moves), MatchOutcome::Ambiguous(_)));
    }

    #[test]
    fn test_match_rejections() {
        let pos = Position::standard();
        let moves = movegen::generate(&pos);
        for san in ["Nxf3", "Nd4", "Ke2", "e5", "b8=Q", "a3Q", "Qd1"] {
            let query: SanQuery = san.parse().expect("valid san");
            assert_eq!(query.match_moves(&moves), MatchOutcome::NoMatch, "{san}");
            assert_eq!(query.find_move(&moves), Err(SanError::IllegalSan), "{san}");
        }
    }

    #[test]
    fn test_capture_marker_scoring() {
        let pos = position(
            &[
                (Role::Pawn, Square::E2, true),
                (Role::Pawn, Square::D3, true),
                (Role::Knight, Square::E4, false),
            ],
            Color::White,
        );
        let moves = movegen::generate(&pos);

        // Both e2-e3 and d3xe4 go to the e-file. Not being a capture is
        // no evidence for the push.
        let query: SanQuery = "e".parse().expect("partial san");
        let score_to = |dest: Square| {
            let m = moves.iter().find(|m| m.dest() == dest).expect("move exists");
            query.score(m)
        };
        assert_eq!(score_to(Square::E3), Some(1));
        assert_eq!(score_to(Square::E4), Some(1));
        assert_eq!(score_to(Square::D4), None);
        match query.match_moves(&moves) {
            MatchOutcome::Ambiguous(candidates) => {
                let mut dests: Vec<Square> = candidates.iter().map(|m| m.dest()).collect();
                dests.sort();
                assert_eq!(dests, [Square::E3, Square::E4]);
            }
            other => panic!("expected ambiguous match, got {other:?}"),
        }
        assert_eq!(query.find_move(&moves), Err(SanError::AmbiguousSan));

        let query: SanQuery = "xe".parse().expect("partial san");
        let m = query.find_move(&moves).expect("unique");
        assert_eq!(m.dest(), Square::E4);
        assert!(m.is_capture());

        // With a full target square the capture is the only candidate.
        let query: SanQuery = "e4".parse().expect("valid san");
        let m = query.find_move(&moves).expect("unique");
        assert_eq!(m.orig(), Square::D3);
    }
}
