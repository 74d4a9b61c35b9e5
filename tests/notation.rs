use std::collections::HashSet;

use chessbits::{
    fen::Fen,
    san::{self, MatchOutcome, SanError, SanQuery},
    Move, Position, Square,
};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

#[serde_as]
#[derive(Deserialize)]
struct Record {
    #[serde_as(as = "DisplayFromStr")]
    fen: Fen,
    #[serde_as(as = "DisplayFromStr")]
    san: SanQuery,
    expected: String,
}

#[test]
fn test_notation_reference() {
    let mut reader = csv::Reader::from_path("tests/notation.csv").expect("reader");

    for (i, record) in reader.deserialize().enumerate() {
        let record: Record = record.expect("record");

        let pos = record.fen.into_position().expect("valid position");
        let moves = pos.pseudo_legal_moves();

        let result = match record.san.find_move(&moves) {
            Ok(m) => m.to_string(),
            Err(SanError::AmbiguousSan) => "ambiguous".to_owned(),
            Err(SanError::IllegalSan) => "illegal".to_owned(),
        };
        assert_eq!(result, record.expected, "line {}", i + 2);
    }
}

fn assert_bijection(pos: &Position) {
    let moves = pos.pseudo_legal_moves();
    let table = san::encode_all(&moves);

    let distinct: HashSet<_> = table.labels().iter().collect();
    assert_eq!(distinct.len(), moves.len());

    let texts: HashSet<String> = table.labels().iter().map(|san| san.to_string()).collect();
    assert_eq!(texts.len(), moves.len());

    for (label, m) in table.iter() {
        let text = label.to_string();
        assert_eq!(table.get_str(&text), Some(m), "{text}");
    }
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_labels_are_distinct() {
    for fen in [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "k7/8/8/8/4Q2Q/8/8/K6Q w - - 0 1",
    ] {
        let pos = fen
            .parse::<Fen>()
            .expect("valid fen")
            .into_position()
            .expect("valid position");
        assert_bijection(&pos);
        for m in pos.pseudo_legal_moves() {
            assert_bijection(m.position());
        }
    }
}

#[test]
fn test_full_square_disambiguation() {
    let pos = "k7/8/8/8/4Q2Q/8/8/K6Q w - - 0 1"
        .parse::<Fen>()
        .expect("valid fen")
        .into_position()
        .expect("valid position");
    let moves = pos.pseudo_legal_moves();
    let table = san::encode_all(&moves);

    let label = |orig: Square, dest: Square| {
        table
            .iter()
            .find(|(_, m)| m.orig() == orig && m.dest() == dest)
            .map(|(san, _)| san.to_string())
            .expect("move exists")
    };
    assert_eq!(label(Square::E4, Square::E1), "Qee1");
    assert_eq!(label(Square::H4, Square::E1), "Qhe1");
    assert_eq!(label(Square::H1, Square::E1), "Q1e1");
    assert_eq!(label(Square::A1, Square::B1), "Kb1");

    // Qhe1 is exact as a label but fits both queens on the h-file as a
    // query.
    assert_eq!(table.get_str("Qhe1").map(|m| m.orig()), Some(Square::H4));
    let query: SanQuery = "Qhe1".parse().expect("valid san");
    assert!(matches!(query.match_moves(&moves), MatchOutcome::Ambiguous(ref c) if c.len() == 2));
}

#[test]
fn test_knight_labels() {
    let pos = "8/8/8/8/8/1N6/8/1N3N2 w - - 0 1"
        .parse::<Fen>()
        .expect("valid fen")
        .into_position()
        .expect("valid position");
    let moves = pos.pseudo_legal_moves();
    let table = san::encode_all(&moves);

    for (text, orig) in [("Nbd2", Square::B1), ("N3d2", Square::B3), ("Nfd2", Square::F1)] {
        let m = table.get_str(text).unwrap_or_else(|| panic!("no move labeled {text}"));
        assert_eq!((m.orig(), m.dest()), (orig, Square::D2));
    }
    assert_eq!(table.get_str("Nb1d2"), None);
}

fn play(pos: &Position, san: &str) -> Move {
    let moves = pos.pseudo_legal_moves();
    let table = san::encode_all(&moves);
    table
        .get_str(san)
        .cloned()
        .unwrap_or_else(|| panic!("no move labeled {san}"))
}

#[test]
fn test_en_passant_lifecycle() {
    let start = "4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1"
        .parse::<Fen>()
        .expect("valid fen")
        .into_position()
        .expect("valid position");

    let push = play(&start, "d5");
    assert!(push.is_double_push());
    let pawn = push.position().piece_at(Square::D5).expect("pushed pawn");
    assert!(pawn.is_en_passant());
    assert!(pawn.is_moved());
    assert!(!pawn.is_active());

    // Capturable en passant on the very next ply.
    let capture = play(push.position(), "exd6");
    assert!(capture.is_en_passant());
    assert_eq!(capture.capture(), Some(pawn));
    assert_eq!(capture.position().piece_at(Square::D5), None);
    assert_eq!(capture.position().pieces().len(), 3);

    // After any other move the right is gone.
    let waited = play(push.position(), "Kd2");
    assert!(waited
        .position()
        .pieces()
        .iter()
        .all(|p| !p.is_en_passant()));
    let later = play(waited.position(), "Ke7");
    assert!(later
        .position()
        .pseudo_legal_moves()
        .iter()
        .all(|m| !m.is_en_passant()));
}

#[test]
fn test_pawn_push_labels() {
    let pos = "8/8/8/8/8/8/4P3/8 w - - 0 1"
        .parse::<Fen>()
        .expect("valid fen")
        .into_position()
        .expect("valid position");
    let moves = pos.pseudo_legal_moves();
    let table = san::encode_all(&moves);
    let labels: Vec<String> = table.labels().iter().map(|s| s.to_string()).collect();
    assert_eq!(labels, ["e3", "e4"]);

    let query: SanQuery = "e4".parse().expect("valid san");
    assert!(matches!(
        query.match_moves(&moves),
        MatchOutcome::Unique(m) if m.is_double_push()
    ));
}
