#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use chessbits::{
    san::{self, SanQuery},
    Color, Piece, Position,
};

#[derive(Debug, Arbitrary)]
struct Data {
    pieces: Vec<Piece>,
    turn: Color,
}

fuzz_target!(|data: Data| {
    let Ok(pos) = Position::new(data.pieces, data.turn) else {
        return;
    };
    let moves = pos.pseudo_legal_moves();
    let table = san::encode_all(&moves);
    let texts: HashSet<String> = table.labels().iter().map(|san| san.to_string()).collect();
    assert_eq!(texts.len(), moves.len());
    for (label, m) in table.iter() {
        let text = label.to_string();
        let query = SanQuery::from_ascii(text.as_bytes()).expect("label parses");
        assert_eq!(query.to_san(), Some(label));
        assert_eq!(table.get_str(&text), Some(m));
    }
});
