#![no_main]

use libfuzzer_sys::fuzz_target;
use chessbits::{Flags, Piece};

fuzz_target!(|piece: Piece| {
    assert_eq!(piece.decode().encode(), piece);
    if let (Some(role), Some(square)) = (piece.role(), piece.square()) {
        assert_eq!(
            Piece::new(role, square, piece.is_active()),
            piece.without(Flags::MOVED | Flags::EN_PASSANT | Flags::CAPTURED | Flags::UNUSED)
        );
    }
});
