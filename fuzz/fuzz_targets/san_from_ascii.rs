#![no_main]

use libfuzzer_sys::fuzz_target;
use chessbits::san::SanQuery;

fuzz_target!(|data: &[u8]| {
    let Ok(query) = SanQuery::from_ascii(data) else {
        return;
    };
    let roundtripped = SanQuery::from_ascii(query.to_string().as_bytes()).expect("roundtrip");
    assert_eq!(query, roundtripped);
});
