#![no_main]

use article_views::{BitVector, DocumentRanking};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut bits) = serde_json::from_slice::<BitVector>(data) {
        bits.set(1);
        assert!(bits.count_ones() > 0);
    }
    if let Ok(ranking) = serde_json::from_slice::<DocumentRanking>(data) {
        assert!(ranking.iter().all(|(_, count)| count > 0));
    }
});
