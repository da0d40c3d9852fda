#![no_main]

use article_views::BitVector;
use libfuzzer_sys::fuzz_target;
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let split_index = wyhash(data, 0) as usize % data.len();
    let (first_half, second_half) = data.split_at(split_index);

    let first = BitVector::from_bytes(first_half.to_vec());
    let second = BitVector::from_bytes(second_half.to_vec());

    let mut forward = first.clone();
    forward.union_with(second.as_bytes());
    let mut backward = second.clone();
    backward.union_with(first.as_bytes());

    assert_eq!(forward, backward);
    assert_eq!(forward.len(), first.len().max(second.len()));
    assert!(forward.count_ones() >= first.count_ones().max(second.count_ones()));
    assert!(forward.count_ones() <= first.count_ones() + second.count_ones());

    let mut again = forward.clone();
    again.union_with(second.as_bytes());
    assert_eq!(again, forward);
    assert_eq!(forward.iter_ones().count(), forward.count_ones());
});
