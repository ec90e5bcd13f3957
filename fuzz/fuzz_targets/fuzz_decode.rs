#![no_main]
use libfuzzer_sys::fuzz_target;
use snaptile::{IRect, Image};

fuzz_target!(|data: &[u8]| {
    // Full decode of arbitrary bytes must never panic
    let _ = Image::decode(data, enough::Unstoppable);

    // Neither may subset decode, for in-bounds and out-of-bounds windows
    let _ = Image::decode_subset(data, IRect::from_xywh(0, 0, 1, 1), enough::Unstoppable);
    let _ = Image::decode_subset(data, IRect::from_xywh(3, 3, 10, 10), enough::Unstoppable);
    let _ = Image::decode_subset(data, IRect::from_xywh(-5, -5, 64, 64), enough::Unstoppable);
});
