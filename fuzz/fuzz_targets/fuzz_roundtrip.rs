#![no_main]
use libfuzzer_sys::fuzz_target;
use snaptile::{Image, Unstoppable};

fuzz_target!(|data: &[u8]| {
    // If the input decodes, re-encoding and decoding again must produce
    // identical pixels and dimensions
    let Ok(decoded) = Image::decode(data, Unstoppable) else {
        return;
    };

    let reencoded = decoded.encode(Unstoppable).expect("decoded image must re-encode");
    let redecoded = Image::decode(&reencoded, Unstoppable).expect("re-encoded stream must decode");

    assert_eq!(decoded.width(), redecoded.width());
    assert_eq!(decoded.height(), redecoded.height());
    assert_eq!(decoded.pixels(), redecoded.pixels());
});
