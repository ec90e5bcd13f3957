use enough::{Stop, StopReason, Unstoppable};
use snaptile::*;

/// A token that is already stopped; codec loops must bail out promptly.
struct AlreadyStopped;

impl Stop for AlreadyStopped {
    fn check(&self) -> Result<(), StopReason> {
        Err(StopReason::Cancelled)
    }
}

/// White canvas with a black filled rectangle, the reference content used
/// throughout the round-trip checks.
fn reference_surface(w: u32, h: u32, rect: IRect) -> Surface {
    let mut surface = Surface::new_raster(w, h, AlphaMode::Opaque).unwrap();
    surface.clear(Color::WHITE);
    surface.draw_rect(rect, Color::BLACK);
    surface
}

fn noise_image(w: u32, h: u32, alpha: AlphaMode) -> Image {
    let mut pixels = vec![0u8; (w * h * 4) as usize];
    let mut state: u32 = 0xDEAD_BEEF;
    for px in pixels.chunks_exact_mut(4) {
        for c in px.iter_mut() {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            *c = state as u8;
        }
        match alpha {
            AlphaMode::Opaque => px[3] = 255,
            // keep premultiplied invariant: color <= alpha
            AlphaMode::Premultiplied => {
                for c in 0..3 {
                    px[c] = px[c].min(px[3]);
                }
            }
        }
    }
    Image::from_pixels(pixels, w, h, alpha).unwrap()
}

#[test]
fn encode_decode_roundtrip() {
    let mut surface = reference_surface(20, 20, IRect::from_xywh(5, 5, 10, 10));
    let original = surface.snapshot().unwrap();

    let encoded = original.encode(Unstoppable).unwrap();
    assert!(!encoded.is_empty());

    let decoded = Image::decode(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded.width(), original.width());
    assert_eq!(decoded.height(), original.height());
    compare_pixels(&original, None, &decoded).unwrap();
}

#[test]
fn roundtrip_is_idempotent() {
    let noise = noise_image(37, 23, AlphaMode::Opaque);

    let first = Image::decode(&noise.encode(Unstoppable).unwrap(), Unstoppable).unwrap();
    let second = Image::decode(&first.encode(Unstoppable).unwrap(), Unstoppable).unwrap();

    compare_pixels(&first, None, &second).unwrap();
    assert_eq!(first.pixels(), second.pixels());
}

#[test]
fn same_pixels_decode_identically_across_encodes() {
    let noise = noise_image(64, 64, AlphaMode::Opaque);
    let a = Image::decode(&noise.encode(Unstoppable).unwrap(), Unstoppable).unwrap();
    let b = Image::decode(&noise.encode(Unstoppable).unwrap(), Unstoppable).unwrap();
    assert_eq!(a.pixels(), b.pixels());
}

#[test]
fn premultiplied_roundtrip_preserves_alpha_convention() {
    let noise = noise_image(16, 16, AlphaMode::Premultiplied);
    let encoded = noise.encode(Unstoppable).unwrap();
    assert_eq!(
        codec::peek_alpha(&encoded).unwrap(),
        AlphaMode::Premultiplied
    );

    let decoded = Image::decode(&encoded, Unstoppable).unwrap();
    assert!(!decoded.is_opaque());
    compare_pixels(&noise, None, &decoded).unwrap();
}

#[test]
fn tile_size_does_not_change_pixels() {
    let noise = noise_image(50, 33, AlphaMode::Opaque);
    for tile_size in [1, 7, 16, 64, 8192] {
        let encoded = EncodeRequest::new()
            .with_tile_size(tile_size)
            .encode(&noise, Unstoppable)
            .unwrap();
        let decoded = Image::decode(&encoded, Unstoppable).unwrap();
        compare_pixels(&noise, None, &decoded).unwrap();
    }
}

#[test]
fn limits_reject_large_decode() {
    let noise = noise_image(8, 8, AlphaMode::Opaque);
    let encoded = noise.encode(Unstoppable).unwrap();

    let limits = Limits {
        max_pixels: Some(16),
        ..Default::default()
    };
    let result = DecodeRequest::new(&encoded)
        .with_limits(&limits)
        .decode(Unstoppable);
    assert!(matches!(result.unwrap_err(), SnapError::LimitExceeded(_)));

    let roomy = Limits {
        max_pixels: Some(64),
        max_output_bytes: Some(8 * 8 * 4),
        ..Default::default()
    };
    DecodeRequest::new(&encoded)
        .with_limits(&roomy)
        .decode(Unstoppable)
        .unwrap();
}

#[test]
fn stopped_token_cancels_encode_and_decode() {
    let noise = noise_image(8, 8, AlphaMode::Opaque);
    let encoded = noise.encode(Unstoppable).unwrap();

    let result = noise.encode(AlreadyStopped);
    assert!(matches!(
        result.unwrap_err(),
        SnapError::Cancelled(StopReason::Cancelled)
    ));

    let result = Image::decode(&encoded, AlreadyStopped);
    assert!(matches!(
        result.unwrap_err(),
        SnapError::Cancelled(StopReason::Cancelled)
    ));

    let result = Image::decode_subset(&encoded, IRect::from_xywh(1, 1, 4, 4), AlreadyStopped);
    assert!(matches!(
        result.unwrap_err(),
        SnapError::Cancelled(StopReason::Cancelled)
    ));
}

#[test]
fn decode_rejects_corrupt_streams() {
    let noise = noise_image(8, 8, AlphaMode::Opaque);
    let encoded = noise.encode(Unstoppable).unwrap();

    // truncated to the fixed header only: tile table is gone
    let result = Image::decode(&encoded[..20], Unstoppable);
    assert!(matches!(result.unwrap_err(), SnapError::UnexpectedEof));

    // truncated payload
    let result = Image::decode(&encoded[..encoded.len() - 1], Unstoppable);
    assert!(matches!(result.unwrap_err(), SnapError::UnexpectedEof));

    // flipped magic byte
    let mut bad = encoded.clone();
    bad[0] ^= 0x20;
    let result = Image::decode(&bad, Unstoppable);
    assert!(matches!(result.unwrap_err(), SnapError::CorruptHeader(_)));

    // tile payload corrupted so its QOI header disagrees with the table
    let mut bad = encoded.clone();
    let payload_start = 20 + 4; // one 8x8 tile at default tile size
    bad[payload_start] ^= 0xff;
    let result = Image::decode(&bad, Unstoppable);
    assert!(matches!(result.unwrap_err(), SnapError::CorruptHeader(_)));

    assert!(matches!(
        Image::decode(&[], Unstoppable).unwrap_err(),
        SnapError::UnexpectedEof
    ));
}
