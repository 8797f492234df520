/// Fixed 16 KiB block size used for merkle leaf hashing in BEP 52.
pub const MERKLE_BLOCK_SIZE: u32 = 16384;

const MERKLE_BLOCK_SIZE_I64: i64 = MERKLE_BLOCK_SIZE as i64;

// Probing steps for the exponent. They add up to 48 and the largest probe
// is 16 KiB << 48 == 2^62, which still fits in an i64.
const EXPONENT_PROBES: [u32; 6] = [17, 16, 8, 4, 2, 1];

/// 16 KiB * 2^layer, or None if that doesn't fit in an i64.
pub const fn piece_length_for_layer_number(layer: u32) -> Option<i64> {
    if layer >= i64::BITS {
        return None;
    }
    let Some(shifted) = 1i64.checked_shl(layer) else {
        return None;
    };
    if shifted < 0 {
        return None;
    }
    MERKLE_BLOCK_SIZE_I64.checked_mul(shifted)
}

/// Find the merkle layer whose nodes each cover exactly `piece_length` bytes.
///
/// `piece_length` must be 16 KiB times a power of two. Anything else,
/// including zero and negative values, gives None.
pub fn layer_number_for_piece_length(piece_length: i64) -> Option<u32> {
    let mut exponent = 0u32;
    for step in EXPONENT_PROBES {
        if let Some(len) = piece_length_for_layer_number(exponent + step) {
            if len <= piece_length {
                exponent += step;
            }
        }
    }

    match piece_length_for_layer_number(exponent) {
        Some(len) if len == piece_length => Some(exponent),
        // not a power of 2 under 2^63 == 8 EiB.
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_number_for_piece_length() {
        let cases: [(Option<u32>, i64); 5] = [
            (Some(0), 16 * 1024),
            (Some(8), 4 * 1024 * 1024),
            (Some(9), 8 * 1024 * 1024),
            // too small
            (None, 8 * 1024),
            // not a power of two
            (None, 8 * 1024 * 1024 + 1),
        ];
        for (expected, piece_length) in cases {
            assert_eq!(
                layer_number_for_piece_length(piece_length),
                expected,
                "piece_length={piece_length}"
            );
        }
    }

    #[test]
    fn test_every_valid_piece_length() {
        for layer in 0..=48 {
            let piece_length = (MERKLE_BLOCK_SIZE as i64) << layer;
            assert_eq!(layer_number_for_piece_length(piece_length), Some(layer));
            assert_eq!(piece_length_for_layer_number(layer), Some(piece_length));
            assert_eq!(layer_number_for_piece_length(piece_length + 1), None);
            assert_eq!(layer_number_for_piece_length(piece_length - 1), None);
        }
    }

    #[test]
    fn test_extremes_terminate() {
        assert_eq!(layer_number_for_piece_length(i64::MAX), None);
        assert_eq!(layer_number_for_piece_length(i64::MIN), None);
        assert_eq!(layer_number_for_piece_length(0), None);
        assert_eq!(layer_number_for_piece_length(-16384), None);
        assert_eq!(layer_number_for_piece_length(1), None);
        assert_eq!(layer_number_for_piece_length(1 << 62), Some(48));
    }

    #[test]
    fn test_powers_of_two_below_block_size() {
        for shift in 0..14 {
            assert_eq!(layer_number_for_piece_length(1 << shift), None);
        }
    }

    #[test]
    fn test_piece_length_for_layer_overflow() {
        assert_eq!(piece_length_for_layer_number(48), Some(1 << 62));
        assert_eq!(piece_length_for_layer_number(49), None);
        assert_eq!(piece_length_for_layer_number(63), None);
        assert_eq!(piece_length_for_layer_number(64), None);
        assert_eq!(piece_length_for_layer_number(u32::MAX), None);
    }
}
