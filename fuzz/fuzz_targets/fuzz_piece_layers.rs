#![no_main]

use bep52_merkle_core::*;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&layer, rest)) = data.split_first() else {
        return;
    };
    let split = rest.len().min(32);
    let (key, value) = rest.split_at(split);
    if let Some(entry) = PieceLayersEntry::parse(key, value) {
        let (root, layer) = entry.into_layer(u32::from(layer % 16));
        let _ = validate_piece_layers(EmptyHashCache::global(), &root, &layer);
    }

    if let Ok(bytes) = <[u8; 8]>::try_from(&rest[..rest.len().min(8)]) {
        let piece_length = i64::from_le_bytes(bytes);
        if let Some(layer) = layer_number_for_piece_length(piece_length) {
            assert_eq!(piece_length_for_layer_number(layer), Some(piece_length));
        }
    }
});
