use bep52_merkle_core::{
    EmptyHashCache, Id32, MerkleLayer, PieceLayersEntry, layer_number_for_piece_length,
    reduce_to_root,
};
use criterion::{Criterion, criterion_group, criterion_main};

fn leaves(n: usize) -> Vec<Id32> {
    let cache = EmptyHashCache::default();
    (0..n)
        .map(|i| cache.hash_block(&(i as u64).to_le_bytes()).unwrap())
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let cache = EmptyHashCache::default();

    let pieces = MerkleLayer::new(8, leaves(1000));
    c.bench_function("reduce_to_root 1000 pieces", |b| {
        b.iter(|| std::hint::black_box(reduce_to_root(&cache, &pieces).unwrap()))
    });

    let blocks = MerkleLayer::new(0, leaves(256));
    c.bench_function("reduce_to_root 256 blocks", |b| {
        b.iter(|| std::hint::black_box(reduce_to_root(&cache, &blocks).unwrap()))
    });

    let block = vec![0xabu8; 16384];
    c.bench_function("hash_block 16 KiB", |b| {
        b.iter(|| std::hint::black_box(cache.hash_block(&block).unwrap()))
    });

    let value: Vec<u8> = pieces.hashes.iter().flat_map(|h| h.0).collect();
    c.bench_function("PieceLayersEntry::parse 1000 hashes", |b| {
        b.iter(|| std::hint::black_box(PieceLayersEntry::parse(&[1u8; 32], &value)))
    });

    c.bench_function("layer_number_for_piece_length", |b| {
        b.iter(|| std::hint::black_box(layer_number_for_piece_length(std::hint::black_box(4 << 20))))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
