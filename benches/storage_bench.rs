//! Benchmarks for cidkv storage operations

use std::sync::Arc;

use cidkv::blockstore::MemBlockStore;
use cidkv::keys::ETH_STATE_TRIE;
use cidkv::{derive_cid, keccak256, Batch, CidDeriver, Config, Database};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn fixtures(count: usize) -> Vec<([u8; 32], Vec<u8>)> {
    (0..count)
        .map(|i| {
            let value = format!("trie node {:08}", i).into_bytes();
            (keccak256(&value), value)
        })
        .collect()
}

fn storage_benchmarks(c: &mut Criterion) {
    let key = keccak256(b"state node");
    c.bench_function("derive_cid", |b| {
        b.iter(|| derive_cid(black_box(&key), ETH_STATE_TRIE).unwrap())
    });

    let entries = fixtures(1_000);

    c.bench_function("database_put_get_1k", |b| {
        b.iter_batched(
            || Database::new(MemBlockStore::new(), Config::default()),
            |db| {
                for (key, value) in &entries {
                    db.put(key, value).unwrap();
                }
                for (key, _) in &entries {
                    black_box(db.get(key).unwrap());
                }
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("batch_write_1k", |b| {
        b.iter_batched(
            || {
                let mut batch = Batch::new(
                    Arc::new(MemBlockStore::new()),
                    CidDeriver::default(),
                    entries.len(),
                );
                for (key, value) in &entries {
                    batch.put(key, value).unwrap();
                }
                batch
            },
            |batch| batch.write().unwrap(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, storage_benchmarks);
criterion_main!(benches);
