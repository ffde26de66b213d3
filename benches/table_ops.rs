use core::hint::black_box;

use criterion::BatchSize;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::HashMap;
use oa_table::Config;
use oa_table::DeletionPolicy;
use oa_table::HashTable;
use oa_table::hashers;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

const SIZES: &[usize] = &[(1 << 10), (1 << 13), (1 << 16)];

fn make_keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("key_{i:016X}")).collect()
}

fn make_table(policy: DeletionPolicy) -> HashTable<u64> {
    let config = Config::new(11, hashers::fold_primary)
        .with_secondary_hash(hashers::fold_secondary)
        .with_deletion_policy(policy);
    HashTable::new(config)
}

fn fill(table: &mut HashTable<u64>, keys: &[String]) {
    for (i, key) in keys.iter().enumerate() {
        table.insert(key, i as u64).expect("benchmark keys are unique");
    }
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &size in SIZES {
        let keys = make_keys(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("oa_table/{size}"), |b| {
            b.iter_batched(
                || make_table(DeletionPolicy::Pack),
                |mut table| {
                    fill(&mut table, &keys);
                    table
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                HashMap::new,
                |mut map| {
                    for (i, key) in keys.iter().enumerate() {
                        map.insert(key.clone(), i as u64);
                    }
                    map
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");
    for &size in SIZES {
        let keys = make_keys(size);
        let mut lookup_order: Vec<&String> = keys.iter().collect();
        lookup_order.shuffle(&mut SmallRng::seed_from_u64(0xDEC0DE));

        let mut table = make_table(DeletionPolicy::Pack);
        fill(&mut table, &keys);

        let mut map: HashMap<String, u64> = HashMap::new();
        for (i, key) in keys.iter().enumerate() {
            map.insert(key.clone(), i as u64);
        }

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("oa_table/{size}"), |b| {
            b.iter(|| {
                for key in &lookup_order {
                    black_box(table.find(key).ok());
                }
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for key in &lookup_order {
                    black_box(map.get(key.as_str()));
                }
            })
        });
    }
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_half");
    for &size in SIZES {
        let keys = make_keys(size);
        let mut removal_order: Vec<&String> = keys.iter().step_by(2).collect();
        removal_order.shuffle(&mut SmallRng::seed_from_u64(0xFACADE));

        group.throughput(Throughput::Elements(removal_order.len() as u64));

        for policy in [DeletionPolicy::Mark, DeletionPolicy::Pack] {
            group.bench_function(format!("{policy:?}/{size}"), |b| {
                b.iter_batched(
                    || {
                        let mut table = make_table(policy);
                        fill(&mut table, &keys);
                        table
                    },
                    |mut table| {
                        for key in &removal_order {
                            table.remove(key).expect("key present in setup");
                        }
                        table
                    },
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_find, bench_remove);
criterion_main!(benches);
