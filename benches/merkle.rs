use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use merkle_campaign::merkle::verify_inclusion;
use merkle_campaign::{Blake2b256, PayoutEntry, PayoutTree, Sha256};

const CAMPAIGN_ID: &str = "bench-campaign";
const SIZES: [usize; 4] = [16, 256, 1024, 8192];

fn entries(n: usize) -> Vec<PayoutEntry> {
    (0..n)
        .map(|i| PayoutEntry::new(format!("addr_test1q{:08x}", i), 1_000 + i as u64))
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("payout_tree_build");
    for &size in &SIZES {
        let payouts = entries(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("blake2b", size), &payouts, |b, payouts| {
            b.iter(|| PayoutTree::<Blake2b256>::build(black_box(payouts), CAMPAIGN_ID).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("sha256", size), &payouts, |b, payouts| {
            b.iter(|| PayoutTree::<Sha256>::build(black_box(payouts), CAMPAIGN_ID).unwrap());
        });
    }
    group.finish();
}

fn bench_prove(c: &mut Criterion) {
    let mut group = c.benchmark_group("payout_tree_prove");
    for &size in &SIZES {
        let payouts = entries(size);
        let tree = PayoutTree::<Blake2b256>::build(&payouts, CAMPAIGN_ID).unwrap();
        let address = payouts[size / 2].address.clone();
        group.bench_with_input(BenchmarkId::from_parameter(size), &tree, |b, tree| {
            b.iter(|| tree.proof_for(black_box(&address)).unwrap());
        });
    }
    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("payout_inclusion_verify");
    for &size in &SIZES {
        let payouts = entries(size);
        let tree = PayoutTree::<Blake2b256>::build(&payouts, CAMPAIGN_ID).unwrap();
        let entry = &payouts[size / 2];
        let proof = tree.proof_for(&entry.address).unwrap();
        let root = tree.root();
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                assert!(verify_inclusion::<Blake2b256>(
                    black_box(&entry.address),
                    entry.amount,
                    CAMPAIGN_ID,
                    black_box(&proof),
                    root.as_ref(),
                ));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_prove, bench_verify);
criterion_main!(benches);
