// Share-ledger benchmarks.
//
// Covers deposit/redeem round trips, plan-only previews, and a harvest
// against ledgers with a growing number of holders.

use std::hint::black_box;

use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};

use tessera_protocol::config::DEFAULT_HARVEST_COOLDOWN;
use tessera_protocol::{AccountId, FeeConfig, HarvestAccountant, InflationGuard, ShareLedger};

fn populated_ledger(holders: usize) -> (ShareLedger, Vec<AccountId>) {
    let mut ledger = ShareLedger::new(InflationGuard::default()).unwrap();
    let accounts: Vec<_> = (0..holders)
        .map(|i| AccountId::new(format!("tessera:holder-{i:06}")))
        .collect();
    for (i, who) in accounts.iter().enumerate() {
        ledger.deposit(1_000 + i as u64, who).unwrap();
    }
    (ledger, accounts)
}

fn bench_deposit_redeem(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger/deposit_redeem");
    for holders in [10, 1_000, 10_000] {
        let (ledger, accounts) = populated_ledger(holders);
        let who = accounts[holders / 2].clone();

        group.throughput(Throughput::Elements(2));
        group.bench_with_input(BenchmarkId::from_parameter(holders), &ledger, |b, ledger| {
            b.iter_batched(
                || ledger.clone(),
                |mut l| {
                    let shares = l.deposit(black_box(250_000), &who).unwrap();
                    l.redeem(shares, &who, &who).unwrap()
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_previews(c: &mut Criterion) {
    let (ledger, _) = populated_ledger(100);
    c.bench_function("ledger/preview_all", |b| {
        b.iter(|| {
            (
                ledger.preview_deposit(black_box(1_000)),
                ledger.preview_mint(black_box(1_000_000)),
                ledger.preview_withdraw(black_box(1_000)),
                ledger.preview_redeem(black_box(1_000_000)),
            )
        });
    });
}

fn bench_harvest(c: &mut Criterion) {
    let (ledger, _) = populated_ledger(1_000);
    let fees = FeeConfig::new(1_000, AccountId::new("tessera:treasury"), DEFAULT_HARVEST_COOLDOWN)
        .unwrap();
    let accountant = HarvestAccountant::new(fees).unwrap();
    let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

    c.bench_function("harvest/plan_commit_finish", |b| {
        b.iter_batched(
            || (ledger.clone(), accountant.clone()),
            |(mut l, mut a)| {
                a.harvest(black_box(123_456), t0, &mut l).unwrap();
                a.harvest(black_box(654_321), t0 + Duration::hours(12), &mut l).unwrap()
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_deposit_redeem, bench_previews, bench_harvest);
criterion_main!(benches);
