use std::hint::black_box;

use chrono::{NaiveDate, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rust_decimal::Decimal;

use druggist_core::{Actor, ItemId, UserId};
use druggist_infra::{InMemoryLedgerStore, Ledger};
use druggist_inventory::NewItem;

fn new_item(name: String, stock: i64) -> NewItem {
    NewItem {
        name,
        batch_no: "BENCH-1".to_string(),
        stock: Decimal::from(stock),
        dose_pack: Decimal::ONE,
        expiry_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        reorder_level: Decimal::from(10),
        unit_id: None,
        selling_price: None,
    }
}

fn setup(stock: i64) -> (Ledger<InMemoryLedgerStore>, ItemId, Actor) {
    let ledger = Ledger::new(InMemoryLedgerStore::new());
    let item = ledger
        .create_item(new_item("Paracetamol".to_string(), stock))
        .unwrap();
    (ledger, item.id_typed(), Actor::new(UserId::new(), "bench"))
}

fn bench_operation_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("operation_latency");
    group.sample_size(1000);

    group.bench_function("record_sale", |b| {
        let (ledger, item_id, actor) = setup(i64::MAX / 2);
        b.iter(|| {
            ledger
                .record_sale(item_id, black_box(Decimal::ONE), None, &actor)
                .unwrap();
        });
    });

    group.bench_function("lock_then_unlock", |b| {
        let (ledger, item_id, actor) = setup(1_000);
        b.iter(|| {
            let reservation = ledger
                .lock(item_id, black_box(Decimal::from(3)), None, &actor)
                .unwrap();
            ledger.unlock(reservation.id).unwrap();
        });
    });

    group.finish();
}

/// Lock/unlock refreshes the latest sale, which scans the item's sale history.
fn bench_lock_with_sale_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("lock_with_sale_history");

    for history in [10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(history), &history, |b, &history| {
            let (ledger, item_id, actor) = setup(1_000_000);
            for _ in 0..history {
                ledger.record_sale(item_id, Decimal::ONE, None, &actor).unwrap();
            }
            b.iter(|| {
                let reservation = ledger.lock(item_id, Decimal::ONE, None, &actor).unwrap();
                ledger.unlock(reservation.id).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_dashboard(c: &mut Criterion) {
    let mut group = c.benchmark_group("dashboard");

    for items in [10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(items as u64));
        group.bench_with_input(BenchmarkId::from_parameter(items), &items, |b, &items| {
            let ledger = Ledger::new(InMemoryLedgerStore::new());
            let actor = Actor::new(UserId::new(), "bench");
            for n in 0..items {
                let item = ledger
                    .create_item(new_item(format!("Item {n}"), (n % 20) as i64 + 1))
                    .unwrap();
                ledger
                    .record_sale(item.id_typed(), Decimal::ONE, None, &actor)
                    .unwrap();
            }
            let today = Utc::now().date_naive();
            b.iter(|| black_box(ledger.dashboard(today).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_operation_latency,
    bench_lock_with_sale_history,
    bench_dashboard
);
criterion_main!(benches);
