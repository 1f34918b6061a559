//! Performance benchmarks for vitrina-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vitrina_engine::{
    filter_and_sort, snapshot, CarouselConfig, CarouselController, Clock, Command, FixedClock,
    Inventory, ManualScheduler, MemoryStore, Product, ProductInput, SortField, SortOption,
    ViewportClass,
};

const NAMES: [&str; 6] = ["Widget", "Gadget", "Tornillo", "Tuerca", "Éclair", "Ñandú"];

fn products(count: u32) -> Vec<Product> {
    let clock = FixedClock::from_millis(1_714_557_600_000);
    (0..count)
        .map(|i| {
            let name = format!("{} {}", NAMES[i as usize % NAMES.len()], i);
            ProductInput::new(i, name, i % 50).into_product(clock.now())
        })
        .collect()
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_and_sort");

    for size in [100u32, 1000, 5000].iter() {
        let items = products(*size);

        group.bench_with_input(BenchmarkId::new("no_filter_creacion_desc", size), &items, |b, items| {
            let sort = SortOption::default();
            b.iter(|| filter_and_sort(black_box(items), black_box(""), &sort))
        });

        group.bench_with_input(BenchmarkId::new("search_nombre_asc", size), &items, |b, items| {
            let sort = SortOption::asc(SortField::Nombre);
            b.iter(|| filter_and_sort(black_box(items), black_box("wid"), &sort))
        });

        group.bench_with_input(BenchmarkId::new("nombre_asc_full", size), &items, |b, items| {
            let sort = SortOption::asc(SortField::Nombre);
            b.iter(|| filter_and_sort(black_box(items), black_box(""), &sort))
        });
    }

    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    // Every add persists the whole collection.
    group.bench_function("add_product_1000", |b| {
        let mut inventory = Inventory::with_products(MemoryStore::new(), products(1000))
            .with_clock(FixedClock::from_millis(0));
        let mut codigo = 1000u32;

        b.iter(|| {
            codigo += 1;
            inventory.dispatch(black_box(Command::add(ProductInput::new(codigo, "Bench", 1))))
        })
    });

    group.bench_function("set_search_1000", |b| {
        let mut inventory = Inventory::with_products(MemoryStore::new(), products(1000));
        let terms = ["wid", "tor", "", "ñan"];
        let mut i = 0;

        b.iter(|| {
            i += 1;
            inventory.dispatch(black_box(Command::search(terms[i % terms.len()])))
        })
    });

    group.finish();
}

fn bench_persistence(c: &mut Criterion) {
    let mut group = c.benchmark_group("persistence");

    for size in [100u32, 1000].iter() {
        let items = products(*size);
        let json = snapshot::to_json(&items).unwrap_or_default();

        group.bench_with_input(BenchmarkId::new("to_json", size), &items, |b, items| {
            b.iter(|| snapshot::to_json(black_box(items)))
        });

        group.bench_with_input(BenchmarkId::new("from_json", size), &json, |b, json| {
            b.iter(|| snapshot::from_json(black_box(json)))
        });
    }

    group.finish();
}

fn bench_carousel(c: &mut Criterion) {
    let mut group = c.benchmark_group("carousel");

    group.bench_function("navigate", |b| {
        let mut carousel = CarouselController::new(
            CarouselConfig::new(100),
            ViewportClass::Lg,
            ManualScheduler::new(),
        );

        b.iter(|| {
            carousel.next();
            carousel.prev();
            carousel.next();
            black_box(carousel.current_index())
        })
    });

    group.bench_function("reconfigure", |b| {
        let mut carousel = CarouselController::new(
            CarouselConfig::new(10),
            ViewportClass::Lg,
            ManualScheduler::new(),
        );
        let mut count = 10usize;

        b.iter(|| {
            count = if count == 10 { 20 } else { 10 };
            carousel.set_item_count(black_box(count))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_pipeline,
    bench_dispatch,
    bench_persistence,
    bench_carousel,
);
criterion_main!(benches);
