use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use geo::Point;
use nalgebra::DMatrix;
use reefmatch::{
    Config, PcaOptions, RegionAssigner, RegionMatcher, ReefCell, ReefRegion, SpatialIndex, pca,
};

/// 1,925 cells on a 77 x 25 grid spanning the tropics.
fn reef_cells() -> Vec<ReefCell> {
    let mut cells = Vec::with_capacity(77 * 25);
    for i in 0..25 {
        for j in 0..77 {
            let lon = -180.0 + j as f64 * 4.675;
            let lat = -30.0 + i as f64 * 2.5;
            cells.push(ReefCell::new(lon, lat));
        }
    }
    cells
}

/// 100 regions scattered over the same band with varied areas.
fn reef_regions() -> Vec<ReefRegion> {
    (0..100)
        .map(|k| {
            let lon = -178.0 + (k as f64 * 37.3) % 356.0;
            let lat = -28.0 + (k as f64 * 11.7) % 56.0;
            let area = if k % 7 == 0 {
                None
            } else {
                Some(50.0 * (k % 13) as f64 * (k % 13) as f64)
            };
            ReefRegion::new(format!("R{}", k), lon, lat, area)
        })
        .collect()
}

fn benchmark_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("cell_index");
    let cells = reef_cells();

    group.bench_function("build_1925", |b| {
        b.iter(|| SpatialIndex::from_cells(black_box(&cells)).unwrap())
    });

    let index = SpatialIndex::from_cells(&cells).unwrap();
    for radius in [0.5, 2.0, 8.0] {
        group.bench_with_input(BenchmarkId::new("query_range", radius), &radius, |b, &r| {
            b.iter(|| {
                index
                    .query_range(black_box(&Point::new(146.0, -18.0)), black_box(r))
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn benchmark_assignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("assignment");
    let cells = reef_cells();
    let regions = reef_regions();
    let assigner = RegionAssigner::builder().build().unwrap();

    group.bench_function("full_run_1925_cells_100_regions", |b| {
        b.iter(|| {
            assigner
                .run(black_box(&regions), black_box(&cells))
                .unwrap()
        })
    });

    let index = SpatialIndex::from_cells(&cells).unwrap();
    let config = Config::default();
    let matcher = RegionMatcher::new(&index, &config);
    group.bench_function("match_all_base_radius", |b| {
        b.iter(|| matcher.match_all(black_box(&regions)).unwrap())
    });

    group.finish();
}

fn benchmark_pca(c: &mut Criterion) {
    let mut group = c.benchmark_group("pca");

    for vars in [4, 8, 16] {
        let data = DMatrix::from_fn(100, vars, |i, j| {
            ((i * 31 + j * 17) % 97) as f64 + (i as f64 * 0.1).sin() * j as f64
        });
        let options = PcaOptions::default().with_standardize(true).with_sort(true);
        group.bench_with_input(BenchmarkId::new("standardized", vars), &data, |b, data| {
            b.iter(|| pca(black_box(data), None, options).unwrap())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_index,
    benchmark_assignment,
    benchmark_pca
);
criterion_main!(benches);
