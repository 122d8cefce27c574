use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use eam::{
    EamForceCompute, EamTables, FlatNeighborList, ParticleData, SimulationBox, StorageMode,
    TableFormat, Vector3,
};
use itertools::Itertools;

const CUTOFF: f64 = 5.0;

/// Single element setfl file with smooth, made up functions
fn generate_setfl() -> String {
    let (n_rho, d_rho) = (5000, 0.01);
    let (n_r, d_r) = (5000, CUTOFF / 4999.0);
    let taper = |r: f64| (CUTOFF - r).max(0.0).powi(2);
    let sample = |n: usize, d: f64, f: &dyn Fn(f64) -> f64| {
        (0..n).map(|i| f(i as f64 * d)).join("\n")
    };
    [
        "benchmark".to_string(),
        "--".to_string(),
        "--".to_string(),
        "1 Cu".to_string(),
        format!("{} {} {} {} {}", n_rho, d_rho, n_r, d_r, CUTOFF),
        "29 63.546 3.615 fcc".to_string(),
        sample(n_rho, d_rho, &|rho: f64| -rho.sqrt()),
        sample(n_r, d_r, &|r: f64| taper(r) * (-r).exp()),
        sample(n_r, d_r, &|r: f64| r * taper(r) * (-2.0 * (r - 2.5)).exp()),
    ]
    .join("\n")
}

/// Face centered cubic copper with `cells`³ unit cells
fn fcc_lattice(cells: usize) -> ParticleData {
    let a = 3.615;
    let side = a * cells as f64;
    let mut particles = ParticleData::new(SimulationBox::cubic(side), ["Cu"]);
    let basis = [
        Vector3::zeros(),
        Vector3::new(0.5, 0.5, 0.0),
        Vector3::new(0.5, 0.0, 0.5),
        Vector3::new(0.0, 0.5, 0.5),
    ];
    for ((x, y), z) in (0..cells)
        .cartesian_product(0..cells)
        .cartesian_product(0..cells)
    {
        let cell = Vector3::new(x as f64, y as f64, z as f64);
        for offset in &basis {
            let position = (cell + offset) * a - Vector3::repeat(0.5 * side);
            particles.push(position, 0);
        }
    }
    particles
}

/// Table lookups at a range of distances
fn bench_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("tables");
    let setfl = generate_setfl();
    let catalog = ["Cu"];
    let tables =
        EamTables::from_reader(setfl.as_bytes(), TableFormat::Alloy, &catalog[..]).unwrap();
    let distances = (0..10000).map(|i| CUTOFF * i as f64 / 10000.0).collect_vec();

    group.bench_function("pair_at", |b| {
        b.iter(|| {
            distances
                .iter()
                .map(|&r| tables.pair_at(0, 0, tables.r_grid().locate(black_box(r))).value)
                .sum::<f64>()
        })
    });
    group.bench_function("load", |b| {
        b.iter(|| {
            EamTables::from_reader(black_box(setfl.as_bytes()), TableFormat::Alloy, &catalog[..])
        })
    });
    group.finish();
}

/// Full force evaluation with half and full neighbor lists
fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute");
    let setfl = generate_setfl();
    for cells in [4, 6] {
        let particles = fcc_lattice(cells);
        let mut eam =
            EamForceCompute::from_reader(setfl.as_bytes(), TableFormat::Alloy, &particles).unwrap();
        for mode in [StorageMode::Half, StorageMode::Full] {
            let mut neighbors = FlatNeighborList::brute_force(&particles, CUTOFF, mode);
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", mode), particles.len()),
                &particles,
                |b, particles| b.iter(|| eam.compute(0, particles, &mut neighbors).unwrap()),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_tables, bench_compute);
criterion_main!(benches);
