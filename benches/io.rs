use criterion::{criterion_group, criterion_main, Criterion};
use methcov::prelude::*;
use methcov::test_utilities::{random_coverage_records, random_regions, write_coverage_file};

const COVERAGE_LENGTH: usize = 1_000_000;

fn bench_io_shootout(c: &mut Criterion) {
    // create the benchmark group
    let mut group = c.benchmark_group("coverage");

    // create the test data
    let records = random_coverage_records(COVERAGE_LENGTH);
    let rows: Vec<_> = records
        .iter()
        .map(|r| {
            (
                r.chromosome.as_str(),
                r.start_loc,
                r.end_loc,
                r.methyl_rate,
                r.methylated_reads,
                r.unmethylated_reads,
            )
        })
        .collect();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("GSM0_S0_1wk_Liver.cov.gz");
    write_coverage_file(&path, &rows);

    // configure the sample size for the group
    group.sample_size(10);

    group.bench_function("read_presorted", |b| {
        b.iter(|| CoverageTable::from_path(&path, true).unwrap().len());
    });

    group.bench_function("read_file_order", |b| {
        b.iter(|| CoverageTable::from_path(&path, false).unwrap().len());
    });

    // region filtering, indexed vs. linear scan
    let catalog = RegionCatalog::new(random_regions(1_000));
    let sorted = CoverageTable::from_records(records.clone(), true);
    let unsorted = CoverageTable::from_records(records, false);

    group.bench_function("filter_indexed", |b| {
        b.iter(|| filter_regions(&sorted, &catalog).len());
    });

    group.bench_function("filter_linear", |b| {
        b.iter(|| filter_regions(&unsorted, &catalog).len());
    });

    group.bench_function("summarize_sample", |b| {
        b.iter(|| summarize_sample(&sorted, &DepthThresholds::default()).num_sites);
    });
}

criterion_group!(benches, bench_io_shootout,);
criterion_main!(benches);
