//! Query construction benchmarks.
#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use ehst_archive::{build_criteria_query, query::build_cone_search_query, CriteriaQuery};
use ehst_core::{AngularDistance, SkyCoord};

fn full_criteria() -> CriteriaQuery {
    CriteriaQuery::default()
        .with_calibration_level(1)
        .with_data_product_type("image")
        .with_intent("SCIENCE")
        .with_collections(["HST", "HLA"])
        .with_instruments(["WFC3", "ACS/WFC", "WFPC2"])
        .with_filters(["F555W", "F606W", "F814W"])
}

fn bench_build_criteria_query(c: &mut Criterion) {
    let criteria = full_criteria();
    c.bench_function("build_criteria_query", |b| {
        b.iter(|| {
            let query = build_criteria_query(black_box(&criteria)).expect("build failed");
            black_box(query);
        })
    });
}

fn bench_build_cone_search_query(c: &mut Criterion) {
    let criteria = full_criteria();
    let center: SkyCoord = "00h42m44.51s +41d16m08.45s"
        .parse()
        .expect("invalid coordinates");
    let radius = AngularDistance::arcminutes(7.0).expect("invalid radius");
    c.bench_function("build_cone_search_query", |b| {
        b.iter(|| {
            let query = build_cone_search_query(black_box(&criteria), &center, &radius)
                .expect("build failed");
            black_box(query);
        })
    });
}

criterion_group!(
    benches,
    bench_build_criteria_query,
    bench_build_cone_search_query
);
criterion_main!(benches);
