use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::Value;
use tld_reconciler::parsers::{parse_bootstrap_records, parse_registry_table};
use tld_reconciler::pipeline::Snapshot;
use tld_reconciler::supplemental::SupplementalData;
use tld_reconciler::unified::build_from_records;

const TLD_LIST: &[u8] = include_bytes!("../tests/fixtures/tlds.txt");
const BOOTSTRAP: &[u8] = include_bytes!("../tests/fixtures/dns.json");
const ROOT_DB: &str = include_str!("../tests/fixtures/root-db.html");
const SUPPLEMENTAL: &str = include_str!("../data/supplemental.json");

fn bench_unified(c: &mut Criterion) {
    let document: Value = serde_json::from_slice(BOOTSTRAP).unwrap();
    let services = document["services"].as_array().cloned().unwrap();
    let records = parse_bootstrap_records(&services);
    let entries = parse_registry_table(ROOT_DB);
    let supplemental = SupplementalData::from_json(SUPPLEMENTAL).unwrap();

    c.bench_function("parse_registry_table", |b| {
        b.iter(|| parse_registry_table(black_box(ROOT_DB)))
    });

    c.bench_function("build_from_records", |b| {
        b.iter(|| {
            build_from_records(
                black_box(&records),
                black_box(&entries),
                &supplemental.cc_tld_rdap_servers,
                Utc::now(),
            )
        })
    });

    c.bench_function("snapshot_analysis", |b| {
        let snapshot = Snapshot::from_sources(TLD_LIST, BOOTSTRAP, ROOT_DB.as_bytes()).unwrap();
        b.iter(|| black_box(&snapshot).analysis())
    });
}

criterion_group!(benches, bench_unified);
criterion_main!(benches);
