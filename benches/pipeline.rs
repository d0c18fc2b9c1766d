//! Benchmarks for the in-memory stages of a mirror run: extracting
//! definitions from a large upstream file, transforming them, and renaming
//! references in project sources.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use manifest_mirror::config::MirrorJob;
use manifest_mirror::phases::extract::extract_from_source;
use manifest_mirror::phases::{IdentifierMapping, Renamer, Transformer};
use std::path::Path;

/// Upstream-like source with `count` mirrored structs mixed with noise.
fn upstream_source(count: usize) -> String {
    let mut source = String::from("use sbor::*;\n\n");
    for i in 0..count {
        source.push_str(&format!(
            "/// Input {i}\n#[derive(Debug)]\npub struct Item{i}Input {{\n    pub entries: BTreeMap<String, Vec<u8>>,\n    pub name: String,\n}}\n\n"
        ));
        source.push_str(&format!(
            "pub struct Item{i}Output {{\n    pub value: u64,\n}}\n\nimpl Item{i}Output {{\n    pub fn value(&self) -> u64 {{ self.value }}\n}}\n\n"
        ));
    }
    source
}

/// Project-like source referencing mirrored names `count` times.
fn project_source(count: usize) -> String {
    (0..count)
        .map(|i| format!("fn build_{i}(a: Item{i}Input, b: Item{i}InputExtra) -> Item{i}Output {{ todo!() }}\n"))
        .collect()
}

fn bench_extract(c: &mut Criterion) {
    let options = MirrorJob::named("bench").extract_options();
    let source = upstream_source(200);

    c.bench_function("extract_200_definitions", |b| {
        b.iter(|| extract_from_source(Path::new("lib.rs"), black_box(&source), &options))
    });
}

fn bench_transform(c: &mut Criterion) {
    let job = MirrorJob::named("bench");
    let definitions = extract_from_source(Path::new("lib.rs"), &upstream_source(200), &job.extract_options());
    let transformer = Transformer::new(job.transform_rules()).unwrap();

    c.bench_function("transform_200_definitions", |b| {
        b.iter(|| transformer.transform_all(black_box(&definitions)).unwrap())
    });
}

fn bench_rename(c: &mut Criterion) {
    let mut mapping = IdentifierMapping::new();
    for i in 0..200 {
        mapping.insert(format!("Item{i}Input"), format!("Item{i}IndexMapInput"));
    }
    let renamer = Renamer::new(&mapping).unwrap();
    let source = project_source(1000);

    c.bench_function("rename_1000_lines", |b| {
        b.iter(|| renamer.apply(black_box(&source)))
    });
}

criterion_group!(benches, bench_extract, bench_transform, bench_rename);
criterion_main!(benches);
