//! Benchmarks for slug normalization and preview route generation.
//!
//! Run with: `cargo bench --bench routes`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use gc_catalog::{generate_routes, normalize_slug};
use gc_core::{
    EntryKind, SectionId, SerializableEntry, SerializablePreview, SerializableSection,
    SerializableState, ThemeBackground, ThemeCombo, ThemeVariant,
};

fn preview(id: String) -> SerializablePreview {
    SerializablePreview { id }
}

/// Builds a catalog with `entries` entries per section, each with three states.
fn catalog(entries: usize) -> Vec<SerializableSection> {
    SectionId::ALL
        .iter()
        .map(|section| SerializableSection {
            id: *section,
            entries: (0..entries)
                .map(|n| {
                    let id = format!("{}-entry-{n}", section.as_str());
                    SerializableEntry {
                        name: format!("Entry {n}"),
                        kind: EntryKind::Component,
                        description: None,
                        tags: None,
                        props: None,
                        axes: None,
                        usage: None,
                        related: None,
                        code: None,
                        preview: preview(format!("{}:{id}:default", section.as_str())),
                        states: Some(
                            ["hover", "focus", "disabled"]
                                .iter()
                                .map(|state| SerializableState {
                                    id: (*state).to_owned(),
                                    name: state.to_uppercase(),
                                    description: None,
                                    code: None,
                                    preview: preview(format!("{}:{id}:{state}", section.as_str())),
                                })
                                .collect(),
                        ),
                        id,
                    }
                })
                .collect(),
        })
        .collect()
}

fn bench_normalize_slug(c: &mut Criterion) {
    let inputs = [
        "buttons:button:default",
        "  Week Picker / Overview  ",
        "ÜNICODE--mixed__Case..Values",
    ];

    c.bench_function("normalize_slug", |b| {
        b.iter(|| {
            for input in &inputs {
                black_box(normalize_slug(black_box(input)));
            }
        });
    });
}

fn bench_generate_routes(c: &mut Criterion) {
    let backgrounds: Vec<ThemeBackground> = ThemeBackground::all().collect();
    let combos = ThemeCombo::product(&ThemeVariant::ALL, &backgrounds);

    let mut group = c.benchmark_group("generate_routes");
    for entries in [1, 10, 50] {
        let sections = catalog(entries);
        group.bench_with_input(BenchmarkId::from_parameter(entries), &sections, |b, sections| {
            b.iter(|| generate_routes(black_box(sections), &combos));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_normalize_slug, bench_generate_routes);
criterion_main!(benches);
