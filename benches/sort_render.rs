//! This bench sorts and re-renders a large review table, comparing a full
//! rebuild of the view with reconciling it row by row.

#![allow(missing_docs)]

use std::num::NonZeroU32;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use reqgrid::{
    Classification, RequirementRecord, ReviewTable,
    table::{RenderStrategy, SortColumn},
};

const LABELS: [&str; 4] = ["Functional", "NF - Security", "NF - Usability", "NF - Legal"];

/// Generates a large number of classified requirements
fn records(count: u32) -> Vec<RequirementRecord> {
    (1..=count)
        .zip(LABELS.iter().cycle())
        .map(|(i, label)| RequirementRecord {
            text: format!("The system shall satisfy requirement number {i}."),
            ai_classification: (*label).to_string(),
            confidence: f64::from((i * 7919) % 1000) / 1000.0,
            original_text: format!("requirement {i}"),
            match_score: 0.9,
            page: NonZeroU32::new(i / 40 + 1).unwrap(),
        })
        .collect()
}

fn prepared(strategy: RenderStrategy) -> ReviewTable {
    let mut table = ReviewTable::new(records(5_000), strategy).unwrap();
    for row in (0..5_000).step_by(7) {
        table.select(row, Classification::Functional).unwrap();
    }
    table
}

fn sort_and_render(c: &mut Criterion) {
    for (name, strategy) in [
        ("sort + rebuild", RenderStrategy::Rebuild),
        ("sort + reconcile", RenderStrategy::Reconcile),
    ] {
        c.bench_function(name, |b| {
            b.iter_batched(
                || prepared(strategy),
                |mut table| {
                    table.sort_by(SortColumn::Confidence);
                    table.sort_by(SortColumn::AiClassification);
                    table
                },
                BatchSize::SmallInput,
            );
        });
    }
}

criterion_group!(benches, sort_and_render);
criterion_main!(benches);
