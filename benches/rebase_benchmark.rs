//! Benchmark for accepting an edit while many others are pending.
//!
//! Every accept runs one rebase pass over the whole edit set, so this measures
//! how the pass scales with the number of pending suggestions.

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use edit_suggest::{Edit, ReviewSession, Settings, TextBuffer};

/// Generate a LaTeX-like document with `lines` lines.
fn generate_document(lines: usize) -> String {
    (1..=lines)
        .map(|n| format!("\\item entry {}", n))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One replace per line, each growing its line into two.
fn generate_edits(count: usize) -> Vec<Edit> {
    (1..=count)
        .filter_map(|line| {
            Edit::from_parts(
                line,
                1,
                format!("\\item entry {}\n\\item added {}", line, line),
                "",
            )
        })
        .collect()
}

fn bench_accept_first(c: &mut Criterion) {
    let mut group = c.benchmark_group("accept_with_pending");

    for pending in [50, 200, 500] {
        let text = generate_document(pending);
        let settings = Settings {
            batch_size: pending,
            ..Settings::default()
        };

        group.bench_with_input(BenchmarkId::from_parameter(pending), &pending, |b, &pending| {
            b.iter_batched(
                || {
                    let buffer = TextBuffer::new(&text);
                    let mut session = ReviewSession::new(settings.clone());
                    session.propose_edits(generate_edits(pending), "", &buffer);
                    (session, buffer)
                },
                |(mut session, mut buffer)| {
                    let id = session.visible_batch()[0].id;
                    session.accept(id, &mut buffer)
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_accept_first);
criterion_main!(benches);
