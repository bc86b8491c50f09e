use criterion::{criterion_group, criterion_main, Criterion};
use ics_importer::ics::{parse_events, sanitize, CalendarDocument, CivilTime, Zone};
use ics_importer::Translator;

const OUTLOOK: &str = include_str!("../tests/resources/outlook_series.ics");

fn benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("values");
    group.bench_function("parse DATE-TIME UTC", |b| {
        b.iter(|| CivilTime::parse("19700329T020000Z", Zone::Floating, false).unwrap())
    });
    group.bench_function("parse DATE-TIME floating", |b| {
        b.iter(|| CivilTime::parse("19700329T020000", Zone::Floating, false).unwrap())
    });
    drop(group);

    let mut group = c.benchmark_group("document");
    group.bench_function("sanitize outlook_series.ics", |b| b.iter(|| sanitize(OUTLOOK)));
    let sanitized = sanitize(OUTLOOK);
    group.bench_function("parse outlook_series.ics", |b| {
        b.iter(|| CalendarDocument::parse(&sanitized).unwrap())
    });
    group.bench_function("extract events outlook_series.ics", |b| {
        b.iter(|| parse_events(OUTLOOK).unwrap())
    });
    drop(group);

    let mut group = c.benchmark_group("translate");
    let translator = Translator::new(chrono_tz::Europe::Berlin);
    group.bench_function("translate outlook_series.ics", |b| {
        b.iter(|| translator.translate_document(OUTLOOK).unwrap())
    });
    drop(group);
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
