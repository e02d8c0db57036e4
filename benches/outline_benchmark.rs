//! Benchmarks for docoutline extraction performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks run the pipeline over synthetic run documents.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use docoutline::analysis::FontProfile;
use docoutline::{BoundingBox, OutlineConfig, OutlineExtractor, PageInfo, SourceDocument, TextRun};

/// Creates a synthetic document with a title, two heading levels per page
/// and 40 lines of body text per page.
fn create_test_document(page_count: usize) -> SourceDocument {
    let mut doc = SourceDocument::new().with_pages(page_count, PageInfo::letter());

    for page in 0..page_count {
        let mut y = 60.0;
        if page == 0 {
            doc.push_run(TextRun::new(
                "Benchmark Document Title",
                0,
                BoundingBox::new(138.0, y, 474.0, y + 28.0),
                28.0,
                "Helvetica-Bold",
            ));
            y += 60.0;
        }

        doc.push_run(TextRun::new(
            format!("{}. Chapter Heading", page + 1),
            page,
            BoundingBox::new(72.0, y, 320.0, y + 20.0),
            20.0,
            "Helvetica-Bold",
        ));
        y += 40.0;

        for line in 0..40 {
            if line == 20 {
                doc.push_run(TextRun::new(
                    format!("{}.1 Section Heading", page + 1),
                    page,
                    BoundingBox::new(72.0, y + 10.0, 300.0, y + 25.0),
                    15.0,
                    "Helvetica-Bold",
                ));
                y += 35.0;
            }
            doc.push_run(TextRun::new(
                "Benchmark body text used to measure outline extraction performance.",
                page,
                BoundingBox::new(72.0, y, 540.0, y + 10.0),
                10.0,
                "Times-Roman",
            ));
            y += 13.0;
        }
    }

    doc
}

/// Benchmark font statistics collection.
fn bench_font_profile(c: &mut Criterion) {
    let doc = create_test_document(10);

    c.bench_function("font_profile_10_pages", |b| {
        b.iter(|| FontProfile::collect(black_box(&doc.runs), 1.0));
    });
}

/// Benchmark full extraction at various sizes.
fn bench_outline_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("outline_extraction");

    for page_count in [1, 10, 50].iter() {
        let doc = create_test_document(*page_count);
        let sequential = OutlineExtractor::new(OutlineConfig::default()).unwrap();
        let parallel = OutlineExtractor::new(OutlineConfig::default().with_parallel(true)).unwrap();

        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| sequential.extract(black_box(&doc)).unwrap());
        });

        group.bench_function(format!("{}_pages_parallel", page_count), |b| {
            b.iter(|| parallel.extract(black_box(&doc)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark builder and config validation overhead.
fn bench_builder_creation(c: &mut Criterion) {
    c.bench_function("builder_creation", |b| {
        b.iter(|| {
            docoutline::Outliner::new()
                .with_heading_threshold(0.55)
                .with_timeout(5.0)
                .build()
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_font_profile,
    bench_outline_extraction,
    bench_builder_creation,
);
criterion_main!(benches);
