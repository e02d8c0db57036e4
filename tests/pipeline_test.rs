//! Integration tests for the full extraction pipeline.

use std::time::Duration;

use docoutline::{
    extract_outline, BoundingBox, DocumentOutline, Error, HeadingLevel, JsonFormat, OutlineConfig,
    OutlineExtractor, PageInfo, ProcessingStatus, SourceDocument, SteppingClock, TextRun,
    TitleSource,
};

/// Bold run horizontally centered on a letter page.
fn heading(text: &str, page: usize, size: f32, y0: f32) -> TextRun {
    let width = text.chars().count() as f32 * size * 0.5;
    let x0 = 306.0 - width / 2.0;
    TextRun::new(
        text,
        page,
        BoundingBox::new(x0, y0, x0 + width, y0 + size),
        size,
        "Helvetica-Bold",
    )
}

fn body(doc: &mut SourceDocument, page: usize, from: f32, count: usize) {
    for line in 0..count {
        let y0 = from + line as f32 * 14.0;
        doc.push_run(TextRun::new(
            "regular paragraph text continues on this line.",
            page,
            BoundingBox::new(72.0, y0, 540.0, y0 + 12.0),
            12.0,
            "Times-Roman",
        ));
    }
}

fn levels(outline: &DocumentOutline) -> Vec<HeadingLevel> {
    outline.outline.iter().map(|e| e.level).collect()
}

// ==================== Scenarios ====================

#[test]
fn test_single_prominent_run_becomes_title() {
    let mut doc = SourceDocument::new().with_page(PageInfo::letter());
    doc.push_run(heading("Quarterly Review", 0, 24.0, 72.0));
    body(&mut doc, 0, 140.0, 20);

    let report = extract_outline(&doc).unwrap();
    assert_eq!(report.outline.title, "Quarterly Review");
    assert!(report.outline.outline.is_empty());
    assert_eq!(report.title_source, TitleSource::HeadingCandidate);
    assert_eq!(report.status, ProcessingStatus::Complete);
}

#[test]
fn test_descending_sizes_give_three_levels() {
    let mut doc = SourceDocument::new().with_pages(3, PageInfo::letter());
    doc.push_run(heading("Annual Planning Report", 0, 28.0, 60.0));
    doc.push_run(heading("1. Introduction", 0, 20.0, 120.0));
    body(&mut doc, 0, 180.0, 20);
    doc.push_run(heading("2. Background", 1, 16.0, 72.0));
    body(&mut doc, 1, 130.0, 20);
    doc.push_run(heading("2.1 Scope", 2, 13.0, 72.0));
    body(&mut doc, 2, 130.0, 20);

    let report = extract_outline(&doc).unwrap();
    let outline = &report.outline;

    assert_eq!(outline.title, "Annual Planning Report");
    assert_eq!(
        levels(outline),
        vec![HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3]
    );
    let pages: Vec<usize> = outline.outline.iter().map(|e| e.page).collect();
    assert_eq!(pages, vec![1, 2, 3]);
    assert_eq!(outline.outline[0].text, "1. Introduction");
}

#[test]
fn test_numbered_headings_without_title_give_three_levels() {
    let mut doc = SourceDocument::new().with_pages(3, PageInfo::letter());
    doc.push_run(heading("1. Introduction", 0, 20.0, 72.0));
    body(&mut doc, 0, 130.0, 20);
    doc.push_run(heading("2. Background", 1, 16.0, 72.0));
    body(&mut doc, 1, 130.0, 20);
    doc.push_run(heading("2.1 Scope", 2, 13.0, 72.0));
    body(&mut doc, 2, 130.0, 20);

    let report = extract_outline(&doc).unwrap();
    let outline = &report.outline;

    // A numbered section heading is never taken as the title
    assert_eq!(outline.title, "");
    assert_eq!(
        levels(outline),
        vec![HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3]
    );
    let texts: Vec<&str> = outline.outline.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["1. Introduction", "2. Background", "2.1 Scope"]);
    let pages: Vec<usize> = outline.outline.iter().map(|e| e.page).collect();
    assert_eq!(pages, vec![1, 2, 3]);
}

#[test]
fn test_leading_deep_heading_is_not_an_orphan() {
    // Only 24pt and 13pt heading groups exist; a 13pt one comes first
    let mut doc = SourceDocument::new().with_pages(2, PageInfo::letter());
    doc.push_run(heading("Field Study Report", 0, 28.0, 60.0));
    doc.push_run(heading("A. Preface", 0, 13.0, 120.0));
    body(&mut doc, 0, 160.0, 20);
    doc.push_run(heading("1. Methods", 1, 24.0, 72.0));
    body(&mut doc, 1, 130.0, 10);
    doc.push_run(heading("1.1 Sampling", 1, 13.0, 300.0));
    body(&mut doc, 1, 340.0, 10);

    let report = extract_outline(&doc).unwrap();
    let levels = levels(&report.outline);

    assert_eq!(levels.len(), 3);
    assert_eq!(levels[0], HeadingLevel::H1);
    assert_eq!(levels[1], HeadingLevel::H1);
    // No H2 was ever seen, so the following H3 is pulled up one level
    assert_eq!(levels[2], HeadingLevel::H2);
}

#[test]
fn test_budget_exhaustion_keeps_processed_pages() {
    let mut doc = SourceDocument::new().with_pages(50, PageInfo::letter());
    doc.push_run(heading("Survey Results", 0, 28.0, 60.0));
    body(&mut doc, 0, 140.0, 20);
    for page in 1..50 {
        doc.push_run(heading(&format!("Part {}", page), page, 18.0, 72.0));
        body(&mut doc, page, 130.0, 20);
    }

    let config = OutlineConfig::default().with_max_processing_time(30.0);
    let extractor = OutlineExtractor::new(config)
        .unwrap()
        .with_clock(SteppingClock::new(Duration::from_secs(1)));
    let report = extractor.extract(&doc).unwrap();

    assert_eq!(
        report.status,
        ProcessingStatus::Degraded {
            reason: docoutline::render::DegradeReason::Timeout,
            pages_processed: 30,
            pages_total: 50,
        }
    );
    // Title detection still ran on the first page
    assert_eq!(report.outline.title, "Survey Results");
    assert_eq!(report.outline.len(), 29);
    assert!(report.outline.outline.iter().all(|e| e.page <= 30));
    assert_eq!(report.outline.outline.last().unwrap().text, "Part 29");
}

#[test]
fn test_encrypted_document_has_no_outline() {
    let mut doc = SourceDocument::new().with_page(PageInfo::letter());
    doc.push_run(heading("Secret", 0, 24.0, 72.0));
    doc.encrypted = true;

    assert!(matches!(extract_outline(&doc), Err(Error::Encrypted)));
}

// ==================== Input Limits ====================

#[test]
fn test_run_beyond_page_limit_rejected() {
    let mut doc = SourceDocument::new().with_page(PageInfo::letter());
    body(&mut doc, 0, 100.0, 3);
    doc.push_run(heading("Appendix", 50, 18.0, 72.0));

    let result = extract_outline(&doc);
    assert!(matches!(
        result,
        Err(Error::PageLimitExceeded {
            pages: 51,
            limit: 50
        })
    ));
}

#[test]
fn test_custom_page_limit() {
    let mut doc = SourceDocument::new().with_pages(5, PageInfo::letter());
    body(&mut doc, 0, 100.0, 3);

    let extractor = OutlineExtractor::new(OutlineConfig::default().with_max_pages(4)).unwrap();
    assert!(matches!(
        extractor.extract(&doc),
        Err(Error::PageLimitExceeded { pages: 5, limit: 4 })
    ));
}

// ==================== Output ====================

#[test]
fn test_output_json_shape() {
    let mut doc = SourceDocument::new().with_pages(2, PageInfo::letter());
    doc.push_run(heading("Travel Guide", 0, 28.0, 60.0));
    body(&mut doc, 0, 140.0, 20);
    doc.push_run(heading("1. Getting There", 1, 20.0, 72.0));
    body(&mut doc, 1, 130.0, 20);

    let report = extract_outline(&doc).unwrap();
    let json = report.to_json(JsonFormat::Compact).unwrap();
    assert_eq!(
        json,
        r#"{"title":"Travel Guide","outline":[{"level":"H1","text":"1. Getting There","page":2}]}"#
    );
}

#[test]
fn test_sequential_and_parallel_agree() {
    let mut doc = SourceDocument::new().with_pages(4, PageInfo::letter());
    doc.push_run(heading("Operations Manual", 0, 28.0, 60.0));
    body(&mut doc, 0, 140.0, 20);
    for page in 1..4 {
        doc.push_run(heading(&format!("{}. Chapter", page), page, 20.0, 72.0));
        body(&mut doc, page, 130.0, 8);
        doc.push_run(heading(&format!("{}.1 Details", page), page, 15.0, 260.0));
        body(&mut doc, page, 300.0, 8);
    }

    let sequential = OutlineExtractor::new(OutlineConfig::default())
        .unwrap()
        .extract(&doc)
        .unwrap()
        .to_json(JsonFormat::Compact)
        .unwrap();
    let again = OutlineExtractor::new(OutlineConfig::default())
        .unwrap()
        .extract(&doc)
        .unwrap()
        .to_json(JsonFormat::Compact)
        .unwrap();
    let parallel = OutlineExtractor::new(OutlineConfig::default().with_parallel(true))
        .unwrap()
        .extract(&doc)
        .unwrap()
        .to_json(JsonFormat::Compact)
        .unwrap();

    assert_eq!(sequential, again);
    assert_eq!(sequential, parallel);
}

#[test]
fn test_repaired_text_reaches_output() {
    let mut doc = SourceDocument::new().with_pages(2, PageInfo::letter());
    doc.push_run(heading("Design Notes", 0, 28.0, 60.0));
    body(&mut doc, 0, 140.0, 20);
    doc.push_run(heading("1. Con\u{FB01}guration\u{FFFD}", 1, 20.0, 72.0));
    body(&mut doc, 1, 130.0, 20);

    let report = extract_outline(&doc).unwrap();
    assert_eq!(report.outline.outline[0].text, "1. Configuration");
    assert_eq!(report.stats.encoding_fallbacks, 1);
}
