mod common;

use pseudogene_rs::insert_size::{classify_insert_size, is_unusual, read_span};
use pseudogene_rs::{AlignedRead, Error, EvidenceConfig, Report, TranscriptIndex};
use test_case::test_case;

fn setup() -> (TranscriptIndex, Report) {
    let index = common::index_of(vec![common::three_exon_record()]);
    let report = Report::new(&index);
    (index, report)
}

fn classify(index: &TranscriptIndex, report: &Report, read: &AlignedRead) -> pseudogene_rs::Result<usize> {
    let transcripts = vec![(0, index.transcript(0))];
    classify_insert_size(read, &transcripts, &EvidenceConfig::default(), report)
}

#[test]
fn insert_explained_by_one_intron_is_evidence() {
    let (index, report) = setup();
    // Mates in exon 0 and exon 1; 800 - 300 bp intron = 500.
    let read = common::paired("pair", 1050, common::CHROM, 1600, 800);

    assert_eq!(classify(&index, &report, &read).unwrap(), 1);
    let stats = report.stats(0).expect("evidence recorded");
    assert_eq!(stats.insert_size_reads(0), 1);
    assert_eq!(stats.insert_size_reads(1), 0);
}

#[test]
fn insert_still_unusual_after_removal_is_not_evidence() {
    let (index, report) = setup();
    let read = common::paired("pair", 1050, common::CHROM, 1600, 1200);

    assert_eq!(classify(&index, &report, &read).unwrap(), 0);
    assert!(report.stats(0).is_none());
}

#[test]
fn reverse_mate_anchors_on_the_mate() {
    let (index, report) = setup();
    let read = common::paired("pair", 1600, common::CHROM, 1050, -800);

    assert_eq!(read_span(&read, &EvidenceConfig::default()).unwrap(), (1148, 1603));
    assert_eq!(classify(&index, &report, &read).unwrap(), 1);
}

#[test]
fn overlapping_mates_have_no_consistent_span() {
    let (index, report) = setup();
    let read = common::paired("pair", 1050, common::CHROM, 1080, 700);

    let err = classify(&index, &report, &read).unwrap_err();
    assert!(matches!(err, Error::InconsistentReadSpan { .. }));
}

#[test]
fn same_read_counts_once_per_intron() {
    let (index, report) = setup();
    let read = common::paired("pair", 1050, common::CHROM, 1600, 800);
    classify(&index, &report, &read).unwrap();
    classify(&index, &report, &read).unwrap();
    assert_eq!(report.stats(0).unwrap().insert_size_reads(0), 1);
}

#[test_case(0; "zero")]
#[test_case(300; "normal")]
#[test_case(120; "lower bound")]
#[test_case(550; "upper bound")]
#[test_case(100_000; "structural variant")]
#[test_case(250_000; "far beyond")]
fn insert_sizes_without_evidence(insert_size: i64) {
    let (index, report) = setup();
    let read = common::paired("pair", 1050, common::CHROM, 1600, insert_size);
    assert_eq!(classify(&index, &report, &read).unwrap(), 0);
}

#[test]
fn mate_on_other_chromosome_is_skipped() {
    let (index, report) = setup();
    let read = common::paired("pair", 1050, "chr2", 1600, 800);
    assert_eq!(classify(&index, &report, &read).unwrap(), 0);
}

#[test_case(119 => true)]
#[test_case(120 => false)]
#[test_case(550 => false)]
#[test_case(551 => true)]
fn unusual_bounds(insert_size: i64) -> bool {
    is_unusual(insert_size, &EvidenceConfig::default())
}
