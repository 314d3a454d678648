mod common;

use pseudogene_rs::{Error, GenomicPosition, Transcript};
use std::collections::BTreeSet;

fn small() -> Transcript {
    Transcript::new(common::record("NM_SMALL", "SMALL", vec![100, 300, 600], vec![250, 500, 700]))
        .expect("valid transcript")
}

#[test]
fn structure_queries() {
    let tx = small();
    assert_eq!(tx.intron_count(), 2);
    assert_eq!(tx.exon_count(), 3);
    assert_eq!(tx.exon_index_at(150), Some(0));
    assert_eq!(tx.intron_index_at(260), Some(0));
    assert_eq!(tx.exon_index_at(260), None);
    assert_eq!(tx.intron_index_at(550), Some(1));
    assert_eq!(tx.intron_index_at(650), None);
    assert_eq!(tx.intron(1), Some((500, 600)));
    assert_eq!(tx.intron_len(0), Some(50));
    assert_eq!(tx.intron(2), None);
}

#[test]
fn junctions_within_half_open_range() {
    let tx = small();
    let all: Vec<i64> = tx.junctions_in(90, 700).collect();
    assert_eq!(all, vec![100, 250, 300, 500, 600]);

    let inner: Vec<i64> = tx.junctions_in(250, 500).collect();
    assert_eq!(inner, vec![250, 300]);
    assert!(!tx.has_junction_in(101, 250));
    assert!(tx.junctions_in(500, 400).next().is_none());
}

#[test]
fn start_membership() {
    let tx = small();
    assert!(tx.is_exon_start(300));
    assert!(!tx.is_exon_start(250));
    assert!(tx.is_intron_start(250));
    assert!(tx.is_intron_start(700));
    assert!(!tx.is_intron_start(301));
}

#[test]
fn introns_enclosed_by_range() {
    let tx = small();
    assert_eq!(tx.introns_within(200, 650), vec![0, 1]);
    assert_eq!(tx.introns_within(260, 650), vec![1]);
    assert!(tx.introns_within(260, 590).is_empty());
}

#[test]
fn mismatched_lists_are_malformed() {
    let err = Transcript::new(common::record("NM_BAD", "BAD", vec![100, 300], vec![250])).unwrap_err();
    assert!(matches!(err, Error::MalformedTranscript { .. }));
}

#[test]
fn identity_is_the_name() {
    let a = small();
    let b = Transcript::new(common::record("NM_SMALL", "OTHER", vec![1, 10], vec![5, 20])).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "SMALL:NM_SMALL");
}

#[test]
fn index_finds_transcripts_by_endpoint() {
    let index = common::index_of(vec![
        common::three_exon_record(),
        common::record("NM_0002", "GENE2", vec![2200, 2600], vec![2400, 3000]),
    ]);
    assert_eq!(index.len(), 2);

    let at = |coord| -> BTreeSet<u32> { index.at(&GenomicPosition::new(common::CHROM, coord)).into_iter().collect() };
    assert_eq!(at(999), BTreeSet::new());
    assert_eq!(at(1000), BTreeSet::from([0]));
    assert_eq!(at(2250), BTreeSet::from([0, 1]));
    assert_eq!(at(2300), BTreeSet::from([1]));
    assert!(index.at(&GenomicPosition::new("chr2", 1500)).is_empty());

    let covering: BTreeSet<u32> = index
        .covering_endpoints(
            &GenomicPosition::new(common::CHROM, 1100),
            &GenomicPosition::new(common::CHROM, 2700),
        )
        .into_iter()
        .collect();
    assert_eq!(covering, BTreeSet::from([0, 1]));

    let overlapping: BTreeSet<u32> = index
        .overlapping(
            &GenomicPosition::new(common::CHROM, 0),
            &GenomicPosition::new(common::CHROM, 1001),
        )
        .into_iter()
        .collect();
    assert_eq!(overlapping, BTreeSet::from([0]));
}

#[test]
fn chromosomes_order_naturally() {
    let mut positions = vec![
        GenomicPosition::new("chr10", 5),
        GenomicPosition::new("chr2", 100),
        GenomicPosition::new("chr2", 7),
        GenomicPosition::new("chrX", 1),
        GenomicPosition::new("chr1", 9),
    ];
    positions.sort();
    let rendered: Vec<String> = positions.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["chr1:9", "chr2:7", "chr2:100", "chr10:5", "chrX:1"]);
}
