mod common;

use pseudogene_rs::sw::nuc_score;
use pseudogene_rs::{Error, LocalAligner, PairwiseAligner};
use test_case::test_case;

#[test]
fn identical_sequences_align_end_to_end() {
    let seq = common::random_bases(40, 3);
    let aln = LocalAligner::default().align(&seq, &seq).unwrap();
    assert_eq!(aln.identical, 40);
    assert_eq!(aln.length, 40);
    assert_eq!(aln.score, 200);
    assert_eq!(aln.aligned_query, aln.aligned_target);
}

#[test]
fn query_found_inside_longer_target() {
    let target = common::random_bases(120, 5);
    let query = target[50..75].to_vec();
    let aln = LocalAligner::default().align(&query, &target).unwrap();
    assert_eq!(aln.identical, 25);
    assert_eq!(aln.aligned_query.as_bytes(), query.as_slice());
}

#[test]
fn single_base_deletion_opens_one_gap() {
    let target = common::random_bases(30, 11);
    let mut query = target[..15].to_vec();
    query.extend_from_slice(&target[16..]);

    let aln = LocalAligner::default().align(&query, &target).unwrap();
    assert_eq!(aln.identical, 29);
    assert_eq!(aln.length, 30);
    assert_eq!(aln.aligned_query.matches('-').count(), 1);
    assert!(!aln.aligned_target.contains('-'));
    // 29 matches at +5, one gap costing open + extend.
    assert_eq!(aln.score, 29 * 5 - 7);
}

#[test]
fn lowercase_input_is_normalised() {
    let aln = LocalAligner::default().align(b"acgtacgtac", b"ACGTACGTAC").unwrap();
    assert_eq!(aln.identical, 10);
    assert_eq!(aln.aligned_query, "ACGTACGTAC");
}

#[test]
fn empty_input_is_unavailable() {
    let aligner = LocalAligner::default();
    assert!(matches!(aligner.align(b"", b"ACGT"), Err(Error::AlignmentUnavailable(_))));
    assert!(matches!(aligner.align(b"ACGT", b""), Err(Error::AlignmentUnavailable(_))));
}

#[test]
fn unrelated_sequences_score_nothing() {
    let aln = LocalAligner::default().align(b"AAAAAAAA", b"CCCCCCCC").unwrap();
    assert_eq!(aln.score, 0);
    assert_eq!(aln.identical, 0);
    assert_eq!(aln.length, 0);
}

#[test_case(b'A', b'A' => 5)]
#[test_case(b'A', b'T' => -4)]
#[test_case(b'a', b'A' => 5; "lowercase")]
#[test_case(b'U', b'T' => 5; "uracil")]
#[test_case(b'A', b'W' => 1; "ambiguity code")]
#[test_case(b'N', b'G' => -2)]
#[test_case(b'Z', b'A' => -2; "unknown symbol reads as N")]
fn nucleotide_scores(a: u8, b: u8) -> i32 {
    nuc_score(a, b)
}
