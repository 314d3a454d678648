mod common;

use pseudogene_rs::annotation::{NamedInterval, PseudogeneAnnotation, RetroelementAnnotation};
use pseudogene_rs::discordance::{classify_discordance, mate_location};
use pseudogene_rs::{AlignedRead, EvidenceConfig, GenomicPosition, KnownLoci, MateLocation, Report};
use std::collections::BTreeSet;

fn report() -> Report {
    Report::new(&common::index_of(vec![common::three_exon_record()]))
}

fn unmapped_mate(name: &str, start: i64) -> AlignedRead {
    AlignedRead {
        mate_unmapped: true,
        mate_contig: None,
        ..common::paired(name, start, common::CHROM, 0, 0)
    }
}

#[test]
fn mates_at_same_position_share_a_bucket() {
    let report = report();
    let config = EvidenceConfig::default();
    let first = common::paired("r1", 1100, "chr5", 5000, 0);
    let second = common::paired("r2", 1150, "chr5", 5000, 0);

    assert_eq!(classify_discordance(&first, &[0], &config, &report), 1);
    assert_eq!(classify_discordance(&second, &[0], &config, &report), 1);

    let positions = report.discordant_positions(0);
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].location, MateLocation::Resolved(GenomicPosition::new("chr5", 5000)));
    assert_eq!(positions[0].read_count(), 2);
}

#[test]
fn different_mate_positions_get_separate_buckets() {
    let report = report();
    let config = EvidenceConfig::default();
    classify_discordance(&common::paired("r1", 1100, "chr5", 5000, 0), &[0], &config, &report);
    classify_discordance(&common::paired("r2", 1100, "chr5", 5001, 0), &[0], &config, &report);
    assert_eq!(report.discordant_positions(0).len(), 2);
}

#[test]
fn unmapped_mates_cluster_under_unresolved() {
    let report = report();
    let config = EvidenceConfig::default();
    classify_discordance(&unmapped_mate("u1", 1100), &[0], &config, &report);
    classify_discordance(&unmapped_mate("u2", 1200), &[0], &config, &report);
    classify_discordance(&common::paired("r1", 1100, "chr5", 5000, 0), &[0], &config, &report);

    let positions = report.discordant_positions(0);
    assert_eq!(positions.len(), 2);
    // Resolved locations sort before the unmapped bucket.
    assert_eq!(positions[1].location, MateLocation::Unresolved);
    assert_eq!(positions[1].read_count(), 2);
}

#[test]
fn concordant_and_unpaired_reads_are_ignored() {
    let config = EvidenceConfig::default();
    let near = common::paired("near", 1100, common::CHROM, 1400, 400);
    assert_eq!(mate_location(&near, &config), None);

    let exactly_at_limit = common::paired("limit", 1100, common::CHROM, 21_100, 20_100);
    assert_eq!(mate_location(&exactly_at_limit, &config), None);

    let far = common::paired("far", 1100, common::CHROM, 21_101, 20_101);
    assert_eq!(
        mate_location(&far, &config),
        Some(MateLocation::Resolved(GenomicPosition::new(common::CHROM, 21_101)))
    );

    let single = AlignedRead { is_paired: false, ..far };
    assert_eq!(mate_location(&single, &config), None);
}

#[test]
fn concurrent_reads_do_not_duplicate_buckets() {
    let report = report();
    let config = EvidenceConfig::default();
    std::thread::scope(|scope| {
        for worker in 0..8 {
            let report = &report;
            let config = &config;
            scope.spawn(move || {
                for i in 0..50 {
                    let read = common::paired(&format!("w{worker}_r{i}"), 1100, "chr7", 777, 0);
                    classify_discordance(&read, &[0], config, report);
                }
            });
        }
    });
    let positions = report.discordant_positions(0);
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].read_count(), 400);
}

#[test]
fn bases_attach_on_second_pass() {
    let report = report();
    let config = EvidenceConfig::default();
    classify_discordance(&common::paired("r1", 1100, "chr5", 5000, 0), &[0], &config, &report);

    assert!(report.discordant_read_names().contains("r1"));
    assert!(report.attach_read_bases("r1", "ACGT"));
    assert!(!report.attach_read_bases("missing", "ACGT"));
    let positions = report.discordant_positions(0);
    let summary = positions[0].reads.iter().next().unwrap();
    assert_eq!(summary.bases.as_deref(), Some("ACGT"));
}

fn locus(name: &str, chrom: &str, start: i64, end: i64) -> NamedInterval {
    NamedInterval {
        name: name.into(),
        start: GenomicPosition::new(chrom, start),
        end: GenomicPosition::new(chrom, end),
    }
}

#[test]
fn known_loci_lookups() {
    let pseudogenes = PseudogeneAnnotation {
        intervals: vec![locus("uc001.1", "chr5", 4950, 4960), locus("uc002.1", "chr5", 5200, 5300)],
        genes: ["GENE1".to_string()].into_iter().collect(),
    };
    let retroelements = RetroelementAnnotation {
        intervals: vec![locus("RETRO1", "chr5", 5090, 5095)],
        genes: ["RETRO1".to_string()].into_iter().collect(),
    };
    let known = KnownLoci::new(pseudogenes, retroelements, 100);

    let position = GenomicPosition::new("chr5", 5000);
    assert_eq!(known.pseudogenes_near(&position), BTreeSet::from(["uc001.1".to_string()]));
    assert_eq!(known.retroelements_near(&position), BTreeSet::from(["RETRO1".to_string()]));
    assert!(known.pseudogenes_near(&GenomicPosition::new("chr6", 5000)).is_empty());
    // Window ends are inclusive: 5100 + 100 reaches the locus starting at 5200.
    assert_eq!(
        known.pseudogenes_near(&GenomicPosition::new("chr5", 5100)),
        BTreeSet::from(["uc002.1".to_string()])
    );

    assert!(known.is_reference_pseudogene("GENE1"));
    assert!(!known.is_reference_pseudogene("GENE2"));
    assert!(known.is_curated_retrogene("RETRO1"));
    assert!(!known.is_curated_retrogene("GENE1"));
}

#[test]
fn loci_beyond_tree_coordinates_are_skipped() {
    let huge = 5_000_000_000;
    let edge = i32::MAX as i64 - 40;
    let pseudogenes = PseudogeneAnnotation {
        intervals: vec![
            locus("too_far", "chr1", huge, huge + 10),
            locus("at_edge", "chr1", edge, edge + 20),
        ],
        genes: Default::default(),
    };
    let known = KnownLoci::new(pseudogenes, RetroelementAnnotation::default(), 100);

    assert_eq!(known.pseudogene_count(), 1);
    assert!(known.pseudogenes_near(&GenomicPosition::new("chr1", huge + 5)).is_empty());
    // The window runs past i32::MAX and still finds the locus below it.
    assert_eq!(
        known.pseudogenes_near(&GenomicPosition::new("chr1", edge + 30)),
        BTreeSet::from(["at_edge".to_string()])
    );
}
