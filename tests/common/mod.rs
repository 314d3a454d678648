#![allow(dead_code)]

use noodles::sam::alignment::record::cigar::op::Kind as CigarKind;
use pseudogene_rs::{AlignedRead, Coord, FastaDb, Strand, TranscriptIndex, TranscriptRecord};

pub const CHROM: &str = "chr1";

/// Three exons: [1000,1200), [1500,1800), [2000,2300).
/// Intron 0 is [1200,1500) (300 bp), intron 1 is [1800,2000) (200 bp).
pub fn three_exon_record() -> TranscriptRecord {
    TranscriptRecord {
        name: "NM_0001".into(),
        gene: "GENE1".into(),
        chrom: CHROM.into(),
        strand: Strand::Plus,
        tx_start: 1000,
        tx_end: 2300,
        cds_start: 1000,
        cds_end: 2300,
        exon_starts: vec![1000, 1500, 2000],
        intron_starts: vec![1200, 1800, 2300],
    }
}

pub fn record(name: &str, gene: &str, exon_starts: Vec<Coord>, intron_starts: Vec<Coord>) -> TranscriptRecord {
    TranscriptRecord {
        name: name.into(),
        gene: gene.into(),
        chrom: CHROM.into(),
        strand: Strand::Plus,
        tx_start: exon_starts[0],
        tx_end: *intron_starts.last().unwrap(),
        cds_start: exon_starts[0],
        cds_end: *intron_starts.last().unwrap(),
        exon_starts,
        intron_starts,
    }
}

pub fn index_of(records: Vec<TranscriptRecord>) -> TranscriptIndex {
    TranscriptIndex::build(records).expect("valid transcripts")
}

/// Deterministic pseudo-random ACGT sequence.
pub fn random_bases(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            b"ACGT"[((state >> 33) % 4) as usize]
        })
        .collect()
}

pub fn reference(len: usize) -> (FastaDb, Vec<u8>) {
    let bases = random_bases(len, 17);
    (FastaDb::from_sequences([(CHROM.to_string(), bases.clone())]), bases)
}

/// Reference bases of the closed 1-based interval `[start, end]`.
pub fn slice(bases: &[u8], start: Coord, end: Coord) -> Vec<u8> {
    bases[(start - 1) as usize..end as usize].to_vec()
}

pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        _ => b'C',
    }
}

pub fn read(name: &str, start: Coord, cigar: &[(u32, CigarKind)], sequence: Vec<u8>) -> AlignedRead {
    AlignedRead {
        name: name.into(),
        contig: CHROM.into(),
        start,
        cigar: cigar.to_vec(),
        sequence,
        ..AlignedRead::default()
    }
}

pub fn paired(name: &str, start: Coord, mate_contig: &str, mate_start: Coord, insert_size: i64) -> AlignedRead {
    AlignedRead {
        name: name.into(),
        contig: CHROM.into(),
        start,
        cigar: vec![(100, CigarKind::Match)],
        sequence: vec![b'A'; 100],
        is_paired: true,
        mate_contig: Some(mate_contig.into()),
        mate_start,
        insert_size,
        ..AlignedRead::default()
    }
}
