use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};
use crate::multimap::RangeMultimap;
use crate::types::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Plus,
    Minus,
}

/// One annotation row, before the derived structures are built.
#[derive(Debug, Clone)]
pub struct TranscriptRecord {
    pub name: String,
    pub gene: String,
    pub chrom: String,
    pub strand: Strand,
    pub tx_start: Coord,
    pub tx_end: Coord,
    pub cds_start: Coord,
    pub cds_end: Coord,
    /// Exon `i` spans `[exon_starts[i], intron_starts[i])`.
    pub exon_starts: Vec<Coord>,
    /// Intron `i` spans `[intron_starts[i], exon_starts[i + 1])`; the last entry is the transcript end.
    pub intron_starts: Vec<Coord>,
}

/// Exon/intron structure of a transcript with its lookup structures precomputed.
///
/// Immutable once built. Identity is the transcript name.
#[derive(Debug, Clone)]
pub struct Transcript {
    name: String,
    gene: String,
    chrom: String,
    strand: Strand,
    tx_start: Coord,
    tx_end: Coord,
    cds_start: Coord,
    cds_end: Coord,
    exon_starts: Vec<Coord>,
    intron_starts: Vec<Coord>,

    exon_map: RangeMultimap<Coord, usize>,
    intron_map: RangeMultimap<Coord, usize>,
    junctions: BTreeSet<Coord>,
    exon_start_set: BTreeSet<Coord>,
    intron_start_set: BTreeSet<Coord>,
}

impl Transcript {
    pub fn new(record: TranscriptRecord) -> Result<Self> {
        let TranscriptRecord {
            name,
            gene,
            chrom,
            strand,
            tx_start,
            tx_end,
            cds_start,
            cds_end,
            exon_starts,
            intron_starts,
        } = record;

        if exon_starts.is_empty() {
            return Err(Error::MalformedTranscript { name, reason: "no exons".into() });
        }
        if exon_starts.len() != intron_starts.len() {
            return Err(Error::MalformedTranscript {
                reason: format!(
                    "{} exon starts but {} intron starts",
                    exon_starts.len(),
                    intron_starts.len()
                ),
                name,
            });
        }

        let mut exon_map = RangeMultimap::new();
        for (i, (&lo, &hi)) in exon_starts.iter().zip(&intron_starts).enumerate() {
            exon_map.put(lo, hi, i)?;
        }

        let mut intron_map = RangeMultimap::new();
        for i in 0..exon_starts.len() - 1 {
            intron_map.put(intron_starts[i], exon_starts[i + 1], i)?;
        }

        let exon_start_set: BTreeSet<Coord> = exon_starts.iter().copied().collect();
        let intron_start_set: BTreeSet<Coord> = intron_starts.iter().copied().collect();
        let junctions = exon_start_set.union(&intron_start_set).copied().collect();

        Ok(Self {
            name,
            gene,
            chrom,
            strand,
            tx_start,
            tx_end,
            cds_start,
            cds_end,
            exon_starts,
            intron_starts,
            exon_map,
            intron_map,
            junctions,
            exon_start_set,
            intron_start_set,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn tx_start(&self) -> Coord {
        self.tx_start
    }

    pub fn tx_end(&self) -> Coord {
        self.tx_end
    }

    pub fn cds_start(&self) -> Coord {
        self.cds_start
    }

    pub fn cds_end(&self) -> Coord {
        self.cds_end
    }

    pub fn exon_count(&self) -> usize {
        self.exon_starts.len()
    }

    pub fn intron_count(&self) -> usize {
        self.intron_starts.len() - 1
    }

    /// `[lo, hi)` of exon `index`.
    pub fn exon(&self, index: usize) -> Option<(Coord, Coord)> {
        Some((*self.exon_starts.get(index)?, *self.intron_starts.get(index)?))
    }

    /// `[lo, hi)` of intron `index`.
    pub fn intron(&self, index: usize) -> Option<(Coord, Coord)> {
        if index >= self.intron_count() {
            return None;
        }
        Some((self.intron_starts[index], self.exon_starts[index + 1]))
    }

    pub fn intron_len(&self, index: usize) -> Option<Coord> {
        self.intron(index).map(|(lo, hi)| hi - lo)
    }

    pub fn exon_index_at(&self, pos: Coord) -> Option<usize> {
        self.exon_map.get(&pos).into_iter().min()
    }

    pub fn intron_index_at(&self, pos: Coord) -> Option<usize> {
        self.intron_map.get(&pos).into_iter().min()
    }

    /// Junction coordinates within `[lo, hi)`, ascending.
    pub fn junctions_in(&self, lo: Coord, hi: Coord) -> impl Iterator<Item = Coord> + '_ {
        let hi = hi.max(lo);
        self.junctions.range(lo..hi).copied()
    }

    pub fn has_junction_in(&self, lo: Coord, hi: Coord) -> bool {
        self.junctions_in(lo, hi).next().is_some()
    }

    /// Introns lying entirely inside `[lo, hi)`, ascending.
    pub fn introns_within(&self, lo: Coord, hi: Coord) -> Vec<usize> {
        (0..self.intron_count())
            .filter(|&i| lo <= self.intron_starts[i] && self.exon_starts[i + 1] <= hi)
            .collect()
    }

    pub fn is_exon_start(&self, pos: Coord) -> bool {
        self.exon_start_set.contains(&pos)
    }

    pub fn is_intron_start(&self, pos: Coord) -> bool {
        self.intron_start_set.contains(&pos)
    }
}

impl PartialEq for Transcript {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Transcript {}

impl Hash for Transcript {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.gene, self.name)
    }
}
