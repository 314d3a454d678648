use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use crate::position::GenomicPosition;
use crate::types::Coord;

/// A floating read fragment that aligned well enough to the neighbouring exon.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlignmentResult {
    pub read_name: String,
    pub read_contig: String,
    pub read_position: Coord,
    pub aligned_query: String,
    pub aligned_target: String,
    pub identical_count: usize,
    /// Length of the floating fragment.
    pub length: usize,
}

/// Identity of a read contributing evidence. Bases are optional and excluded from
/// equality so they can be attached after the fact.
#[derive(Debug, Clone)]
pub struct ReadSummary {
    pub name: String,
    pub contig: String,
    pub position: Coord,
    pub bases: Option<String>,
}

impl ReadSummary {
    pub fn new(name: impl Into<String>, contig: impl Into<String>, position: Coord) -> Self {
        Self {
            name: name.into(),
            contig: contig.into(),
            position,
            bases: None,
        }
    }

    fn key(&self) -> (&str, &str, Coord) {
        (&self.name, &self.contig, self.position)
    }
}

impl PartialEq for ReadSummary {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ReadSummary {}

impl Hash for ReadSummary {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Ord for ReadSummary {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for ReadSummary {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Where the mate of a discordant read landed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MateLocation {
    Resolved(GenomicPosition),
    /// Mate is unmapped.
    Unresolved,
}

/// Discordant reads clustered by the location of their mates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionWithEvidence {
    pub location: MateLocation,
    pub reads: BTreeSet<ReadSummary>,
}

impl PositionWithEvidence {
    pub fn new(location: MateLocation) -> Self {
        Self { location, reads: BTreeSet::new() }
    }

    /// Returns false if the read was already recorded here.
    pub fn insert(&mut self, read: ReadSummary) -> bool {
        self.reads.insert(read)
    }

    pub fn read_count(&self) -> usize {
        self.reads.len()
    }

    /// Attach `bases` to every recorded read named `read_name`.
    pub fn attach_bases(&mut self, read_name: &str, bases: &str) -> bool {
        if !self.reads.iter().any(|r| r.name == read_name) {
            return false;
        }
        self.reads = std::mem::take(&mut self.reads)
            .into_iter()
            .map(|mut r| {
                if r.name == read_name {
                    r.bases = Some(bases.to_string());
                }
                r
            })
            .collect();
        true
    }
}

/// Per-intron evidence tallies of one transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntronData {
    pub index: usize,
    pub reads_supporting_removal_by_insert_size: usize,
    pub reads_supporting_removal_by_alignment: usize,
    pub alignment_results: Vec<AlignmentResult>,
}
