use coitrees::{BasicCOITree, Interval, IntervalTree};
use std::collections::BTreeSet;

use crate::annotation::{NamedInterval, PseudogeneAnnotation, RetroelementAnnotation};
use crate::evaluate::EvidenceConfig;
use crate::evidence::{MateLocation, ReadSummary};
use crate::position::GenomicPosition;
use crate::read::AlignedRead;
use crate::report::Report;
use crate::types::{Coord, HashMap, HashMapExt, HashSet, Tid};

#[derive(Debug, Clone, Copy, Default)]
struct LocusData {
    name_idx: u32,
}

fn saturate_i32(coord: Coord) -> i32 {
    i32::try_from(coord).unwrap_or(if coord < 0 { i32::MIN } else { i32::MAX })
}

/// Named closed intervals, one interval tree per chromosome.
pub struct LocusIndex {
    names: Vec<String>,
    trees: HashMap<String, BasicCOITree<LocusData, u32>>,
}

impl LocusIndex {
    pub fn build(loci: &[NamedInterval]) -> Self {
        let mut names = Vec::with_capacity(loci.len());
        let mut by_chrom: HashMap<String, Vec<Interval<LocusData>>> = HashMap::new();

        for locus in loci {
            if locus.start.chrom() != locus.end.chrom() {
                tracing::warn!(name = %locus.name, start = %locus.start, end = %locus.end, "locus spans chromosomes; skipped");
                continue;
            }
            let (first, last) = if locus.start.coord() <= locus.end.coord() {
                (locus.start.coord(), locus.end.coord())
            } else {
                (locus.end.coord(), locus.start.coord())
            };
            let (Ok(first), Ok(last)) = (i32::try_from(first), i32::try_from(last)) else {
                tracing::warn!(name = %locus.name, start = %locus.start, end = %locus.end, "locus coordinates out of range; skipped");
                continue;
            };
            let data = LocusData { name_idx: names.len() as u32 };
            names.push(locus.name.clone());
            // COITree intervals are end-inclusive, like the loci themselves.
            by_chrom
                .entry(locus.start.chrom().to_string())
                .or_default()
                .push(Interval::new(first, last, data));
        }

        let trees = by_chrom
            .into_iter()
            .map(|(chrom, intervals)| (chrom, BasicCOITree::new(&intervals)))
            .collect();

        Self { names, trees }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names of loci intersecting the closed window `[lo, hi]` on `chrom`.
    pub fn overlapping(&self, chrom: &str, lo: Coord, hi: Coord) -> BTreeSet<String> {
        let mut hits = BTreeSet::new();
        let Some(tree) = self.trees.get(chrom) else {
            return hits;
        };
        // Every stored locus fits in i32, so saturating the window loses no hits.
        tree.query(saturate_i32(lo), saturate_i32(hi), |node| {
            if let Some(name) = self.names.get(node.metadata.name_idx as usize) {
                hits.insert(name.clone());
            }
        });
        hits
    }
}

/// Known pseudogene and retro-element loci, consulted when summarising discordant mates.
pub struct KnownLoci {
    pseudogenes: LocusIndex,
    retroelements: LocusIndex,
    reference_pseudogene_genes: HashSet<String>,
    curated_retrogenes: HashSet<String>,
    radius: Coord,
}

impl KnownLoci {
    pub fn new(
        pseudogenes: PseudogeneAnnotation,
        retroelements: RetroelementAnnotation,
        radius: Coord,
    ) -> Self {
        Self {
            pseudogenes: LocusIndex::build(&pseudogenes.intervals),
            retroelements: LocusIndex::build(&retroelements.intervals),
            reference_pseudogene_genes: pseudogenes.genes,
            curated_retrogenes: retroelements.genes,
            radius,
        }
    }

    pub fn empty(radius: Coord) -> Self {
        Self::new(PseudogeneAnnotation::default(), RetroelementAnnotation::default(), radius)
    }

    pub fn pseudogene_count(&self) -> usize {
        self.pseudogenes.len()
    }

    pub fn retroelement_count(&self) -> usize {
        self.retroelements.len()
    }

    pub fn pseudogenes_near(&self, position: &GenomicPosition) -> BTreeSet<String> {
        self.pseudogenes.overlapping(
            position.chrom(),
            position.coord() - self.radius,
            position.coord() + self.radius,
        )
    }

    pub fn retroelements_near(&self, position: &GenomicPosition) -> BTreeSet<String> {
        self.retroelements.overlapping(
            position.chrom(),
            position.coord() - self.radius,
            position.coord() + self.radius,
        )
    }

    pub fn is_reference_pseudogene(&self, gene: &str) -> bool {
        self.reference_pseudogene_genes.contains(gene)
    }

    pub fn is_curated_retrogene(&self, gene: &str) -> bool {
        self.curated_retrogenes.contains(gene)
    }
}

/// Where the mate of `read` landed, if the pair is discordant.
///
/// A mapped mate is discordant when it lies on another chromosome or more than
/// `discordant_distance` bases away; an unmapped mate always is.
pub fn mate_location(read: &AlignedRead, config: &EvidenceConfig) -> Option<MateLocation> {
    if !read.is_paired {
        return None;
    }
    if read.mate_unmapped {
        return Some(MateLocation::Unresolved);
    }
    let mate_contig = read.mate_contig.as_deref()?;
    let distance = (read.start - read.mate_start).abs();
    if mate_contig != read.contig || distance > config.discordant_distance {
        return Some(MateLocation::Resolved(GenomicPosition::new(mate_contig, read.mate_start)));
    }
    None
}

/// Cluster a discordant read under its mate location for every overlapping transcript.
/// Returns the number of transcripts that received evidence.
pub fn classify_discordance(
    read: &AlignedRead,
    tids: &[Tid],
    config: &EvidenceConfig,
    report: &Report,
) -> usize {
    let Some(location) = mate_location(read, config) else {
        return 0;
    };
    for &tid in tids {
        report.add_discordance_evidence(
            tid,
            location.clone(),
            ReadSummary::new(read.name.as_str(), read.contig.as_str(), read.start),
        );
    }
    tracing::trace!(read = %read.name, ?location, transcripts = tids.len(), "discordant mate");
    tids.len()
}
