use dashmap::mapref::one::Ref;
use dashmap::{DashMap, DashSet};

use crate::evidence::{AlignmentResult, IntronData, MateLocation, PositionWithEvidence, ReadSummary};
use crate::genome_index::TranscriptIndex;
use crate::types::{HashSet, HashSetExt, Tid};

/// Evidence collected for one transcript, keyed by intron index.
///
/// Insertion is safe from any number of threads; the fractions are meant to be read once
/// all reads have been processed.
#[derive(Debug)]
pub struct TranscriptStats {
    intron_count: usize,
    by_insert_size: DashMap<usize, DashSet<ReadSummary>>,
    by_alignment: DashMap<usize, DashSet<AlignmentResult>>,
}

impl TranscriptStats {
    pub fn new(intron_count: usize) -> Self {
        Self {
            intron_count,
            by_insert_size: DashMap::new(),
            by_alignment: DashMap::new(),
        }
    }

    pub fn intron_count(&self) -> usize {
        self.intron_count
    }

    pub fn add_insert_size(&self, intron: usize, read: ReadSummary) {
        self.by_insert_size.entry(intron).or_default().insert(read);
    }

    pub fn add_alignment(&self, intron: usize, result: AlignmentResult) {
        self.by_alignment.entry(intron).or_default().insert(result);
    }

    fn covered<V>(&self, map: &DashMap<usize, DashSet<V>>) -> usize
    where
        V: Eq + std::hash::Hash,
    {
        map.iter()
            .filter(|e| *e.key() < self.intron_count && !e.value().is_empty())
            .count()
    }

    fn fraction(&self, covered: usize) -> f64 {
        if self.intron_count == 0 {
            return 0.0;
        }
        covered as f64 / self.intron_count as f64
    }

    pub fn fraction_covered_by_insert_size(&self) -> f64 {
        self.fraction(self.covered(&self.by_insert_size))
    }

    pub fn fraction_covered_by_clip(&self) -> f64 {
        self.fraction(self.covered(&self.by_alignment))
    }

    /// Fraction of introns carrying evidence of either kind.
    pub fn doubly_covered_fraction(&self) -> f64 {
        self.fraction(self.supported_introns().len())
    }

    /// `(either + 2 * clip + insert size) / 4`. Clip evidence is weighted twice.
    pub fn fraction_covered_combined(&self) -> f64 {
        (self.doubly_covered_fraction()
            + 2.0 * self.fraction_covered_by_clip()
            + self.fraction_covered_by_insert_size())
            / 4.0
    }

    /// Ascending indices of introns with any evidence.
    pub fn supported_introns(&self) -> Vec<usize> {
        (0..self.intron_count)
            .filter(|i| self.insert_size_reads(*i) > 0 || self.alignment_reads(*i) > 0)
            .collect()
    }

    pub fn insert_size_reads(&self, intron: usize) -> usize {
        self.by_insert_size.get(&intron).map_or(0, |set| set.len())
    }

    pub fn alignment_reads(&self, intron: usize) -> usize {
        self.by_alignment.get(&intron).map_or(0, |set| set.len())
    }

    /// Alignment records of `intron`, in a stable order.
    pub fn alignment_results(&self, intron: usize) -> Vec<AlignmentResult> {
        let mut results: Vec<AlignmentResult> = self
            .by_alignment
            .get(&intron)
            .map(|set| set.iter().map(|r| r.key().clone()).collect())
            .unwrap_or_default();
        results.sort_by(|a, b| {
            (&a.read_name, &a.read_contig, a.read_position)
                .cmp(&(&b.read_name, &b.read_contig, b.read_position))
        });
        results
    }

    pub fn supporting_intron_data(&self) -> Vec<IntronData> {
        self.supported_introns()
            .into_iter()
            .map(|index| IntronData {
                index,
                reads_supporting_removal_by_insert_size: self.insert_size_reads(index),
                reads_supporting_removal_by_alignment: self.alignment_reads(index),
                alignment_results: self.alignment_results(index),
            })
            .collect()
    }
}

/// Run-wide evidence table shared by every worker.
#[derive(Debug, Default)]
pub struct Report {
    intron_counts: Vec<usize>,
    /// `Tid` -> `Tid` of the first record with the same transcript name.
    canonical: Vec<Tid>,
    stats: DashMap<Tid, TranscriptStats>,
    discordant: DashMap<Tid, Vec<PositionWithEvidence>>,
}

impl Report {
    pub fn new(index: &TranscriptIndex) -> Self {
        Self {
            intron_counts: index.transcripts().map(|(_, tx)| tx.intron_count()).collect(),
            canonical: index.transcripts().map(|(tid, _)| index.canonical(tid)).collect(),
            stats: DashMap::new(),
            discordant: DashMap::new(),
        }
    }

    fn canonical(&self, tid: Tid) -> Tid {
        self.canonical.get(tid as usize).copied().unwrap_or(tid)
    }

    fn with_stats<R>(&self, tid: Tid, f: impl FnOnce(&TranscriptStats) -> R) -> R {
        let tid = self.canonical(tid);
        if let Some(stats) = self.stats.get(&tid) {
            return f(&stats);
        }
        let intron_count = self.intron_counts.get(tid as usize).copied().unwrap_or(0);
        let stats = self
            .stats
            .entry(tid)
            .or_insert_with(|| TranscriptStats::new(intron_count))
            .downgrade();
        f(&stats)
    }

    pub fn add_alignment_evidence(&self, tid: Tid, intron: usize, result: AlignmentResult) {
        self.with_stats(tid, |stats| stats.add_alignment(intron, result));
    }

    pub fn add_insert_size_evidence(&self, tid: Tid, intron: usize, read: ReadSummary) {
        self.with_stats(tid, |stats| stats.add_insert_size(intron, read));
    }

    /// Cluster `read` under `location` for `tid`, creating the bucket if this is the first
    /// read whose mate landed there.
    pub fn add_discordance_evidence(&self, tid: Tid, location: MateLocation, read: ReadSummary) {
        // The entry guard holds the shard lock across find-or-create.
        let mut positions = self.discordant.entry(self.canonical(tid)).or_default();
        match positions.iter_mut().find(|p| p.location == location) {
            Some(bucket) => {
                bucket.insert(read);
            }
            None => {
                let mut bucket = PositionWithEvidence::new(location);
                bucket.insert(read);
                positions.push(bucket);
            }
        }
    }

    /// Evidence of the transcript named like `tid`.
    pub fn stats(&self, tid: Tid) -> Option<Ref<'_, Tid, TranscriptStats>> {
        self.stats.get(&self.canonical(tid))
    }

    /// Transcripts with insert-size or alignment evidence, ascending.
    pub fn transcripts_with_evidence(&self) -> Vec<Tid> {
        let mut tids: Vec<Tid> = self.stats.iter().map(|e| *e.key()).collect();
        tids.sort_unstable();
        tids
    }

    /// Discordant buckets of `tid`, ordered by mate location.
    pub fn discordant_positions(&self, tid: Tid) -> Vec<PositionWithEvidence> {
        let mut positions = self
            .discordant
            .get(&self.canonical(tid))
            .map(|p| p.value().clone())
            .unwrap_or_default();
        positions.sort_by(|a, b| a.location.cmp(&b.location));
        positions
    }

    pub fn discordant_read_names(&self) -> HashSet<String> {
        let mut names = HashSet::new();
        for entry in self.discordant.iter() {
            for bucket in entry.value() {
                names.extend(bucket.reads.iter().map(|r| r.name.clone()));
            }
        }
        names
    }

    /// Attach bases to every discordant read summary named `read_name`.
    /// Returns true if at least one summary was updated.
    pub fn attach_read_bases(&self, read_name: &str, bases: &str) -> bool {
        let mut attached = false;
        for mut entry in self.discordant.iter_mut() {
            for bucket in entry.value_mut().iter_mut() {
                attached |= bucket.attach_bases(read_name, bases);
            }
        }
        attached
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty() && self.discordant.is_empty()
    }
}
