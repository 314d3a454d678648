use crate::error::Result;
use crate::multimap::RangeMultimap;
use crate::position::GenomicPosition;
use crate::transcript::{Transcript, TranscriptRecord};
use crate::types::{HashMap, HashSet, Tid};

/// Transcripts addressable by `Tid`, plus a `(chromosome, coordinate)` multimap from
/// transcript spans to the transcripts covering them.
///
/// Records sharing a transcript name (pseudoautosomal copies, alt haplotypes) are one
/// transcript for evidence purposes: each `Tid` resolves to the first `Tid` inserted
/// under its name.
///
/// Built once before any read is processed and only read afterwards.
#[derive(Debug, Default)]
pub struct TranscriptIndex {
    transcripts: Vec<Transcript>,
    canonical: Vec<Tid>,
    first_by_name: HashMap<String, Tid>,
    spans: RangeMultimap<GenomicPosition, Tid>,
}

impl TranscriptIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(records: impl IntoIterator<Item = TranscriptRecord>) -> Result<Self> {
        let mut index = Self::new();
        for record in records {
            index.insert(Transcript::new(record)?)?;
        }
        Ok(index)
    }

    pub fn insert(&mut self, transcript: Transcript) -> Result<Tid> {
        let tid = self.transcripts.len() as Tid;
        self.spans.put(
            GenomicPosition::new(transcript.chrom(), transcript.tx_start()),
            GenomicPosition::new(transcript.chrom(), transcript.tx_end()),
            tid,
        )?;
        let canonical = *self
            .first_by_name
            .entry(transcript.name().to_string())
            .or_insert(tid);
        self.canonical.push(canonical);
        self.transcripts.push(transcript);
        Ok(tid)
    }

    /// The `Tid` that carries evidence for every record named like `tid`.
    pub fn canonical(&self, tid: Tid) -> Tid {
        self.canonical.get(tid as usize).copied().unwrap_or(tid)
    }

    pub fn transcript(&self, tid: Tid) -> &Transcript {
        &self.transcripts[tid as usize]
    }

    pub fn transcripts(&self) -> impl Iterator<Item = (Tid, &Transcript)> {
        self.transcripts
            .iter()
            .enumerate()
            .map(|(i, tx)| (i as Tid, tx))
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    /// Transcripts whose span contains `pos`.
    pub fn at(&self, pos: &GenomicPosition) -> HashSet<Tid> {
        self.spans.get(pos)
    }

    /// Transcripts whose span contains either read endpoint.
    pub fn covering_endpoints(&self, start: &GenomicPosition, end: &GenomicPosition) -> HashSet<Tid> {
        let mut tids = self.spans.get(start);
        tids.extend(self.spans.get(end));
        tids
    }

    /// Transcripts whose span intersects `[lo, hi)`.
    pub fn overlapping(&self, lo: &GenomicPosition, hi: &GenomicPosition) -> HashSet<Tid> {
        self.spans.get_range(lo, hi)
    }
}
