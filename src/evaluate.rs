use crate::clipped::{self, ClipTally};
use crate::discordance;
use crate::error::Error;
use crate::fasta::ReferenceSequence;
use crate::genome_index::TranscriptIndex;
use crate::insert_size;
use crate::position::GenomicPosition;
use crate::read::AlignedRead;
use crate::report::Report;
use crate::sw::PairwiseAligner;
use crate::transcript::Transcript;
use crate::types::{Coord, Tid};

/// Tunable constants of the three evidence classifiers.
#[derive(Debug, Clone)]
pub struct EvidenceConfig {
    /// Ignore deletions; only soft clips can point at a removed intron.
    pub only_soft_clipped: bool,
    pub omit_duplicates: bool,

    pub min_floating_len: usize,
    pub min_intron_len: Coord,
    pub min_identical: usize,
    pub min_identity_fraction: f64,
    /// Extra reference bases fetched before the end of the upstream exon.
    pub upstream_exon_margin: Coord,
    /// Extra reference bases fetched after the start of the downstream exon.
    pub downstream_exon_margin: Coord,

    pub normal_insert_min: i64,
    pub normal_insert_max: i64,
    /// Pairs at or above this size are left to structural-variant callers.
    pub max_insert_size: i64,
    pub boundary_grace: Coord,
    pub nominal_read_len: Coord,

    pub discordant_distance: Coord,
    pub known_locus_radius: Coord,
}

impl EvidenceConfig {
    /// Parameters for 2x101 paired-end libraries.
    pub fn paired_short_read() -> Self {
        Self {
            only_soft_clipped: false,
            omit_duplicates: false,
            min_floating_len: 5,
            min_intron_len: 10,
            min_identical: 5,
            min_identity_fraction: 0.90,
            upstream_exon_margin: 10,
            downstream_exon_margin: 5,
            normal_insert_min: 120,
            normal_insert_max: 550,
            max_insert_size: 100_000,
            boundary_grace: 3,
            nominal_read_len: 101,
            discordant_distance: 20_000,
            known_locus_radius: 100,
        }
    }
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self::paired_short_read()
    }
}

/// What the classifiers produced for one read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadTally {
    pub transcripts: usize,
    pub clip: ClipTally,
    pub insert_size_evidence: usize,
    pub inconsistent_span: bool,
    pub discordance_evidence: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Duplicate,
    Unmapped,
    /// Unclipped start lies past the unclipped end.
    InvalidSpan,
    NoTranscript,
    Analyzed(ReadTally),
}

/// Runs every classifier over one read at a time. Shared by reference across workers.
pub struct ReadAnalyzer<'a> {
    pub index: &'a TranscriptIndex,
    pub reference: &'a dyn ReferenceSequence,
    pub aligner: &'a dyn PairwiseAligner,
    pub config: &'a EvidenceConfig,
    pub report: &'a Report,
}

impl<'a> ReadAnalyzer<'a> {
    pub fn new(
        index: &'a TranscriptIndex,
        reference: &'a dyn ReferenceSequence,
        aligner: &'a dyn PairwiseAligner,
        config: &'a EvidenceConfig,
        report: &'a Report,
    ) -> Self {
        Self { index, reference, aligner, config, report }
    }

    /// Transcripts whose span contains either unclipped end of `read`, ascending.
    pub fn transcripts_for(&self, read: &AlignedRead) -> Vec<(Tid, &'a Transcript)> {
        let start = GenomicPosition::new(read.contig.as_str(), read.unclipped_start());
        let end = GenomicPosition::new(read.contig.as_str(), read.unclipped_end());
        let mut tids: Vec<Tid> = self.index.covering_endpoints(&start, &end).into_iter().collect();
        tids.sort_unstable();
        tids.into_iter().map(|tid| (tid, self.index.transcript(tid))).collect()
    }

    pub fn analyze(&self, read: &AlignedRead) -> ReadOutcome {
        if self.config.omit_duplicates && read.is_duplicate {
            return ReadOutcome::Duplicate;
        }
        if read.is_unmapped {
            return ReadOutcome::Unmapped;
        }
        if read.unclipped_start() > read.unclipped_end() {
            tracing::warn!(
                read = %read.name,
                start = read.unclipped_start(),
                end = read.unclipped_end(),
                "unclipped start past unclipped end; read skipped"
            );
            return ReadOutcome::InvalidSpan;
        }

        let transcripts = self.transcripts_for(read);
        if transcripts.is_empty() {
            return ReadOutcome::NoTranscript;
        }
        let tids: Vec<Tid> = transcripts.iter().map(|(tid, _)| *tid).collect();

        let mut tally = ReadTally {
            transcripts: transcripts.len(),
            ..ReadTally::default()
        };

        tally.clip = clipped::classify_clipped(
            read,
            &transcripts,
            self.reference,
            self.aligner,
            self.config,
            self.report,
        );

        match insert_size::classify_insert_size(read, &transcripts, self.config, self.report) {
            Ok(recorded) => tally.insert_size_evidence = recorded,
            Err(err @ Error::InconsistentReadSpan { .. }) => {
                tracing::trace!(error = %err, "insert size analysis skipped");
                tally.inconsistent_span = true;
            }
            Err(err) => tracing::debug!(read = %read.name, error = %err, "insert size analysis failed"),
        }

        tally.discordance_evidence =
            discordance::classify_discordance(read, &tids, self.config, self.report);

        ReadOutcome::Analyzed(tally)
    }
}
