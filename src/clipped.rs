use crate::error::{Error, Result};
use crate::evaluate::EvidenceConfig;
use crate::evidence::AlignmentResult;
use crate::fasta::ReferenceSequence;
use crate::read::{AlignedRead, consumes_read};
use crate::report::Report;
use crate::sw::PairwiseAligner;
use crate::transcript::Transcript;
use crate::types::{Coord, Tid};
use noodles::sam::alignment::record::cigar::op::Kind as CigarKind;

/// Clip layout of a read, gathered in one pass over its CIGAR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClipScan {
    /// Length of a soft clip at the very start of the read.
    pub left_clip_end: Option<usize>,
    /// Read offset at which a trailing soft clip begins.
    pub right_clip_start: Option<usize>,
    pub may_indicate_removal: bool,
}

pub fn scan_clips(read: &AlignedRead, only_soft_clipped: bool) -> ClipScan {
    let mut scan = ClipScan::default();
    let mut offset = 0usize;

    for &(len, kind) in &read.cigar {
        match kind {
            CigarKind::SoftClip => {
                if offset == 0 {
                    scan.left_clip_end = Some(len as usize);
                } else {
                    scan.right_clip_start = Some(offset);
                }
                scan.may_indicate_removal = true;
            }
            CigarKind::Deletion if !only_soft_clipped => scan.may_indicate_removal = true,
            _ => {}
        }
        if consumes_read(kind) {
            offset += len as usize;
        }
    }

    scan
}

/// Tallies of one read's pass through the clipped-junction classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClipTally {
    pub accepted: usize,
    pub rejected: usize,
    pub unresolved_junctions: usize,
    pub alignment_failures: usize,
    pub reference_failures: usize,
}

/// Test every junction inside the unclipped span of `read` against each transcript and
/// record accepted alignments in `report`.
pub fn classify_clipped(
    read: &AlignedRead,
    transcripts: &[(Tid, &Transcript)],
    reference: &dyn ReferenceSequence,
    aligner: &dyn PairwiseAligner,
    config: &EvidenceConfig,
    report: &Report,
) -> ClipTally {
    let mut tally = ClipTally::default();
    let scan = scan_clips(read, config.only_soft_clipped);
    if !scan.may_indicate_removal {
        return tally;
    }

    let span_start = read.unclipped_start();
    let span_end = read.unclipped_end();

    for &(tid, transcript) in transcripts {
        for junction in transcript.junctions_in(span_start, span_end) {
            match evaluate_junction(read, &scan, transcript, junction, reference, aligner, config) {
                Ok(Some((intron, result))) => {
                    tracing::trace!(read = %read.name, transcript = %transcript, intron, "intron considered removed");
                    report.add_alignment_evidence(tid, intron, result);
                    tally.accepted += 1;
                }
                Ok(None) => tally.rejected += 1,
                Err(err @ Error::UnresolvedJunction { .. }) => {
                    tracing::trace!(error = %err, "junction skipped");
                    tally.unresolved_junctions += 1;
                }
                Err(err @ Error::AlignmentUnavailable(_)) => {
                    tracing::debug!(read = %read.name, error = %err, "junction skipped");
                    tally.alignment_failures += 1;
                }
                Err(err) => {
                    tracing::debug!(read = %read.name, error = %err, "junction skipped");
                    tally.reference_failures += 1;
                }
            }
        }
    }

    tally
}

/// Decide whether the part of `read` beyond `junction` belongs to the neighbouring exon.
///
/// `Ok(None)` means the junction was examined and carries no evidence. Errors are scoped
/// to this junction only.
pub fn evaluate_junction(
    read: &AlignedRead,
    scan: &ClipScan,
    transcript: &Transcript,
    junction: Coord,
    reference: &dyn ReferenceSequence,
    aligner: &dyn PairwiseAligner,
    config: &EvidenceConfig,
) -> Result<Option<(usize, AlignmentResult)>> {
    let exon_start = transcript.is_exon_start(junction);
    let unresolved = || Error::UnresolvedJunction {
        read: read.name.clone(),
        junction,
    };

    let junction_offset = match read.read_offset_at(junction) {
        Some(offset) => offset,
        None => match (scan.left_clip_end, scan.right_clip_start) {
            (Some(left), _) if exon_start => left,
            (_, Some(right)) if transcript.is_intron_start(junction) => right,
            _ => return Err(unresolved()),
        },
    };
    if junction_offset > read.sequence.len() {
        return Err(unresolved());
    }

    let (floating, intron, fetch_lo, fetch_hi) = if exon_start {
        let floating = &read.sequence[..junction_offset];
        let Some(exon) = transcript.exon_index_at(junction) else {
            return Ok(None);
        };
        // The first exon has no upstream intron to remove.
        if exon == 0 {
            return Ok(None);
        }
        let intron = exon - 1;
        let Some((_, exon_end)) = transcript.exon(intron) else {
            return Ok(None);
        };
        let lo = exon_end - floating.len() as Coord - config.upstream_exon_margin;
        (floating, intron, lo, exon_end)
    } else {
        let floating = &read.sequence[junction_offset..];
        // The transcript end is an intron start with no intron behind it.
        let Some(intron) = transcript.intron_index_at(junction) else {
            return Ok(None);
        };
        let Some((exon_start, _)) = transcript.exon(intron + 1) else {
            return Ok(None);
        };
        let hi = exon_start + floating.len() as Coord + config.downstream_exon_margin;
        (floating, intron, exon_start, hi)
    };

    let intron_len = transcript.intron_len(intron).unwrap_or(0);
    if floating.len() < config.min_floating_len || intron_len < config.min_intron_len {
        return Ok(None);
    }

    let neighbour = reference.fetch(transcript.chrom(), fetch_lo.max(1), fetch_hi)?;
    let alignment = aligner.align(floating, &neighbour)?;

    let required = config.min_identity_fraction * floating.len() as f64;
    if alignment.identical < config.min_identical || (alignment.identical as f64) < required {
        tracing::trace!(
            read = %read.name,
            intron,
            identical = alignment.identical,
            floating = floating.len(),
            "alignment too weak"
        );
        return Ok(None);
    }

    Ok(Some((
        intron,
        AlignmentResult {
            read_name: read.name.clone(),
            read_contig: read.contig.clone(),
            read_position: read.start,
            aligned_query: alignment.aligned_query,
            aligned_target: alignment.aligned_target,
            identical_count: alignment.identical,
            length: floating.len(),
        },
    )))
}
