use crate::error::{Error, Result};
use crate::evaluate::EvidenceConfig;
use crate::evidence::ReadSummary;
use crate::read::AlignedRead;
use crate::report::Report;
use crate::transcript::Transcript;
use crate::types::{Coord, Tid};

pub fn is_unusual(insert_size: i64, config: &EvidenceConfig) -> bool {
    insert_size > config.normal_insert_max || insert_size < config.normal_insert_min
}

/// Half-open reference span bridging the two mates of a pair.
///
/// Anchored at (read end, mate start) when the mate lies downstream, or at
/// (mate start + nominal read length, read start) when it lies upstream.
pub fn read_span(read: &AlignedRead, config: &EvidenceConfig) -> Result<(Coord, Coord)> {
    let grace = config.boundary_grace;
    let read_end = read.end();

    if read_end - grace < read.mate_start + grace {
        return Ok((read_end - grace, read.mate_start + grace));
    }
    let mate_end = read.mate_start + config.nominal_read_len;
    if mate_end - grace < read.start + grace {
        return Ok((mate_end - grace, read.start + grace));
    }
    Err(Error::InconsistentReadSpan {
        read: read.name.clone(),
    })
}

/// Record insert-size evidence for pairs whose anomalous fragment length is restored to
/// the normal range once the introns inside the pair span are removed.
///
/// Returns the number of transcripts that received evidence.
pub fn classify_insert_size(
    read: &AlignedRead,
    transcripts: &[(Tid, &Transcript)],
    config: &EvidenceConfig,
    report: &Report,
) -> Result<usize> {
    if !read.is_paired || read.mate_unmapped {
        return Ok(0);
    }
    if read.mate_contig.as_deref() != Some(read.contig.as_str()) {
        return Ok(0);
    }

    let insert_size = read.insert_size.abs();
    if insert_size == 0 || insert_size >= config.max_insert_size || !is_unusual(insert_size, config) {
        return Ok(0);
    }

    let (lo, hi) = read_span(read, config)?;
    let mut recorded = 0;

    for &(tid, transcript) in transcripts {
        if !transcript.has_junction_in(lo, hi) {
            continue;
        }
        let contained = transcript.introns_within(lo, hi);
        let removed: Coord = contained
            .iter()
            .filter_map(|&i| transcript.intron_len(i))
            .sum();
        let without_introns = insert_size - removed;

        match contained.first() {
            Some(&first) if !is_unusual(without_introns, config) => {
                tracing::trace!(
                    read = %read.name,
                    transcript = %transcript,
                    ?contained,
                    insert_size,
                    without_introns,
                    "introns considered removed"
                );
                // Attributed to the first contained intron only.
                report.add_insert_size_evidence(
                    tid,
                    first,
                    ReadSummary::new(read.name.as_str(), read.contig.as_str(), read.start),
                );
                recorded += 1;
            }
            _ => {
                tracing::trace!(
                    read = %read.name,
                    transcript = %transcript,
                    insert_size,
                    without_introns,
                    "insert size unexplained by intron removal"
                );
            }
        }
    }

    Ok(recorded)
}
