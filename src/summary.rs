use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;

use crate::discordance::KnownLoci;
use crate::evidence::{IntronData, MateLocation, PositionWithEvidence};
use crate::genome_index::TranscriptIndex;
use crate::report::Report;
use crate::types::{HashSet, HashSetExt, Tid};

/// Cut-offs applied when turning per-transcript fractions into calls.
#[derive(Debug, Clone, Copy)]
pub struct ReportThresholds {
    /// Every fraction must exceed this to pass.
    pub pass_fraction: f64,
    pub min_supported_introns: usize,
    /// Transcripts with all fractions below this are not reported.
    pub suppress_fraction: f64,
}

impl Default for ReportThresholds {
    fn default() -> Self {
        Self {
            pass_fraction: 0.5,
            min_supported_introns: 2,
            suppress_fraction: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Filter {
    LowClip,
    LowInsertSize,
    LowCombined,
    LowIntronCount,
}

impl Filter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::LowClip => "LOW_CLIP",
            Filter::LowInsertSize => "LOW_IS",
            Filter::LowCombined => "LOW_COMB",
            Filter::LowIntronCount => "LOW_INTRON_COUNT",
        }
    }
}

/// A transcript whose introns look removed in the sample.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub tid: Tid,
    pub transcript: String,
    pub gene: String,
    pub chrom: String,
    pub tx_start: i64,
    pub tx_end: i64,
    pub intron_count: usize,
    pub fraction_clip: f64,
    pub fraction_insert_size: f64,
    pub fraction_combined: f64,
    pub introns: Vec<IntronData>,
    pub discordant_positions: Vec<PositionWithEvidence>,
    /// Known pseudogenes near any discordant mate.
    pub pseudogene_hits: BTreeSet<String>,
    /// Curated retro-elements near any discordant mate.
    pub retroelement_hits: BTreeSet<String>,
    pub reference_pseudogene: bool,
    pub curated_retrogene: bool,
    pub pass: bool,
    pub filters: BTreeSet<Filter>,
}

impl Candidate {
    pub fn is_known(&self) -> bool {
        !self.pseudogene_hits.is_empty()
            || !self.retroelement_hits.is_empty()
            || self.reference_pseudogene
            || self.curated_retrogene
    }
}

fn filters_for(
    clip: f64,
    insert_size: f64,
    combined: f64,
    supported: usize,
    thresholds: &ReportThresholds,
) -> BTreeSet<Filter> {
    let mut filters = BTreeSet::new();
    if clip <= thresholds.pass_fraction {
        filters.insert(Filter::LowClip);
    }
    if insert_size <= thresholds.pass_fraction {
        filters.insert(Filter::LowInsertSize);
    }
    if combined <= thresholds.pass_fraction {
        filters.insert(Filter::LowCombined);
    }
    if supported < thresholds.min_supported_introns {
        filters.insert(Filter::LowIntronCount);
    }
    filters
}

/// Build one candidate per transcript with evidence, drop uninformative ones, and keep
/// the strongest transcript of each gene. Sorted strongest first.
pub fn summarize(
    report: &Report,
    index: &TranscriptIndex,
    known: &KnownLoci,
    thresholds: &ReportThresholds,
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = Vec::new();

    for tid in report.transcripts_with_evidence() {
        let Some(stats) = report.stats(tid) else {
            continue;
        };
        let transcript = index.transcript(tid);

        let clip = stats.fraction_covered_by_clip();
        let insert_size = stats.fraction_covered_by_insert_size();
        let combined = stats.fraction_covered_combined();
        if clip < thresholds.suppress_fraction
            && insert_size < thresholds.suppress_fraction
            && combined < thresholds.suppress_fraction
        {
            continue;
        }

        let introns = stats.supporting_intron_data();
        drop(stats);

        let discordant_positions = report.discordant_positions(tid);
        let mut pseudogene_hits = BTreeSet::new();
        let mut retroelement_hits = BTreeSet::new();
        for bucket in &discordant_positions {
            if let MateLocation::Resolved(position) = &bucket.location {
                pseudogene_hits.extend(known.pseudogenes_near(position));
                retroelement_hits.extend(known.retroelements_near(position));
            }
        }

        let filters = filters_for(clip, insert_size, combined, introns.len(), thresholds);
        candidates.push(Candidate {
            tid,
            transcript: transcript.name().to_string(),
            gene: transcript.gene().to_string(),
            chrom: transcript.chrom().to_string(),
            tx_start: transcript.tx_start(),
            tx_end: transcript.tx_end(),
            intron_count: transcript.intron_count(),
            fraction_clip: clip,
            fraction_insert_size: insert_size,
            fraction_combined: combined,
            introns,
            discordant_positions,
            pseudogene_hits,
            retroelement_hits,
            reference_pseudogene: known.is_reference_pseudogene(transcript.gene()),
            curated_retrogene: known.is_curated_retrogene(transcript.gene()),
            pass: filters.is_empty(),
            filters,
        });
    }

    // Strongest first; ties broken by intron count, then by tid for a stable order.
    candidates.sort_by(|a, b| {
        b.fraction_combined
            .total_cmp(&a.fraction_combined)
            .then(b.intron_count.cmp(&a.intron_count))
            .then(a.tid.cmp(&b.tid))
    });

    let mut seen_genes: HashSet<String> = HashSet::new();
    candidates.retain(|c| seen_genes.insert(c.gene.clone()));
    candidates
}

pub const SUMMARY_HEADER: &str = "#transcript\tlocus\tcombined\tclip\tinsert_size\tintrons\tdiscordant\tpseudogene_hits\tretroelement_hits\treference_pseudogene\tcurated_retrogene\tknown\tstatus";

fn join_or_dot<'a>(items: impl Iterator<Item = &'a String>) -> String {
    let joined: Vec<&str> = items.map(String::as_str).collect();
    if joined.is_empty() {
        ".".to_string()
    } else {
        joined.join(",")
    }
}

/// One tab-separated line per candidate.
pub fn render_line(candidate: &Candidate) -> String {
    let mut introns = String::new();
    for (i, intron) in candidate.introns.iter().enumerate() {
        if i > 0 {
            introns.push(',');
        }
        let _ = write!(
            introns,
            "{}:{}/{}",
            intron.index,
            intron.reads_supporting_removal_by_alignment,
            intron.reads_supporting_removal_by_insert_size
        );
    }
    if introns.is_empty() {
        introns.push('.');
    }

    let mut discordant = String::new();
    for (i, bucket) in candidate.discordant_positions.iter().enumerate() {
        if i > 0 {
            discordant.push(',');
        }
        match &bucket.location {
            MateLocation::Resolved(position) => {
                let _ = write!(discordant, "{}x{}", position, bucket.read_count());
            }
            MateLocation::Unresolved => {
                let _ = write!(discordant, "unmapped_x{}", bucket.read_count());
            }
        }
    }
    if discordant.is_empty() {
        discordant.push('.');
    }

    let status = if candidate.pass {
        "PASS".to_string()
    } else {
        candidate
            .filters
            .iter()
            .map(Filter::as_str)
            .collect::<Vec<_>>()
            .join(";")
    };

    format!(
        "{}:{}\t{}:{}-{}\t{:.2}\t{:.2}\t{:.2}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        candidate.gene,
        candidate.transcript,
        candidate.chrom,
        candidate.tx_start,
        candidate.tx_end,
        candidate.fraction_combined,
        candidate.fraction_clip,
        candidate.fraction_insert_size,
        introns,
        discordant,
        join_or_dot(candidate.pseudogene_hits.iter()),
        join_or_dot(candidate.retroelement_hits.iter()),
        candidate.reference_pseudogene,
        candidate.curated_retrogene,
        if candidate.is_known() { "KNOWN" } else { "." },
        status,
    )
}

pub fn write_summary<W: Write>(out: &mut W, candidates: &[Candidate]) -> Result<()> {
    writeln!(out, "{}", SUMMARY_HEADER)?;
    for candidate in candidates {
        writeln!(out, "{}", render_line(candidate))?;
    }
    out.flush()?;
    Ok(())
}
