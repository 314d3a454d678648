//! pseudogene-rs: find transcripts whose introns look spliced out at the DNA level.
//!
//! Reads are matched against a transcript index; three classifiers (clipped junctions,
//! anomalous insert sizes, discordant mates) record intron-removal evidence into a shared
//! [`Report`], which is summarised per transcript at the end of the run.
//!
//! # Library usage
//!
//! ```no_run
//! use pseudogene_rs::{EvidenceConfig, FastaDb, LocalAligner, ReadAnalyzer, Report, TranscriptIndex};
//! use pseudogene_rs::annotation::load_transcripts;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let index = TranscriptIndex::build(load_transcripts(Path::new("refGene.txt"))?)?;
//! let reference = FastaDb::load(Path::new("hg19.fa"))?;
//! let aligner = LocalAligner::default();
//! let config = EvidenceConfig::default();
//! let report = Report::new(&index);
//! let analyzer = ReadAnalyzer::new(&index, &reference, &aligner, &config, &report);
//! // for read in reads { analyzer.analyze(&read); }
//! # Ok(())
//! # }
//! ```

// Internal modules, not part of the public API.
pub(crate) mod types;

// Public modules.
pub mod annotation;
pub mod bam_input;
pub mod cli;
pub mod clipped;
pub mod discordance;
pub mod error;
pub mod evaluate;
pub mod evidence;
pub mod fasta;
pub mod genome_index;
pub mod insert_size;
pub mod multimap;
pub mod pipeline;
pub mod position;
pub mod read;
pub mod report;
pub mod summary;
pub mod sw;
pub mod transcript;

// Flat re-exports for the most commonly used public types.
pub use discordance::KnownLoci;
pub use error::{Error, Result};
pub use evaluate::{EvidenceConfig, ReadAnalyzer, ReadOutcome};
pub use evidence::{AlignmentResult, IntronData, MateLocation, PositionWithEvidence, ReadSummary};
pub use fasta::{FastaDb, ReferenceSequence};
pub use genome_index::TranscriptIndex;
pub use multimap::RangeMultimap;
pub use position::GenomicPosition;
pub use read::AlignedRead;
pub use report::{Report, TranscriptStats};
pub use summary::{Candidate, ReportThresholds};
pub use sw::{LocalAligner, PairwiseAligner, PairwiseAlignment};
pub use transcript::{Strand, Transcript, TranscriptRecord};
pub use types::{Coord, Tid};
