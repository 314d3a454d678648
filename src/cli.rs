use clap::Parser;
use std::path::PathBuf;

use crate::bam_input::Region;

#[derive(Parser, Debug)]
#[command(
    name = "pseudogene-rs",
    about = "Detect processed-pseudogene insertions from intron-removal evidence in short-read alignments",
    version
)]
pub struct Args {
    /// Input BAM with genomic alignments (indexed if --region is used)
    #[arg(short = 'b', long = "bam", value_name = "BAM")]
    pub bam: PathBuf,

    /// Reference genome FASTA
    #[arg(short = 'r', long = "reference", value_name = "FASTA")]
    pub reference: PathBuf,

    /// Transcript table in UCSC refGene format
    #[arg(short = 'g', long = "genes", value_name = "TSV")]
    pub genes: PathBuf,

    /// Known pseudogenes (GTF with ucsc_id attributes)
    #[arg(long = "pseudogenes", value_name = "GTF")]
    pub pseudogenes: Option<PathBuf>,

    /// Curated retro-element insertions (TSV with Category, Gene name and coordinate columns)
    #[arg(long = "retroelements", value_name = "TSV")]
    pub retroelements: Option<PathBuf>,

    /// Number of threads (CPUs) to use
    #[arg(short = 'p', long = "threads", default_value_t = 1)]
    pub threads: u8,

    /// Restrict the scan to chrom:start-end
    #[arg(long, value_name = "REGION")]
    pub region: Option<Region>,

    /// Only soft clips count as clipped-junction evidence; deletions are ignored
    #[arg(long)]
    pub only_soft_clipped: bool,

    /// Skip reads flagged as PCR or optical duplicates
    #[arg(long = "omit-duplicated-reads")]
    pub omit_duplicated_reads: bool,

    /// Re-read the BAM to attach bases to discordant reads
    #[arg(long)]
    pub two_pass_run: bool,

    /// Candidate summary output (stdout if omitted)
    #[arg(short = 'o', long = "output", value_name = "TSV")]
    pub output: Option<PathBuf>,

    /// Set logging level to WARN
    #[arg(short = 'q', long)]
    pub quiet: bool,
}
