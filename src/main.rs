use anyhow::Result;
use clap::Parser;
use mimalloc::MiMalloc;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing_subscriber::EnvFilter;

use pseudogene_rs::annotation::{
    self, PseudogeneAnnotation, RetroelementAnnotation, load_known_pseudogenes, load_retroelements,
};
use pseudogene_rs::cli::Args;
use pseudogene_rs::{
    EvidenceConfig, FastaDb, KnownLoci, LocalAligner, ReadAnalyzer, Report, ReportThresholds,
    TranscriptIndex, bam_input, pipeline, summary,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.quiet {
            EnvFilter::new("warn")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = EvidenceConfig {
        only_soft_clipped: args.only_soft_clipped,
        omit_duplicates: args.omit_duplicated_reads,
        ..EvidenceConfig::default()
    };
    let threads = usize::from(args.threads.max(1));

    let records = annotation::load_transcripts(&args.genes)?;
    let tx_to_gene = annotation::gene_names(&records);
    let index = TranscriptIndex::build(records)?;
    tracing::info!(transcripts = index.len(), "transcripts loaded");

    let pseudogenes = match &args.pseudogenes {
        Some(path) => load_known_pseudogenes(path, &tx_to_gene)?,
        None => PseudogeneAnnotation::default(),
    };
    let retroelements = match &args.retroelements {
        Some(path) => load_retroelements(path)?,
        None => RetroelementAnnotation::default(),
    };
    let known = KnownLoci::new(pseudogenes, retroelements, config.known_locus_radius);
    tracing::info!(
        pseudogenes = known.pseudogene_count(),
        retroelements = known.retroelement_count(),
        "known loci loaded"
    );

    let reference = FastaDb::load(&args.reference)?;
    tracing::info!(contigs = reference.contig_count(), "reference loaded");

    let aligner = LocalAligner::default();
    let report = Report::new(&index);
    let analyzer = ReadAnalyzer::new(&index, &reference, &aligner, &config, &report);

    let mut bam = bam_input::open_bam(&args.bam, args.region.as_ref(), threads)?;
    let stats = pipeline::run(bam.reads(), &analyzer, threads)?;
    stats.log_summary();

    if args.two_pass_run {
        tracing::info!("second pass: attaching bases to discordant reads");
        let mut bam = bam_input::open_bam(&args.bam, args.region.as_ref(), threads)?;
        let attached = pipeline::populate_read_bases(bam.reads(), &report)?;
        tracing::info!(attached, "second pass complete");
    }

    let candidates = summary::summarize(&report, &index, &known, &ReportThresholds::default());
    let passing = candidates.iter().filter(|c| c.pass).count();

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    summary::write_summary(&mut out, &candidates)?;

    tracing::info!(
        candidates = candidates.len(),
        passing,
        "pseudogene-rs: processing complete"
    );
    Ok(())
}
