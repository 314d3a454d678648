use anyhow::Result;
use crossfire::mpmc;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crate::evaluate::{ReadAnalyzer, ReadOutcome};
use crate::read::AlignedRead;
use crate::report::Report;

const BATCH_SIZE: usize = 10_000;
const PROGRESS_EVERY: u64 = 1_000_000;

/// Counters of one scan, updated concurrently by every worker.
#[derive(Debug, Default)]
pub struct RunStats {
    pub reads_seen: AtomicU64,
    pub unmapped: AtomicU64,
    pub duplicates: AtomicU64,
    pub no_transcript: AtomicU64,
    pub processed: AtomicU64,
    /// Reads skipped because their coordinates were unusable or their analysis panicked.
    pub failed: AtomicU64,
    pub unresolved_junctions: AtomicU64,
    pub inconsistent_spans: AtomicU64,
    pub alignment_failures: AtomicU64,
    pub reference_failures: AtomicU64,
    pub alignment_evidence: AtomicU64,
    pub insert_size_evidence: AtomicU64,
    pub discordance_evidence: AtomicU64,
}

fn bump(counter: &AtomicU64, by: usize) {
    if by > 0 {
        counter.fetch_add(by as u64, Ordering::Relaxed);
    }
}

impl RunStats {
    pub fn record(&self, outcome: &ReadOutcome) {
        match outcome {
            ReadOutcome::Duplicate => bump(&self.duplicates, 1),
            ReadOutcome::Unmapped => bump(&self.unmapped, 1),
            ReadOutcome::InvalidSpan => bump(&self.failed, 1),
            ReadOutcome::NoTranscript => bump(&self.no_transcript, 1),
            ReadOutcome::Analyzed(tally) => {
                bump(&self.processed, 1);
                bump(&self.unresolved_junctions, tally.clip.unresolved_junctions);
                bump(&self.alignment_failures, tally.clip.alignment_failures);
                bump(&self.reference_failures, tally.clip.reference_failures);
                bump(&self.inconsistent_spans, usize::from(tally.inconsistent_span));
                bump(&self.alignment_evidence, tally.clip.accepted);
                bump(&self.insert_size_evidence, tally.insert_size_evidence);
                bump(&self.discordance_evidence, tally.discordance_evidence);
            }
        }
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    pub fn log_summary(&self) {
        tracing::info!(
            reads = Self::get(&self.reads_seen),
            processed = Self::get(&self.processed),
            unmapped = Self::get(&self.unmapped),
            duplicates = Self::get(&self.duplicates),
            no_transcript = Self::get(&self.no_transcript),
            failed = Self::get(&self.failed),
            unresolved_junctions = Self::get(&self.unresolved_junctions),
            inconsistent_spans = Self::get(&self.inconsistent_spans),
            alignment_failures = Self::get(&self.alignment_failures),
            reference_failures = Self::get(&self.reference_failures),
            "scan counters"
        );
        tracing::info!(
            alignment = Self::get(&self.alignment_evidence),
            insert_size = Self::get(&self.insert_size_evidence),
            discordance = Self::get(&self.discordance_evidence),
            "evidence recorded"
        );
    }
}

#[derive(Debug)]
struct WorkItem {
    reads: Vec<AlignedRead>,
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}

/// Analyze one read; a panic inside the analyzer or its collaborators skips only this read.
fn analyze_one(read: &AlignedRead, analyzer: &ReadAnalyzer<'_>, stats: &RunStats) {
    match panic::catch_unwind(AssertUnwindSafe(|| analyzer.analyze(read))) {
        Ok(outcome) => stats.record(&outcome),
        Err(payload) => {
            tracing::warn!(
                read = %read.name,
                error = panic_message(payload.as_ref()),
                "read processing failed; read skipped"
            );
            bump(&stats.failed, 1);
        }
    }
}

fn analyze_batch(reads: &[AlignedRead], analyzer: &ReadAnalyzer<'_>, stats: &RunStats) {
    for read in reads {
        analyze_one(read, analyzer, stats);
    }
}

fn note_progress(seen: u64) {
    if seen % PROGRESS_EVERY == 0 {
        tracing::info!(reads = seen, "progress");
    }
}

/// Analyze every read from `reads`, fanning batches out to `threads` workers.
/// Read order is not preserved.
pub fn run<I>(reads: I, analyzer: &ReadAnalyzer<'_>, threads: usize) -> Result<RunStats>
where
    I: IntoIterator<Item = Result<AlignedRead>>,
{
    let stats = RunStats::default();

    if threads <= 1 {
        for read in reads {
            let read = read?;
            let seen = stats.reads_seen.fetch_add(1, Ordering::Relaxed) + 1;
            note_progress(seen);
            analyze_one(&read, analyzer, &stats);
        }
        return Ok(stats);
    }

    crossfire::detect_backoff_cfg();
    let worker_count = threads;
    let cap = worker_count.saturating_mul(4).max(8);
    let (tx_work, rx_work) = mpmc::bounded_blocking::<WorkItem>(cap);
    let stats_ref = &stats;

    // The sender moves into the scope so an early return still closes the channel.
    thread::scope(move |scope| -> Result<()> {
        for _ in 0..worker_count {
            let rx_work = rx_work.clone();
            scope.spawn(move || {
                while let Ok(item) = rx_work.recv() {
                    analyze_batch(&item.reads, analyzer, stats_ref);
                }
            });
        }
        drop(rx_work);

        let mut batch: Vec<AlignedRead> = Vec::with_capacity(BATCH_SIZE);
        for read in reads {
            batch.push(read?);
            let seen = stats_ref.reads_seen.fetch_add(1, Ordering::Relaxed) + 1;
            note_progress(seen);
            if batch.len() >= BATCH_SIZE {
                let reads = std::mem::replace(&mut batch, Vec::with_capacity(BATCH_SIZE));
                tx_work.send(WorkItem { reads })?;
            }
        }
        if !batch.is_empty() {
            tx_work.send(WorkItem { reads: batch })?;
        }
        drop(tx_work);
        Ok(())
    })?;

    Ok(stats)
}

/// Second scan: attach read bases to the discordant read summaries collected by `run`.
/// Returns the number of records whose bases were attached.
pub fn populate_read_bases<I>(reads: I, report: &Report) -> Result<u64>
where
    I: IntoIterator<Item = Result<AlignedRead>>,
{
    let wanted = report.discordant_read_names();
    let mut attached = 0u64;
    if wanted.is_empty() {
        return Ok(attached);
    }
    for read in reads {
        let read = read?;
        if wanted.contains(&read.name) && report.attach_read_bases(&read.name, &read.sequence_str()) {
            attached += 1;
        }
    }
    Ok(attached)
}
