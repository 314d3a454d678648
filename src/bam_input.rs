use anyhow::{Context, Result, anyhow, bail};
use noodles::sam::alignment::record::cigar::op::Kind as CigarKind;
use rust_htslib::bam;
use rust_htslib::bam::Read as HtsRead;
use rust_htslib::bam::record::Cigar;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::read::AlignedRead;
use crate::types::Coord;

/// `chrom:start-end`, 1-based and closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub chrom: String,
    pub start: Coord,
    pub end: Coord,
}

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (chrom, range) = s
            .rsplit_once(':')
            .ok_or_else(|| anyhow!("region {:?} is not chrom:start-end", s))?;
        let (start, end) = range
            .split_once('-')
            .ok_or_else(|| anyhow!("region {:?} is not chrom:start-end", s))?;
        let start: Coord = start.replace(',', "").parse().with_context(|| format!("bad region start in {:?}", s))?;
        let end: Coord = end.replace(',', "").parse().with_context(|| format!("bad region end in {:?}", s))?;
        if chrom.is_empty() || start < 1 || end < start {
            bail!("invalid region {:?}", s);
        }
        Ok(Self { chrom: chrom.to_string(), start, end })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

enum Source {
    Whole(bam::Reader),
    Region(bam::IndexedReader),
}

pub struct BamInput {
    contig_names: Vec<String>,
    source: Source,
}

fn contig_names(header: &bam::HeaderView) -> Vec<String> {
    header
        .target_names()
        .iter()
        .map(|n| String::from_utf8_lossy(n).to_string())
        .collect()
}

pub fn open_bam(path: &Path, region: Option<&Region>, threads: usize) -> Result<BamInput> {
    match region {
        None => {
            let mut reader = bam::Reader::from_path(path)
                .with_context(|| format!("failed to open BAM {}", path.display()))?;
            if threads > 1 {
                reader.set_threads(threads)?;
            }
            let contig_names = contig_names(reader.header());
            Ok(BamInput { contig_names, source: Source::Whole(reader) })
        }
        Some(region) => {
            let mut reader = bam::IndexedReader::from_path(path)
                .with_context(|| format!("failed to open indexed BAM {}", path.display()))?;
            if threads > 1 {
                reader.set_threads(threads)?;
            }
            let contig_names = contig_names(reader.header());
            // htslib regions are 0-based half-open.
            reader
                .fetch((region.chrom.as_str(), region.start - 1, region.end))
                .with_context(|| format!("failed to seek to region {}", region))?;
            Ok(BamInput { contig_names, source: Source::Region(reader) })
        }
    }
}

fn cigar_op(op: &Cigar) -> (u32, CigarKind) {
    match *op {
        Cigar::Match(len) => (len, CigarKind::Match),
        Cigar::Ins(len) => (len, CigarKind::Insertion),
        Cigar::Del(len) => (len, CigarKind::Deletion),
        Cigar::RefSkip(len) => (len, CigarKind::Skip),
        Cigar::SoftClip(len) => (len, CigarKind::SoftClip),
        Cigar::HardClip(len) => (len, CigarKind::HardClip),
        Cigar::Pad(len) => (len, CigarKind::Pad),
        Cigar::Equal(len) => (len, CigarKind::SequenceMatch),
        Cigar::Diff(len) => (len, CigarKind::SequenceMismatch),
    }
}

impl BamInput {
    pub fn contig_names(&self) -> &[String] {
        &self.contig_names
    }

    fn contig(&self, tid: i32) -> Option<String> {
        usize::try_from(tid)
            .ok()
            .and_then(|i| self.contig_names.get(i))
            .cloned()
    }

    fn read_next(&mut self, record: &mut bam::Record) -> Option<rust_htslib::errors::Result<()>> {
        match &mut self.source {
            Source::Whole(reader) => reader.read(record),
            Source::Region(reader) => reader.read(record),
        }
    }

    pub fn to_aligned_read(&self, record: &bam::Record) -> AlignedRead {
        let mate_unmapped = record.is_mate_unmapped();
        AlignedRead {
            name: String::from_utf8_lossy(record.qname()).into_owned(),
            contig: self.contig(record.tid()).unwrap_or_default(),
            start: record.pos() + 1,
            cigar: record.cigar().iter().map(cigar_op).collect(),
            sequence: record.seq().as_bytes(),
            is_unmapped: record.is_unmapped(),
            is_paired: record.is_paired(),
            is_duplicate: record.is_duplicate(),
            mate_unmapped,
            mate_contig: if mate_unmapped { None } else { self.contig(record.mtid()) },
            mate_start: record.mpos() + 1,
            insert_size: record.insert_size(),
        }
    }

    /// Every record in file order. One `bam::Record` buffer is reused across reads.
    pub fn reads(&mut self) -> impl Iterator<Item = Result<AlignedRead>> + '_ {
        let mut record = bam::Record::new();
        std::iter::from_fn(move || {
            let result = self.read_next(&mut record)?;
            Some(
                result
                    .context("failed to read BAM record")
                    .map(|()| self.to_aligned_read(&record)),
            )
        })
    }
}
