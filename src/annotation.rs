use anyhow::{Context, Result, anyhow, bail};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::position::GenomicPosition;
use crate::transcript::{Strand, TranscriptRecord};
use crate::types::{Coord, HashMap, HashMapExt, HashSet, HashSetExt};

/// A named closed genomic interval from one of the known-loci databases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedInterval {
    pub name: String,
    pub start: GenomicPosition,
    pub end: GenomicPosition,
}

/// Load transcripts from a UCSC refGene/hgTables table.
///
/// Columns (0-based): name, chrom, strand, txStart, txEnd, cdsStart, cdsEnd, exonCount,
/// exonStarts, exonEnds, score, name2. Lines starting with `#` and blank lines are skipped.
///
/// Coordinate conventions:
/// - UCSC starts are 0-based and ends exclusive.
/// - Every coordinate is shifted by +1, so exon `i` becomes the 1-based half-open
///   `[exonStarts[i] + 1, exonEnds[i] + 1)`.
pub fn load_transcripts(path: &Path) -> Result<Vec<TranscriptRecord>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open transcript table {}", path.display()))?;
    read_transcripts(BufReader::new(file))
}

pub fn read_transcripts<R: BufRead>(reader: R) -> Result<Vec<TranscriptRecord>> {
    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let record = parse_transcript_line(&line)
            .with_context(|| format!("malformed transcript table line {}", line_no + 1))?;
        records.push(record);
    }
    Ok(records)
}

pub fn parse_transcript_line(line: &str) -> Result<TranscriptRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 12 {
        bail!("expected at least 12 columns, found {}", fields.len());
    }

    let coord = |idx: usize| -> Result<Coord> {
        fields[idx]
            .trim()
            .parse::<Coord>()
            .map(|v| v + 1)
            .map_err(|e| anyhow!("column {} ({:?}): {}", idx, fields[idx], e))
    };

    Ok(TranscriptRecord {
        name: fields[0].to_string(),
        chrom: fields[1].to_string(),
        strand: if fields[2] == "+" { Strand::Plus } else { Strand::Minus },
        tx_start: coord(3)?,
        tx_end: coord(4)?,
        cds_start: coord(5)?,
        cds_end: coord(6)?,
        exon_starts: parse_coord_list(fields[8])?,
        intron_starts: parse_coord_list(fields[9])?,
        gene: fields[11].to_string(),
    })
}

fn parse_coord_list(field: &str) -> Result<Vec<Coord>> {
    field
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Coord>()
                .map(|v| v + 1)
                .map_err(|e| anyhow!("bad coordinate {:?}: {}", s, e))
        })
        .collect()
}

/// Transcript name -> gene name.
pub fn gene_names(records: &[TranscriptRecord]) -> HashMap<String, String> {
    let mut map = HashMap::with_capacity(records.len());
    for record in records {
        map.insert(record.name.clone(), record.gene.clone());
    }
    map
}

/// Known pseudogenes from a GTF whose features carry a `ucsc_id` attribute.
#[derive(Debug, Default)]
pub struct PseudogeneAnnotation {
    pub intervals: Vec<NamedInterval>,
    /// Genes whose transcripts appear (by `ucsc_id` prefix) in the pseudogene GTF.
    pub genes: HashSet<String>,
}

pub fn load_known_pseudogenes(
    path: &Path,
    tx_to_gene: &HashMap<String, String>,
) -> Result<PseudogeneAnnotation> {
    // NOTE: We parse with noodles-gtf, but we only extract fields and attributes.
    // record_bufs yields gff::feature::RecordBuf, which provides a uniform API.
    let reader = File::open(path)
        .with_context(|| format!("failed to open pseudogene GTF {}", path.display()))?;
    let mut reader = noodles::gtf::io::Reader::new(BufReader::new(reader));

    let mut annotation = PseudogeneAnnotation {
        intervals: Vec::new(),
        genes: HashSet::new(),
    };

    for result in reader.record_bufs() {
        let record = result?;

        let attrs = record.attributes();
        let Some(ucsc_id) = get_record_buf_attribute(attrs, b"ucsc_id") else {
            continue;
        };

        let seqname = record.reference_sequence_name().to_string();
        let start = record.start().get() as Coord;
        let end = record.end().get() as Coord;

        annotation.intervals.push(NamedInterval {
            name: ucsc_id.clone(),
            start: GenomicPosition::new(seqname.clone(), start),
            end: GenomicPosition::new(seqname, end),
        });

        let tx_name = ucsc_id.split('.').next().unwrap_or_default();
        if let Some(gene) = tx_to_gene.get(tx_name)
            && !gene.trim().is_empty()
        {
            annotation.genes.insert(gene.clone());
        }
    }

    Ok(annotation)
}

fn get_record_buf_attribute(
    attrs: &noodles::gff::feature::record_buf::Attributes,
    key: &[u8],
) -> Option<String> {
    let value = attrs.get(key)?;
    value.iter().next().map(|v| v.to_string())
}

/// Curated retro-element insertions: every listed gene plus the insertion sites that
/// carry a parseable coordinate.
#[derive(Debug, Default)]
pub struct RetroelementAnnotation {
    pub intervals: Vec<NamedInterval>,
    pub genes: HashSet<String>,
}

const CATEGORY_COLUMN: &str = "Category";
const GENE_COLUMN: &str = "Gene name";
const COORDINATE_COLUMN: &str = "Insertion coordinate (hg19)";

pub fn load_retroelements(path: &Path) -> Result<RetroelementAnnotation> {
    let file = File::open(path)
        .with_context(|| format!("failed to open retro-element table {}", path.display()))?;
    read_retroelements(BufReader::new(file))
}

pub fn read_retroelements<R: BufRead>(reader: R) -> Result<RetroelementAnnotation> {
    let coordinate_pattern = Regex::new(r"^(?<chr>chr[0-9XYM]*):(?<start>[0-9]+)-(?<end>[0-9]+)$")?;

    let mut lines = reader.lines();
    let header = lines
        .next()
        .ok_or_else(|| anyhow!("retro-element table is empty"))??;
    let columns: Vec<&str> = header.split('\t').map(str::trim).collect();
    let column = |name: &str| {
        columns
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| anyhow!("retro-element table lacks column {:?}", name))
    };
    // Category is required by the format even though only gene and coordinate are used.
    column(CATEGORY_COLUMN)?;
    let gene_idx = column(GENE_COLUMN)?;
    let coord_idx = column(COORDINATE_COLUMN)?;

    let mut annotation = RetroelementAnnotation {
        intervals: Vec::new(),
        genes: HashSet::new(),
    };

    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let Some(gene) = fields.get(gene_idx).map(|g| g.trim().to_string()) else {
            continue;
        };
        annotation.genes.insert(gene.clone());

        let coordinates = fields.get(coord_idx).map(|c| c.trim()).unwrap_or_default();
        if coordinates.is_empty() {
            continue;
        }
        match coordinate_pattern.captures(coordinates) {
            Some(caps) => {
                let chrom = &caps["chr"];
                let start: Coord = caps["start"].parse()?;
                let end: Coord = caps["end"].parse()?;
                annotation.intervals.push(NamedInterval {
                    name: gene,
                    start: GenomicPosition::new(chrom, start),
                    end: GenomicPosition::new(chrom, end),
                });
            }
            None => tracing::warn!(coordinates, "unrecognised retro-element coordinate"),
        }
    }

    Ok(annotation)
}
