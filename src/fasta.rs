use anyhow::Result;
use needletail::parse_fastx_file;
use std::path::Path;

use crate::error::Error;
use crate::types::{Coord, HashMap, HashMapExt};

/// Random access to reference bases.
///
/// Implementations must be safe to call from every worker thread at once.
pub trait ReferenceSequence: Sync {
    /// Bases of the closed 1-based interval `[start, end]` on `chrom`, uppercased.
    fn fetch(&self, chrom: &str, start: Coord, end: Coord) -> crate::error::Result<Vec<u8>>;
}

/// Whole-genome FASTA held in memory.
#[derive(Debug, Default)]
pub struct FastaDb {
    seqs: HashMap<String, Vec<u8>>,
}

impl FastaDb {
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = parse_fastx_file(path)
            .map_err(|e| anyhow::anyhow!("failed to open FASTA {}: {}", path.display(), e))?;
        let mut seqs: HashMap<String, Vec<u8>> = HashMap::new();

        while let Some(result) = reader.next() {
            let record = result
                .map_err(|e| anyhow::anyhow!("failed to parse FASTA record: {}", e))?;
            // Keep only the first word of the header, as BAM reference names do.
            let id = std::str::from_utf8(record.id()).unwrap_or("");
            let name = id.split_whitespace().next().unwrap_or("").to_string();
            let seq = record.seq().to_vec();
            seqs.insert(name, seq);
        }

        Ok(Self { seqs })
    }

    pub fn from_sequences(seqs: impl IntoIterator<Item = (String, Vec<u8>)>) -> Self {
        let mut map = HashMap::new();
        for (name, seq) in seqs {
            map.insert(name, seq);
        }
        Self { seqs: map }
    }

    pub fn contig_count(&self) -> usize {
        self.seqs.len()
    }
}

impl ReferenceSequence for FastaDb {
    fn fetch(&self, chrom: &str, start: Coord, end: Coord) -> crate::error::Result<Vec<u8>> {
        let unavailable = || Error::ReferenceUnavailable {
            chrom: chrom.to_string(),
            start,
            end,
        };
        let seq = self.seqs.get(chrom).ok_or_else(unavailable)?;
        if start < 1 || end < start || end as usize > seq.len() {
            return Err(unavailable());
        }
        // Closed 1-based [start, end] -> 0-based half-open slice.
        let mut out = seq[(start - 1) as usize..end as usize].to_vec();
        out.make_ascii_uppercase();
        Ok(out)
    }
}
