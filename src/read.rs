use noodles::sam::alignment::record::cigar::op::Kind as CigarKind;

use crate::types::Coord;

/// An aligned read as seen by the classifiers, independent of the file format it came from.
#[derive(Debug, Clone, Default)]
pub struct AlignedRead {
    pub name: String,
    pub contig: String,
    /// 1-based position of the first aligned (non-clipped) base.
    pub start: Coord,
    /// Raw CIGAR ops: (length, noodles CigarKind).
    pub cigar: Vec<(u32, CigarKind)>,
    /// Query sequence bytes, soft-clipped bases included.
    pub sequence: Vec<u8>,
    pub is_unmapped: bool,
    pub is_paired: bool,
    pub is_duplicate: bool,
    pub mate_unmapped: bool,
    pub mate_contig: Option<String>,
    /// 1-based alignment start of the mate (0 if unknown).
    pub mate_start: Coord,
    /// Inferred insert size (TLEN); sign depends on mate orientation.
    pub insert_size: i64,
}

/// Reference-aligned block of an alignment: `ref_start` and `read_start` are where the
/// block begins on the reference (1-based) and in the read (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedBlock {
    pub ref_start: Coord,
    pub read_start: usize,
    pub len: u32,
}

pub(crate) fn consumes_reference(kind: CigarKind) -> bool {
    matches!(
        kind,
        CigarKind::Match
            | CigarKind::SequenceMatch
            | CigarKind::SequenceMismatch
            | CigarKind::Deletion
            | CigarKind::Skip
    )
}

pub(crate) fn consumes_read(kind: CigarKind) -> bool {
    matches!(
        kind,
        CigarKind::Match
            | CigarKind::SequenceMatch
            | CigarKind::SequenceMismatch
            | CigarKind::Insertion
            | CigarKind::SoftClip
    )
}

fn is_clip(kind: CigarKind) -> bool {
    matches!(kind, CigarKind::SoftClip | CigarKind::HardClip)
}

impl AlignedRead {
    /// 1-based position of the last aligned base.
    pub fn end(&self) -> Coord {
        let ref_len: Coord = self
            .cigar
            .iter()
            .filter(|(_, kind)| consumes_reference(*kind))
            .map(|(len, _)| *len as Coord)
            .sum();
        self.start + ref_len.max(1) - 1
    }

    /// Start with leading clipped bases (soft and hard) added back.
    pub fn unclipped_start(&self) -> Coord {
        let clipped: Coord = self
            .cigar
            .iter()
            .take_while(|(_, kind)| is_clip(*kind))
            .map(|(len, _)| *len as Coord)
            .sum();
        self.start - clipped
    }

    /// End with trailing clipped bases (soft and hard) added back.
    pub fn unclipped_end(&self) -> Coord {
        let clipped: Coord = self
            .cigar
            .iter()
            .rev()
            .take_while(|(_, kind)| is_clip(*kind))
            .map(|(len, _)| *len as Coord)
            .sum();
        self.end() + clipped
    }

    /// Blocks of bases aligned to the reference (`M`, `=`, `X`).
    pub fn aligned_blocks(&self) -> Vec<AlignedBlock> {
        let mut blocks = Vec::new();
        let mut ref_pos = self.start;
        let mut read_pos = 0usize;

        for &(len, kind) in &self.cigar {
            match kind {
                CigarKind::Match | CigarKind::SequenceMatch | CigarKind::SequenceMismatch => {
                    blocks.push(AlignedBlock { ref_start: ref_pos, read_start: read_pos, len });
                    ref_pos += len as Coord;
                    read_pos += len as usize;
                }
                _ => {
                    if consumes_reference(kind) {
                        ref_pos += len as Coord;
                    }
                    if consumes_read(kind) {
                        read_pos += len as usize;
                    }
                }
            }
        }

        blocks
    }

    /// 0-based read offset of the base aligned to `ref_pos`.
    ///
    /// A position inside a deletion or skip resolves to the last aligned base before it.
    /// Positions before the first or after the last aligned block (clipped regions,
    /// or outside the alignment) have no base.
    pub fn read_offset_at(&self, ref_pos: Coord) -> Option<usize> {
        let mut last_aligned: Option<usize> = None;
        for block in self.aligned_blocks() {
            let block_end = block.ref_start + block.len as Coord - 1;
            if block_end >= ref_pos {
                if ref_pos < block.ref_start {
                    return last_aligned;
                }
                return Some(block.read_start + (ref_pos - block.ref_start) as usize);
            }
            last_aligned = Some(block.read_start + block.len as usize - 1);
        }
        None
    }

    pub fn sequence_str(&self) -> String {
        String::from_utf8_lossy(&self.sequence).into_owned()
    }
}
