use std::cmp::Ordering;
use std::fmt;

use crate::types::Coord;

/// A `(chromosome, coordinate)` pair ordered by chromosome name first, using a natural
/// alphanumeric comparison (`chr2 < chr10`), then by coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenomicPosition {
    chrom: String,
    coord: Coord,
}

impl GenomicPosition {
    pub fn new(chrom: impl Into<String>, coord: Coord) -> Self {
        Self { chrom: chrom.into(), coord }
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }
}

impl Ord for GenomicPosition {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.chrom, &other.chrom).then(self.coord.cmp(&other.coord))
    }
}

impl PartialOrd for GenomicPosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GenomicPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chrom, self.coord)
    }
}

/// Alphanumeric string comparison: runs of ASCII digits compare by numeric value,
/// everything else byte-wise.
///
/// Numeric runs of equal value but different length ("01" vs "1") fall back to the
/// shorter run first, and full byte-wise comparison breaks any remaining tie so the
/// ordering stays consistent with `Eq`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a_bytes, b_bytes) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0usize, 0usize);

    while i < a_bytes.len() && j < b_bytes.len() {
        let (ca, cb) = (a_bytes[i], b_bytes[j]);
        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let a_end = digit_run_end(a_bytes, i);
            let b_end = digit_run_end(b_bytes, j);
            let a_run = trim_leading_zeros(&a_bytes[i..a_end]);
            let b_run = trim_leading_zeros(&b_bytes[j..b_end]);

            let ord = a_run
                .len()
                .cmp(&b_run.len())
                .then_with(|| a_run.cmp(b_run))
                .then_with(|| (a_end - i).cmp(&(b_end - j)));
            if ord != Ordering::Equal {
                return ord;
            }
            i = a_end;
            j = b_end;
        } else {
            if ca != cb {
                return ca.cmp(&cb);
            }
            i += 1;
            j += 1;
        }
    }

    (a_bytes.len() - i)
        .cmp(&(b_bytes.len() - j))
        .then_with(|| a_bytes.cmp(b_bytes))
}

fn digit_run_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |off| start + off)
}

fn trim_leading_zeros(run: &[u8]) -> &[u8] {
    let first_non_zero = run.iter().position(|&b| b != b'0').unwrap_or(run.len());
    &run[first_non_zero..]
}
