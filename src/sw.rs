//! Local (Smith-Waterman-Gotoh) pairwise alignment with affine gaps and the NUC.4.4
//! nucleotide matrix.

use crate::error::{Error, Result};

/// Outcome of aligning a query against a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairwiseAlignment {
    pub score: i32,
    /// Columns whose two bases are the same symbol.
    pub identical: usize,
    /// Alignment columns, gaps included.
    pub length: usize,
    /// Query row, `-` for gaps.
    pub aligned_query: String,
    /// Target row, `-` for gaps.
    pub aligned_target: String,
}

/// Pairwise alignment collaborator used to test floating read fragments.
pub trait PairwiseAligner: Sync {
    fn align(&self, query: &[u8], target: &[u8]) -> Result<PairwiseAlignment>;
}

/// Affine-gap local aligner. A gap of length `k` costs `gap_open + k * gap_extend`.
#[derive(Debug, Clone, Copy)]
pub struct LocalAligner {
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for LocalAligner {
    fn default() -> Self {
        Self { gap_open: 5, gap_extend: 2 }
    }
}

// Row/column order of NUC_4_4.
const NUC_SYMBOLS: &[u8; 15] = b"ATGCSWRYKMBVHDN";

#[rustfmt::skip]
const NUC_4_4: [[i8; 15]; 15] = [
    //  A   T   G   C   S   W   R   Y   K   M   B   V   H   D   N
    [   5, -4, -4, -4, -4,  1,  1, -4, -4,  1, -4, -1, -1, -1, -2], // A
    [  -4,  5, -4, -4, -4,  1, -4,  1,  1, -4, -1, -4, -1, -1, -2], // T
    [  -4, -4,  5, -4,  1, -4,  1, -4,  1, -4, -1, -1, -4, -1, -2], // G
    [  -4, -4, -4,  5,  1, -4, -4,  1, -4,  1, -1, -1, -1, -4, -2], // C
    [  -4, -4,  1,  1, -1, -4, -2, -2, -2, -2, -1, -1, -3, -3, -1], // S
    [   1,  1, -4, -4, -4, -1, -2, -2, -2, -2, -3, -3, -1, -1, -1], // W
    [   1, -4,  1, -4, -2, -2, -1, -4, -2, -2, -3, -1, -3, -1, -1], // R
    [  -4,  1, -4,  1, -2, -2, -4, -1, -2, -2, -1, -3, -1, -3, -1], // Y
    [  -4,  1,  1, -4, -2, -2, -2, -2, -1, -4, -1, -3, -3, -1, -1], // K
    [   1, -4, -4,  1, -2, -2, -2, -2, -4, -1, -3, -1, -1, -3, -1], // M
    [  -4, -1, -1, -1, -1, -3, -3, -1, -1, -3, -1, -2, -2, -2, -1], // B
    [  -1, -4, -1, -1, -1, -3, -1, -3, -3, -1, -2, -1, -2, -2, -1], // V
    [  -1, -1, -4, -1, -3, -1, -3, -1, -3, -1, -2, -2, -1, -2, -1], // H
    [  -1, -1, -1, -4, -3, -1, -1, -3, -1, -3, -2, -2, -2, -1, -1], // D
    [  -2, -2, -2, -2, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1], // N
];

/// Upper-cased base, `U` read as `T`, anything outside the IUPAC alphabet as `N`.
fn normalize(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'U' => b'T',
        b if NUC_SYMBOLS.contains(&b) => b,
        _ => b'N',
    }
}

fn nuc_index(base: u8) -> usize {
    NUC_SYMBOLS
        .iter()
        .position(|&s| s == base)
        .unwrap_or(NUC_SYMBOLS.len() - 1)
}

pub fn nuc_score(a: u8, b: u8) -> i32 {
    NUC_4_4[nuc_index(normalize(a))][nuc_index(normalize(b))] as i32
}

const STOP: u8 = b'X';
const DIAG: u8 = b'D';
const UP: u8 = b'U';
const LEFT: u8 = b'L';
const OPEN: u8 = b'O';
const EXTEND: u8 = b'E';

impl PairwiseAligner for LocalAligner {
    fn align(&self, query: &[u8], target: &[u8]) -> Result<PairwiseAlignment> {
        let m = query.len();
        let n = target.len();
        if m == 0 || n == 0 {
            return Err(Error::AlignmentUnavailable(format!(
                "empty input (query {m} bases, target {n} bases)"
            )));
        }

        let q: Vec<u8> = query.iter().map(|&b| normalize(b)).collect();
        let t: Vec<u8> = target.iter().map(|&b| normalize(b)).collect();
        let open = self.gap_open + self.gap_extend;
        let extend = self.gap_extend;
        let neg_inf = i32::MIN / 2;
        let w = n + 1;
        let at = |i: usize, j: usize| i * w + j;

        // h: best local score ending at (i, j); up/left: best ending in a gap column.
        let mut h = vec![0i32; (m + 1) * w];
        let mut up = vec![neg_inf; (m + 1) * w];
        let mut left = vec![neg_inf; (m + 1) * w];
        let mut h_trace = vec![STOP; (m + 1) * w];
        let mut up_trace = vec![OPEN; (m + 1) * w];
        let mut left_trace = vec![OPEN; (m + 1) * w];

        let mut max_score = 0i32;
        let mut max_i = 0usize;
        let mut max_j = 0usize;

        for i in 1..=m {
            for j in 1..=n {
                let up_open = h[at(i - 1, j)] - open;
                let up_ext = up[at(i - 1, j)] - extend;
                if up_ext > up_open {
                    up[at(i, j)] = up_ext;
                    up_trace[at(i, j)] = EXTEND;
                } else {
                    up[at(i, j)] = up_open;
                }

                let left_open = h[at(i, j - 1)] - open;
                let left_ext = left[at(i, j - 1)] - extend;
                if left_ext > left_open {
                    left[at(i, j)] = left_ext;
                    left_trace[at(i, j)] = EXTEND;
                } else {
                    left[at(i, j)] = left_open;
                }

                let diag = h[at(i - 1, j - 1)] + nuc_score(q[i - 1], t[j - 1]);

                let (cell, trace) = if diag >= up[at(i, j)] && diag >= left[at(i, j)] {
                    (diag, DIAG)
                } else if up[at(i, j)] >= left[at(i, j)] {
                    (up[at(i, j)], UP)
                } else {
                    (left[at(i, j)], LEFT)
                };

                if cell > 0 {
                    h[at(i, j)] = cell;
                    h_trace[at(i, j)] = trace;
                }

                if cell > max_score {
                    max_score = cell;
                    max_i = i;
                    max_j = j;
                }
            }
        }

        let mut i = max_i;
        let mut j = max_j;
        let mut state = h_trace[at(i, j)];
        let mut q_row: Vec<u8> = Vec::new();
        let mut t_row: Vec<u8> = Vec::new();
        let mut identical = 0usize;

        while i > 0 && j > 0 {
            match state {
                DIAG => {
                    q_row.push(q[i - 1]);
                    t_row.push(t[j - 1]);
                    if q[i - 1] == t[j - 1] {
                        identical += 1;
                    }
                    i -= 1;
                    j -= 1;
                    state = h_trace[at(i, j)];
                }
                UP => {
                    q_row.push(q[i - 1]);
                    t_row.push(b'-');
                    let opened = up_trace[at(i, j)] == OPEN;
                    i -= 1;
                    state = if opened { h_trace[at(i, j)] } else { UP };
                }
                LEFT => {
                    q_row.push(b'-');
                    t_row.push(t[j - 1]);
                    let opened = left_trace[at(i, j)] == OPEN;
                    j -= 1;
                    state = if opened { h_trace[at(i, j)] } else { LEFT };
                }
                _ => break,
            }
        }

        q_row.reverse();
        t_row.reverse();

        Ok(PairwiseAlignment {
            score: max_score,
            identical,
            length: q_row.len(),
            aligned_query: String::from_utf8_lossy(&q_row).into_owned(),
            aligned_target: String::from_utf8_lossy(&t_row).into_owned(),
        })
    }
}
