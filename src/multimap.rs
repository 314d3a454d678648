//! Range multimap: half-open ranges over an ordered key mapped to sets of values.
//!
//! Stored as disjoint segments keyed by their lower bound. Inserting a range splits
//! any segment it partially covers, appends the new value to every covered segment
//! and opens fresh single-value segments over the uncovered gaps, so a point lookup
//! always returns exactly the values whose inserted range contains the point.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Bound::{Excluded, Unbounded};

use crate::error::{Error, Result};
use crate::types::{HashSet, HashSetExt};

#[derive(Debug, Clone)]
struct Segment<K, V> {
    hi: K,
    values: Vec<V>,
}

#[derive(Debug, Clone)]
pub struct RangeMultimap<K, V> {
    segments: BTreeMap<K, Segment<K, V>>,
}

impl<K, V> Default for RangeMultimap<K, V> {
    fn default() -> Self {
        Self { segments: BTreeMap::new() }
    }
}

impl<K, V> RangeMultimap<K, V>
where
    K: Ord + Clone + Debug,
    V: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `value` with `[lo, hi)`.
    ///
    /// `lo > hi` is rejected with `Error::InvalidRange`; `lo == hi` is empty and leaves
    /// the map untouched.
    pub fn put(&mut self, lo: K, hi: K, value: V) -> Result<()> {
        if lo > hi {
            return Err(Error::InvalidRange {
                lo: format!("{lo:?}"),
                hi: format!("{hi:?}"),
            });
        }
        if lo == hi {
            return Ok(());
        }

        let overlapping = self.overlapping_keys(&lo, &hi);
        let mut cursor = lo.clone();

        for seg_lo in overlapping {
            let Some(seg) = self.segments.remove(&seg_lo) else {
                continue;
            };

            let covered_lo = if seg_lo > lo { seg_lo.clone() } else { lo.clone() };
            let covered_hi = if seg.hi < hi { seg.hi.clone() } else { hi.clone() };

            if cursor < covered_lo {
                self.segments.insert(
                    cursor.clone(),
                    Segment { hi: covered_lo.clone(), values: vec![value.clone()] },
                );
            }

            if seg_lo < covered_lo {
                self.segments.insert(
                    seg_lo.clone(),
                    Segment { hi: covered_lo.clone(), values: seg.values.clone() },
                );
            }

            let mut merged = seg.values.clone();
            merged.push(value.clone());
            self.segments.insert(
                covered_lo,
                Segment { hi: covered_hi.clone(), values: merged },
            );

            if covered_hi < seg.hi {
                self.segments.insert(
                    covered_hi.clone(),
                    Segment { hi: seg.hi, values: seg.values },
                );
            }

            cursor = covered_hi;
        }

        if cursor < hi {
            self.segments.insert(cursor, Segment { hi, values: vec![value] });
        }

        Ok(())
    }

    /// Values whose range contains `point`.
    pub fn get(&self, point: &K) -> HashSet<V> {
        self.segment_at(point)
            .map(|seg| seg.values.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Union of the values of every segment intersecting `[lo, hi)`.
    pub fn get_range(&self, lo: &K, hi: &K) -> HashSet<V> {
        let mut out = HashSet::new();
        if lo >= hi {
            return out;
        }
        for seg_lo in self.overlapping_keys(lo, hi) {
            if let Some(seg) = self.segments.get(&seg_lo) {
                out.extend(seg.values.iter().cloned());
            }
        }
        out
    }

    /// Disjoint segments in key order, as `(lo, hi, values)`.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &K, &[V])> {
        self.segments
            .iter()
            .map(|(lo, seg)| (lo, &seg.hi, seg.values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of disjoint segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    fn segment_at(&self, point: &K) -> Option<&Segment<K, V>> {
        let (_, seg) = self.segments.range(..=point.clone()).next_back()?;
        (seg.hi > *point).then_some(seg)
    }

    fn overlapping_keys(&self, lo: &K, hi: &K) -> Vec<K> {
        let mut keys = Vec::new();
        if let Some((seg_lo, seg)) = self.segments.range(..=lo.clone()).next_back()
            && seg.hi > *lo
        {
            keys.push(seg_lo.clone());
        }
        keys.extend(
            self.segments
                .range((Excluded(lo.clone()), Unbounded))
                .take_while(|(seg_lo, _)| *seg_lo < hi)
                .map(|(seg_lo, _)| seg_lo.clone()),
        );
        keys
    }
}
