use crate::types::{Descriptor, DescriptorMatch, hamming_distance};
use rayon::prelude::*;

/// Brute-force nearest neighbour under Hamming distance
#[derive(Debug, Clone, Default)]
pub struct HammingMatcher {
    cross_check: bool,
}

impl HammingMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only pairs that are each other's nearest neighbour
    pub fn with_cross_check(mut self, enable: bool) -> Self {
        self.cross_check = enable;
        self
    }

    /// One match per query descriptor (fewer with cross-check), in query order
    pub fn match_descriptors(&self, query: &[Descriptor], train: &[Descriptor]) -> Vec<DescriptorMatch> {
        if query.is_empty() || train.is_empty() {
            return Vec::new();
        }

        query
            .par_iter()
            .enumerate()
            .filter_map(|(query_idx, q)| {
                let (train_idx, distance) = nearest(q, train)?;
                if self.cross_check && nearest(&train[train_idx], query).map(|(i, _)| i) != Some(query_idx) {
                    return None;
                }
                Some(DescriptorMatch {
                    query_idx,
                    train_idx,
                    distance,
                })
            })
            .collect()
    }
}

/// Index and distance of the closest descriptor; ties keep the lowest index
fn nearest(needle: &Descriptor, haystack: &[Descriptor]) -> Option<(usize, u32)> {
    haystack
        .iter()
        .enumerate()
        .map(|(i, d)| (i, hamming_distance(needle, d)))
        .min_by_key(|&(i, dist)| (dist, i))
}
