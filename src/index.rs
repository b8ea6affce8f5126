use std::collections::HashMap;

use itertools::Itertools;
use log::warn;

use crate::errors::{ClusterMapError, Result};

/// Lookup from locus tag to its rank along the genome axis
///
/// The genome length is the number of entries in the reference order, which
/// equals the number of indexed locus tags when the reference is unique.
#[derive(Debug, Clone, Default)]
pub struct PositionIndex {
    positions: HashMap<String, usize>,
    genome_length: usize,
}

impl PositionIndex {
    /// Builds the index in a single left-to-right pass
    ///
    /// A locus tag repeated in the reference order keeps the position of its
    /// last occurrence.
    pub fn new(reference_order: &[String]) -> Self {
        let mut positions = HashMap::with_capacity(reference_order.len());
        for (position, locus) in reference_order.iter().enumerate() {
            positions.insert(locus.clone(), position);
        }
        if positions.len() < reference_order.len() {
            warn!(
                "Reference order contains {} duplicated locus tags; keeping the last occurrence of each",
                reference_order.len() - positions.len()
            );
        }
        Self {
            positions,
            genome_length: reference_order.len(),
        }
    }

    /// Builds the index, rejecting any repeated locus tag
    pub fn strict(reference_order: &[String]) -> Result<Self> {
        if let Some(duplicate) = reference_order.iter().duplicates().next() {
            return Err(ClusterMapError::DuplicateReference(duplicate.clone()));
        }
        Ok(Self::new(reference_order))
    }

    pub fn genome_length(&self) -> usize {
        self.genome_length
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, locus: &str) -> Option<usize> {
        self.positions.get(locus).copied()
    }

    /// Resolves members to their genome positions
    ///
    /// Members missing from the reference are dropped. Repeated members are
    /// counted once and the positions are returned in ascending order.
    pub fn resolve<S: AsRef<str>>(&self, members: &[S]) -> Vec<usize> {
        members
            .iter()
            .filter_map(|locus| self.position(locus.as_ref()))
            .sorted_unstable()
            .dedup()
            .collect()
    }
}
