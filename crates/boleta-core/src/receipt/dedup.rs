//! Merging repeated items and assigning identifiers.

use std::collections::HashMap;

use tracing::debug;

use crate::models::receipt::{CandidateItem, LineItem};

/// Merges candidates with the same case-insensitive name and the same price.
///
/// Matching is exact: two OCR spellings of one dish stay separate so the
/// reviewer sees both.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator;

impl Deduplicator {
    pub fn new() -> Self {
        Self
    }

    /// Merge candidates, keeping first-seen order and summing quantities.
    ///
    /// Returns the merged list and the number of candidates folded away.
    pub fn merge(&self, candidates: Vec<CandidateItem>) -> (Vec<CandidateItem>, usize) {
        let mut merged: Vec<CandidateItem> = Vec::with_capacity(candidates.len());
        let mut index: HashMap<(String, u64), usize> = HashMap::new();
        let mut folded = 0;

        for candidate in candidates {
            let key = (candidate.name.to_lowercase(), candidate.price);
            match index.get(&key) {
                Some(&pos) => {
                    let existing = &mut merged[pos];
                    existing.quantity = existing.quantity.saturating_add(candidate.quantity);
                    folded += 1;
                }
                None => {
                    index.insert(key, merged.len());
                    merged.push(candidate);
                }
            }
        }

        if folded > 0 {
            debug!("Merged {} duplicate candidates", folded);
        }
        (merged, folded)
    }

    /// Merge and number the surviving items from 1.
    pub fn finalize(&self, candidates: Vec<CandidateItem>) -> (Vec<LineItem>, usize) {
        let (merged, folded) = self.merge(candidates);
        (assign_ids(merged), folded)
    }
}

/// Number items sequentially from 1 in their current order.
pub fn assign_ids(items: Vec<CandidateItem>) -> Vec<LineItem> {
    items
        .into_iter()
        .zip(1u32..)
        .map(|(item, id)| LineItem {
            id,
            name: item.name,
            quantity: item.quantity,
            price: item.price,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merges_same_name_and_price() {
        let (items, folded) = Deduplicator::new().finalize(vec![
            CandidateItem::new("Agua", 1, 1500),
            CandidateItem::new("Pizza", 1, 12000),
            CandidateItem::new("AGUA", 1, 1500),
        ]);

        assert_eq!(folded, 1);
        assert_eq!(
            items,
            vec![
                LineItem { id: 1, name: "Agua".into(), quantity: 2, price: 1500 },
                LineItem { id: 2, name: "Pizza".into(), quantity: 1, price: 12000 },
            ]
        );
    }

    #[test]
    fn test_keeps_distinct_keys() {
        let (merged, folded) = Deduplicator::new().merge(vec![
            CandidateItem::new("Agua", 1, 1500),
            CandidateItem::new("Agua", 1, 1800),
            CandidateItem::new("Aqua", 1, 1500),
        ]);

        assert_eq!(folded, 0);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let dedup = Deduplicator::new();
        let (once, _) = dedup.merge(vec![
            CandidateItem::new("Pan", 2, 1200),
            CandidateItem::new("Café", 1, 2000),
            CandidateItem::new("pan", 3, 1200),
            CandidateItem::new("CAFÉ", 1, 2000),
        ]);
        let (twice, folded) = dedup.merge(once.clone());

        assert_eq!(once, twice);
        assert_eq!(folded, 0);
        assert_eq!(once[0], CandidateItem::new("Pan", 5, 1200));
        assert_eq!(once[1], CandidateItem::new("Café", 2, 2000));
    }

    #[test]
    fn test_reviewed_items_round_trip() {
        let dedup = Deduplicator::new();
        let (items, _) = dedup.finalize(vec![
            CandidateItem::new("Pan", 1, 1200),
            CandidateItem::new("Pan", 1, 1200),
        ]);
        let again: Vec<CandidateItem> = items.iter().map(LineItem::to_candidate).collect();

        assert_eq!(dedup.finalize(again).0, items);
    }
}
