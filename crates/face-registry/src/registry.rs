//! Identity to label mapping

use std::collections::HashMap;

/// Maps identity strings to dense 1-based integer labels.
///
/// Labels are assigned in first-seen order, grow monotonically, and are
/// never reused or removed during a run.
#[derive(Debug, Default)]
pub struct LabelRegistry {
    names: Vec<String>,
    index: HashMap<String, u32>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the label for `identity`, assigning the next one on first
    /// sight.
    pub fn resolve(&mut self, identity: &str) -> u32 {
        if let Some(&label) = self.index.get(identity) {
            return label;
        }
        self.names.push(identity.to_string());
        let label = self.names.len() as u32;
        self.index.insert(identity.to_string(), label);
        label
    }

    /// Identity for a previously assigned label
    pub fn name(&self, label: u32) -> Option<&str> {
        self.names.get(label.checked_sub(1)? as usize).map(String::as_str)
    }

    /// Number of distinct identities seen so far
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_first_seen_order() {
        let mut registry = LabelRegistry::new();
        assert_eq!(registry.resolve("alice"), 1);
        assert_eq!(registry.resolve("bob"), 2);
        assert_eq!(registry.resolve("alice"), 1);
        assert_eq!(registry.resolve("carol"), 3);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_reverse_lookup() {
        let mut registry = LabelRegistry::new();
        registry.resolve("alice");
        registry.resolve("bob");
        assert_eq!(registry.name(1), Some("alice"));
        assert_eq!(registry.name(2), Some("bob"));
        assert_eq!(registry.name(0), None);
        assert_eq!(registry.name(3), None);
    }

    proptest! {
        /// For any lookup sequence: an identity's label never changes,
        /// and the assigned labels are exactly 1..=k for k distinct
        /// identities.
        #[test]
        fn prop_labels_stable_and_dense(lookups in prop::collection::vec("[a-c]{1,2}", 0..40)) {
            let mut registry = LabelRegistry::new();
            let mut first_seen: HashMap<String, u32> = HashMap::new();

            for identity in &lookups {
                let label = registry.resolve(identity);
                let prior = first_seen.entry(identity.clone()).or_insert(label);
                prop_assert_eq!(*prior, label);
            }

            let distinct: HashSet<&String> = lookups.iter().collect();
            let labels: HashSet<u32> = first_seen.values().copied().collect();
            prop_assert_eq!(registry.len(), distinct.len());
            prop_assert_eq!(labels, (1..=distinct.len() as u32).collect::<HashSet<u32>>());
        }
    }
}
