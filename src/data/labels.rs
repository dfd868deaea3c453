use std::collections::HashMap;

/// Dense, first-seen-order indices for label strings.
///
/// Indices start at 0 and are never reused or renumbered; asking for an
/// unknown label appends it.
#[derive(Debug, Clone, Default)]
pub struct LabelRegistry {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_of(&mut self, label: &str) -> usize {
        if let Some(&i) = self.index.get(label) {
            return i;
        }
        let i = self.labels.len();
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), i);
        i
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_of_is_idempotent() {
        let mut reg = LabelRegistry::new();
        let first = reg.index_of("circle");
        assert_eq!(reg.index_of("circle"), first);
        assert_eq!(reg.index_of("circle"), first);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn distinct_labels_get_distinct_dense_indices() {
        let mut reg = LabelRegistry::new();
        let names = ["swipe", "tap", "circle", "tap", "swipe", "hold"];
        let indices: Vec<usize> = names.iter().map(|n| reg.index_of(n)).collect();
        assert_eq!(indices, vec![0, 1, 2, 1, 0, 3]);
        assert_eq!(reg.labels(), &["swipe", "tap", "circle", "hold"]);
    }
}
