use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::pipeline::PostProcessing;

// ---------------------------------------------------------------------------
// ClassLabelFilter
// ---------------------------------------------------------------------------

/// Emits the most frequent label of the last `buffer_size` predictions once
/// it has been seen at least `min_count` times, otherwise rejects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassLabelFilter {
    pub min_count: usize,
    pub buffer_size: usize,
    #[serde(skip)]
    buffer: VecDeque<Option<usize>>,
}

impl Default for ClassLabelFilter {
    fn default() -> Self {
        Self {
            min_count: 2,
            buffer_size: 5,
            buffer: VecDeque::new(),
        }
    }
}

impl_module!(ClassLabelFilter, "ClassLabelFilter");

impl PostProcessing for ClassLabelFilter {
    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn process(&mut self, label: Option<usize>) -> Option<usize> {
        self.buffer.push_back(label);
        while self.buffer.len() > self.buffer_size.max(1) {
            self.buffer.pop_front();
        }

        let mut counts: Vec<(usize, usize)> = Vec::new();
        for l in self.buffer.iter().flatten() {
            match counts.iter_mut().find(|(c, _)| c == l) {
                Some((_, n)) => *n += 1,
                None => counts.push((*l, 1)),
            }
        }
        counts
            .into_iter()
            .filter(|(_, n)| *n >= self.min_count)
            .max_by_key(|(_, n)| *n)
            .map(|(l, _)| l)
    }
}

// ---------------------------------------------------------------------------
// ClassLabelChangeFilter
// ---------------------------------------------------------------------------

/// Passes a label only when it differs from the previous prediction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassLabelChangeFilter {
    #[serde(skip)]
    last: Option<usize>,
}

impl_module!(ClassLabelChangeFilter, "ClassLabelChangeFilter");

impl PostProcessing for ClassLabelChangeFilter {
    fn reset(&mut self) {
        self.last = None;
    }

    fn process(&mut self, label: Option<usize>) -> Option<usize> {
        if label == self.last {
            return None;
        }
        self.last = label;
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_filter_waits_for_min_count() {
        let mut f = ClassLabelFilter::default();
        assert_eq!(f.process(Some(1)), None);
        assert_eq!(f.process(Some(1)), Some(1));
        assert_eq!(f.process(Some(0)), Some(1));
    }

    #[test]
    fn label_filter_forgets_old_predictions() {
        let mut f = ClassLabelFilter {
            min_count: 2,
            buffer_size: 2,
            ..Default::default()
        };
        f.process(Some(3));
        f.process(Some(3));
        assert_eq!(f.process(Some(4)), None);
        f.reset();
        assert_eq!(f.process(Some(3)), None);
    }

    #[test]
    fn change_filter_suppresses_repeats() {
        let mut f = ClassLabelChangeFilter::default();
        let out: Vec<_> = [0, 0, 1, 1, 0].iter().map(|&l| f.process(Some(l))).collect();
        assert_eq!(out, vec![Some(0), None, Some(1), None, Some(0)]);
    }
}
