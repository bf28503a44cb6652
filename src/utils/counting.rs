use std::collections::HashMap;

/// Frequency counter that remembers first-insertion order.
///
/// `most_common` breaks ties by that order, so results are deterministic for a given
/// input sequence.
#[derive(Debug, Clone, Default)]
pub struct OrderedCounter {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl OrderedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str) {
        self.add_n(key, 1);
    }

    pub fn add_n(&mut self, key: &str, n: usize) {
        match self.counts.get_mut(key) {
            Some(count) => *count += n,
            None => {
                self.order.push(key.to_string());
                self.counts.insert(key.to_string(), n);
            }
        }
    }

    /// Fold another counter in. Keys new to `self` keep `other`'s relative order.
    pub fn merge(&mut self, other: &OrderedCounter) {
        for key in &other.order {
            self.add_n(key, other.counts[key]);
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Up to `n` keys by descending count.
    pub fn most_common(&self, n: usize) -> Vec<(String, usize)> {
        let mut entries: Vec<(String, usize)> = self
            .order
            .iter()
            .map(|k| (k.clone(), self.counts[k]))
            .collect();
        // stable: equal counts stay in first-seen order
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_keep_first_seen_order() {
        let mut c = OrderedCounter::new();
        for k in ["b", "a", "c", "a", "b", "d"] {
            c.add(k);
        }
        let top: Vec<_> = c.most_common(3).into_iter().map(|(k, _)| k).collect();
        assert_eq!(top, vec!["b", "a", "c"]);
    }

    #[test]
    fn merge_sums_counts() {
        let mut left = OrderedCounter::new();
        left.add("room");
        let mut right = OrderedCounter::new();
        right.add_n("room", 2);
        right.add("pool");
        left.merge(&right);
        assert_eq!(left.get("room"), 3);
        assert_eq!(left.get("pool"), 1);
        assert_eq!(left.len(), 2);
    }
}
