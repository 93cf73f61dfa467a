use super::ScoredCandidate;

/// Bounded, duplicate-free list of candidates ordered by descending confidence.
///
/// Equal confidences keep insertion order. When a word is inserted twice, only its
/// better-scoring occurrence is kept.
#[derive(Debug, Clone)]
pub struct TopKSelector {
    capacity: usize,
    items: Vec<ScoredCandidate>,
}

impl TopKSelector {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity.min(64) + 1),
        }
    }

    /// Returns true when the candidate made it into the list.
    pub fn insert(&mut self, candidate: ScoredCandidate) -> bool {
        if self.capacity == 0 || candidate.confidence.is_nan() {
            return false;
        }

        if let Some(dup) = self.items.iter().position(|c| c.word == candidate.word) {
            if self.items[dup].confidence >= candidate.confidence {
                return false;
            }
            self.items.remove(dup);
        }

        let pos = self
            .items
            .iter()
            .position(|c| c.confidence < candidate.confidence)
            .unwrap_or(self.items.len());
        if pos >= self.capacity {
            return false;
        }

        self.items.insert(pos, candidate);
        self.items.truncate(self.capacity);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[ScoredCandidate] {
        &self.items
    }

    pub fn words(&self) -> Vec<String> {
        self.items.iter().map(|c| c.word.clone()).collect()
    }

    pub fn into_vec(self) -> Vec<ScoredCandidate> {
        self.items
    }
}
