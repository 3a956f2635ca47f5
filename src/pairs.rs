//! Enumeration of the chain pairs scanned in a complex.

use std::fmt;

/// An unordered pair of chain identifiers, stored in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainPair {
    /// Chain seen first in the structure
    pub first: String,
    /// Chain seen later in the structure
    pub second: String,
}

impl ChainPair {
    /// Create a pair from two chain identifiers.
    pub fn new(first: &str, second: &str) -> Self {
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    /// Key of the pair in results and file names: both identifiers concatenated.
    pub fn key(&self) -> String {
        format!("{}{}", self.first, self.second)
    }
}

impl fmt::Display for ChainPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.first, self.second)
    }
}

/// List every pair `(ids[i], ids[j])` with `i < j`.
///
/// Blank identifiers do not name a real chain and are dropped, as are repeats.
/// Fewer than two remaining chains means the structure is not a complex and
/// the result is empty.
pub fn chain_pairs<S: AsRef<str>>(chain_ids: &[S]) -> Vec<ChainPair> {
    let mut ids: Vec<&str> = Vec::with_capacity(chain_ids.len());
    for id in chain_ids.iter().map(|c| c.as_ref()) {
        if !id.trim().is_empty() && !ids.contains(&id) {
            ids.push(id);
        }
    }

    ids.iter()
        .enumerate()
        .flat_map(|(i, a)| ids[i + 1..].iter().map(move |b| ChainPair::new(a, b)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_in_first_seen_order() {
        let pairs = chain_pairs(&["B", "A", "C"]);
        let keys: Vec<String> = pairs.iter().map(|p| p.key()).collect();
        assert_eq!(keys, vec!["BA", "BC", "AC"]);
    }

    #[test]
    fn blank_chains_are_ignored() {
        let pairs = chain_pairs(&["A", " ", "B", ""]);
        assert_eq!(pairs, vec![ChainPair::new("A", "B")]);
    }

    #[test]
    fn not_a_complex() {
        assert!(chain_pairs::<&str>(&[]).is_empty());
        assert!(chain_pairs(&["A"]).is_empty());
        assert!(chain_pairs(&["A", " "]).is_empty());
        assert!(chain_pairs(&["A", "A"]).is_empty(), "Repeated ids are one chain");
    }

    #[test]
    fn pair_count_is_n_choose_two() {
        let ids: Vec<String> = (b'A'..=b'F').map(|c| (c as char).to_string()).collect();
        assert_eq!(chain_pairs(&ids).len(), 15);
    }
}
