//! Candidate parent-pair enumeration.
//!
//! Pairs are unordered and include self-pairs: for representatives indexed
//! `0..n`, every `(i, j)` with `i <= j`, in row-major order. The order is
//! stable, which lets the merge step fold results deterministically.

use serde::{Deserialize, Serialize};

/// Which pairs an iteration evaluates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairStrategy {
    /// Re-enumerate the whole `n * (n + 1) / 2` space every iteration.
    #[default]
    Full,

    /// Only pairs with at least one member added by the previous merge.
    ///
    /// Pairs of older members were evaluated in an earlier iteration and
    /// their children already merged, so the closure is identical.
    Frontier,
}

impl PairStrategy {
    /// Returns a short stable identifier suitable for logging.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Frontier => "frontier",
        }
    }
}

/// Number of unordered pairs (self-pairs included) over `n` members.
#[must_use]
pub const fn pair_count(n: usize) -> usize {
    n * (n + 1) / 2
}

/// Iterator over `(i, j)` with `i <= j < n` and `j >= frontier`.
#[derive(Debug, Clone)]
pub struct Pairs {
    n: usize,
    frontier: usize,
    i: usize,
    j: usize,
}

impl Iterator for Pairs {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        // Walk column-wise so the frontier cut is a lower bound on `j`.
        while self.j < self.n {
            if self.i <= self.j {
                let pair = (self.i, self.j);
                self.i += 1;
                return Some(pair);
            }
            self.j += 1;
            self.i = 0;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.j >= self.n {
            return (0, Some(0));
        }
        let remaining = pair_count(self.n) - pair_count(self.j) - self.i.min(self.j + 1);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Pairs {}

/// Every unordered pair over `n` members, self-pairs included.
///
/// # Examples
///
/// ```
/// use palreach::enumerate_pairs;
///
/// let pairs: Vec<_> = enumerate_pairs(2).collect();
/// assert_eq!(pairs, vec![(0, 0), (0, 1), (1, 1)]);
/// ```
#[must_use]
pub fn enumerate_pairs(n: usize) -> Pairs {
    pairs_from(n, 0)
}

/// Pairs over `n` members whose larger index is at least `frontier`.
///
/// Members `frontier..n` are the ones added since the last evaluation;
/// every pair involving one of them is produced, each exactly once.
#[must_use]
pub fn pairs_from(n: usize, frontier: usize) -> Pairs {
    Pairs {
        n,
        frontier,
        i: 0,
        j: frontier.min(n),
    }
}

impl Pairs {
    /// The first member index considered new.
    #[must_use]
    pub const fn frontier(&self) -> usize {
        self.frontier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_self_pairs() {
        let pairs: Vec<_> = enumerate_pairs(3).collect();
        assert_eq!(pairs, vec![(0, 0), (0, 1), (1, 1), (0, 2), (1, 2), (2, 2)]);
    }

    #[test]
    fn count_matches_formula() {
        for n in 0..20 {
            let it = enumerate_pairs(n);
            assert_eq!(it.len(), pair_count(n));
            assert_eq!(it.count(), pair_count(n));
        }
    }

    #[test]
    fn size_hint_tracks_progress() {
        let mut it = enumerate_pairs(4);
        for expected in (0..pair_count(4)).rev() {
            it.next();
            assert_eq!(it.len(), expected);
        }
        assert!(it.next().is_none());
    }

    #[test]
    fn frontier_covers_every_new_pair_once() {
        let n = 6;
        let frontier = 4;
        let got: Vec<_> = pairs_from(n, frontier).collect();
        let expected: Vec<_> = enumerate_pairs(n).filter(|&(_, j)| j >= frontier).collect();
        assert_eq!(got, expected);
        assert_eq!(got.len(), pair_count(n) - pair_count(frontier));
        assert_eq!(pairs_from(n, frontier).len(), got.len());
    }

    #[test]
    fn frontier_past_end_is_empty() {
        assert_eq!(pairs_from(3, 3).count(), 0);
        assert_eq!(pairs_from(3, 7).len(), 0);
    }
}
