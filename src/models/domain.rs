use serde::{Deserialize, Serialize};

use crate::core::error::MatchError;

/// Dense id of an identity label within a [`LabelCatalog`](crate::core::LabelCatalog)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityId(pub(crate) u16);

/// Dense id of a preference label within a [`LabelCatalog`](crate::core::LabelCatalog)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreferenceId(pub(crate) u16);

/// Resolved, read-only attributes of one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participant {
    pub identity: IdentityId,
    pub preference: PreferenceId,
}

/// One matched pair in the final result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Match {
    pub proposer: usize,
    pub receiver: usize,
}

impl Match {
    pub fn new(proposer: usize, receiver: usize) -> Self {
        Self { proposer, receiver }
    }
}

impl From<(usize, usize)> for Match {
    fn from((proposer, receiver): (usize, usize)) -> Self {
        Self { proposer, receiver }
    }
}

/// Which side of a run a participant sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Proposer,
    Receiver,
}

/// Which row of the score matrix a receiver ranks its candidates by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverRanking {
    /// `scores[proposer][receiver]`: the proposer's rating of the receiver
    #[default]
    ProposerRating,
    /// `scores[receiver][proposer]`: the receiver's own rating
    OwnRating,
}

/// Borrowed N x N score matrix; `get(i, j)` is i's rating of j
#[derive(Debug, Clone, Copy)]
pub struct ScoreMatrix<'a> {
    rows: &'a [Vec<f64>],
}

impl<'a> ScoreMatrix<'a> {
    /// Wrap `rows`, checking every row has exactly `rows.len()` columns
    pub fn new(rows: &'a [Vec<f64>]) -> Result<Self, MatchError> {
        let expected = rows.len();
        for (row, values) in rows.iter().enumerate() {
            if values.len() != expected {
                return Err(MatchError::RaggedRow {
                    row,
                    len: values.len(),
                    expected,
                });
            }
        }
        Ok(Self { rows })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn get(&self, rater: usize, rated: usize) -> f64 {
        self.rows[rater][rated]
    }
}

/// Counters collected during one deferred-acceptance run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub proposers: usize,
    pub receivers: usize,
    /// Cursor advances, i.e. offers actually made
    pub proposals: usize,
    /// Queue pops, including the final pop that exhausts a proposer
    pub iterations: usize,
    pub exhausted: usize,
    pub matched: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_matrix_rejects_ragged_row() {
        let rows = vec![vec![0.0, 1.0], vec![2.0]];
        let err = ScoreMatrix::new(&rows).unwrap_err();
        assert_eq!(err, MatchError::RaggedRow { row: 1, len: 1, expected: 2 });
    }

    #[test]
    fn test_score_matrix_is_directional() {
        let rows = vec![vec![0.0, 3.0], vec![7.0, 0.0]];
        let scores = ScoreMatrix::new(&rows).unwrap();
        assert_eq!(scores.get(0, 1), 3.0);
        assert_eq!(scores.get(1, 0), 7.0);
    }

    #[test]
    fn test_receiver_ranking_serde_names() {
        let parsed: ReceiverRanking = serde_json::from_str("\"own_rating\"").unwrap();
        assert_eq!(parsed, ReceiverRanking::OwnRating);
        assert_eq!(ReceiverRanking::default(), ReceiverRanking::ProposerRating);
    }
}
