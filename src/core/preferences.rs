use std::cmp::Ordering;

use crate::core::compatibility::LabelCatalog;
use crate::models::{Participant, ReceiverRanking, ScoreMatrix, Side};

/// Ranked candidate lists for one side, indexed by participant index
///
/// Participants not on the side the table was built for have an empty list.
/// Built once per run and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceTable {
    lists: Vec<Vec<usize>>,
}

impl PreferenceTable {
    pub fn from_lists(lists: Vec<Vec<usize>>) -> Self {
        Self { lists }
    }

    /// Candidates of `subject`, most preferred first
    #[inline]
    pub fn list(&self, subject: usize) -> &[usize] {
        self.lists.get(subject).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Position of `candidate` in `subject`'s list; lower is better
    pub fn rank_of(&self, subject: usize, candidate: usize) -> Option<usize> {
        self.list(subject).iter().position(|&c| c == candidate)
    }

    /// Whether `subject` strictly prefers `a` over `b`
    ///
    /// Anyone on the list beats anyone off it.
    pub fn prefers(&self, subject: usize, a: usize, b: Option<usize>) -> bool {
        match (self.rank_of(subject, a), b.and_then(|b| self.rank_of(subject, b))) {
            (Some(ra), Some(rb)) => ra < rb,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn max_len(&self) -> usize {
        self.lists.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn total_len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

/// Builds ranked preference lists from scores and resolved attributes
#[derive(Debug, Clone, Copy)]
pub struct PreferenceBuilder<'a> {
    scores: ScoreMatrix<'a>,
    participants: &'a [Participant],
    catalog: &'a LabelCatalog,
    ranking: ReceiverRanking,
}

impl<'a> PreferenceBuilder<'a> {
    pub fn new(
        scores: ScoreMatrix<'a>,
        participants: &'a [Participant],
        catalog: &'a LabelCatalog,
        ranking: ReceiverRanking,
    ) -> Self {
        Self {
            scores,
            participants,
            catalog,
            ranking,
        }
    }

    /// Rank `opposite` for every member of `subjects`
    ///
    /// Proposers keep a candidate when their own preference admits the
    /// candidate's identity. Receivers keep a candidate when the candidate's
    /// preference admits the receiver's identity. Sorted by descending score,
    /// ties by ascending candidate index.
    pub fn build(&self, subjects: &[usize], opposite: &[usize], side: Side) -> PreferenceTable {
        let mut lists = vec![Vec::new(); self.participants.len()];

        for &subject in subjects {
            let mut ranked: Vec<(f64, usize)> = opposite
                .iter()
                .filter(|&&candidate| self.admissible(subject, candidate, side))
                .map(|&candidate| (self.score(subject, candidate, side), candidate))
                .collect();

            ranked.sort_by(|a, b| match b.0.total_cmp(&a.0) {
                Ordering::Equal => a.1.cmp(&b.1),
                other => other,
            });

            lists[subject] = ranked.into_iter().map(|(_, candidate)| candidate).collect();
        }

        PreferenceTable { lists }
    }

    #[inline]
    fn admissible(&self, subject: usize, candidate: usize, side: Side) -> bool {
        let s = &self.participants[subject];
        let c = &self.participants[candidate];
        match side {
            Side::Proposer => self.catalog.admits(s, c),
            Side::Receiver => self.catalog.admits(c, s),
        }
    }

    #[inline]
    fn score(&self, subject: usize, candidate: usize, side: Side) -> f64 {
        match (side, self.ranking) {
            (Side::Proposer, _) | (Side::Receiver, ReceiverRanking::OwnRating) => {
                self.scores.get(subject, candidate)
            }
            (Side::Receiver, ReceiverRanking::ProposerRating) => self.scores.get(candidate, subject),
        }
    }
}
